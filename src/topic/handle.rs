//! # Topic handles: subscribe and emit by key path.

use std::rc::Rc;

use serde_json::{Map, Value};

use crate::halt::Halted;
use crate::handler::Handler;

use super::node::TopicNode;

/// Subscription side of a topic, rooted at one node of the tree.
///
/// [`at`](TopicHandler::at) navigates without subscribing, so handles are
/// partially applicable: `topic.at("a").on(&["b"], f)` is the same
/// subscription as `topic.on(&["a", "b"], f)`.
#[derive(Clone)]
pub struct TopicHandler {
    node: Rc<TopicNode>,
}

impl TopicHandler {
    pub(crate) fn new(node: Rc<TopicNode>) -> Self {
        Self { node }
    }

    /// The handle one key deeper, creating the node if absent.
    pub fn at(&self, key: &str) -> TopicHandler {
        TopicHandler {
            node: self.node.child(key),
        }
    }

    /// The handle at a relative key path.
    pub fn path(&self, path: &[&str]) -> TopicHandler {
        path.iter().fold(self.clone(), |handle, key| handle.at(key))
    }

    /// Subscribes a transform at this handle's node.
    ///
    /// Ensures the node's event pair exists, then behaves exactly like
    /// [`Handler::subscribe`]: the returned handler is an ordinary derived
    /// handler, composable with every other primitive.
    pub fn subscribe<O, F>(&self, transform: F) -> Handler<O>
    where
        O: Clone + 'static,
        F: FnMut(Value) -> Halted<O> + 'static,
    {
        self.node.handler().subscribe(transform)
    }

    /// Subscribes a transform at a relative key path.
    pub fn on<O, F>(&self, path: &[&str], transform: F) -> Handler<O>
    where
        O: Clone + 'static,
        F: FnMut(Value) -> Halted<O> + 'static,
    {
        self.path(path).subscribe(transform)
    }

    /// The raw handler of this handle's node.
    pub fn handler(&self) -> Handler<Value> {
        self.node.handler()
    }
}

/// Emission side of a topic.
#[derive(Clone)]
pub struct TopicEmitter {
    root: Rc<TopicNode>,
}

impl TopicEmitter {
    pub(crate) fn new(root: Rc<TopicNode>) -> Self {
        Self { root }
    }

    /// Emits `payload` at `path`, fanning out across the tree.
    ///
    /// Deliveries, in order, to every eventful node involved:
    /// 1. each proper ancestor of `path`, root first, receives the payload
    ///    wrapped in the remaining suffix keys (`["b","c"]`, `3` wraps to
    ///    `{"b": {"c": 3}}` at the root);
    /// 2. the `path` node receives the payload itself;
    /// 3. for object payloads, each sub-value is delivered the same way one
    ///    level deeper, descending in key order through children that
    ///    already exist.
    ///
    /// Nodes along `path` are created (eventless) as needed; descent does
    /// not create nodes. Each delivery is a complete emission cycle, so a
    /// multi-node fan-out produces one cycle per eventful node, in the
    /// order above.
    pub fn emit(&self, path: &[&str], payload: Value) {
        let mut node = Rc::clone(&self.root);
        for (depth, key) in path.iter().enumerate() {
            deliver(&node, wrap(&path[depth..], &payload));
            node = node.child(key);
        }
        descend(&node, &payload);
    }
}

fn deliver(node: &Rc<TopicNode>, value: Value) {
    if let Some(emitter) = node.emitter() {
        emitter.emit(value);
    }
}

/// Wraps a payload in nested single-key objects, innermost key last.
fn wrap(suffix: &[&str], payload: &Value) -> Value {
    suffix.iter().rev().fold(payload.clone(), |inner, key| {
        let mut object = Map::new();
        object.insert((*key).to_string(), inner);
        Value::Object(object)
    })
}

/// Delivers `payload` at `node`, then projects object payloads into
/// existing children.
fn descend(node: &Rc<TopicNode>, payload: &Value) {
    deliver(node, payload.clone());
    if let Value::Object(entries) = payload {
        for (key, sub) in entries {
            if let Some(child) = node.get_child(key) {
                descend(&child, sub);
            }
        }
    }
}
