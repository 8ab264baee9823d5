//! # Topic tree node.
//!
//! One node per key path, created on demand and never removed before scope
//! end. A node starts eventless and gains its `(handler, emitter)` pair on
//! first subscribe; the pair is then fixed for the node's lifetime.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use serde_json::Value;

use crate::event::{Emitter, create_event};
use crate::handler::Handler;

pub(crate) struct TopicNode {
    event: RefCell<Option<(Handler<Value>, Emitter<Value>)>>,
    children: RefCell<HashMap<String, Rc<TopicNode>>>,
}

impl TopicNode {
    pub(crate) fn new() -> Self {
        Self {
            event: RefCell::new(None),
            children: RefCell::new(HashMap::new()),
        }
    }

    /// Gets or creates the child at `key`.
    pub(crate) fn child(&self, key: &str) -> Rc<TopicNode> {
        Rc::clone(
            self.children
                .borrow_mut()
                .entry(key.to_string())
                .or_insert_with(|| Rc::new(TopicNode::new())),
        )
    }

    /// The child at `key`, if it exists. Used by payload descent, which
    /// must not create nodes.
    pub(crate) fn get_child(&self, key: &str) -> Option<Rc<TopicNode>> {
        self.children.borrow().get(key).map(Rc::clone)
    }

    /// The node's handler, creating the event pair on first use.
    pub(crate) fn handler(&self) -> Handler<Value> {
        let mut event = self.event.borrow_mut();
        let (handler, _) = event.get_or_insert_with(create_event);
        handler.clone()
    }

    /// The node's emitter, only if the node is already eventful.
    pub(crate) fn emitter(&self) -> Option<Emitter<Value>> {
        self.event
            .borrow()
            .as_ref()
            .map(|(_, emitter)| emitter.clone())
    }
}
