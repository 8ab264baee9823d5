//! # Topic tree: hierarchical keyed routing over events.
//!
//! A topic overlays a tree of string-keyed nodes on top of plain events.
//! Subscribers attach at a key path; emitters push a payload at a key path;
//! the tree fans each emission out so that it is visible at every related
//! level:
//!
//! ```text
//! emit(["b","c"], 3)
//!   ├─ at []        → {"b": {"c": 3}}     (ancestors: wrapped payload)
//!   ├─ at ["b"]     → {"c": 3}
//!   └─ at ["b","c"] → 3                   (exact node: the payload)
//!
//! emit([], {"b": {"c": 5}})
//!   ├─ at []        → {"b": {"c": 5}}     (exact node)
//!   ├─ at ["b"]     → {"c": 5}            (descent into object keys)
//!   └─ at ["b","c"] → 5
//! ```
//!
//! Payloads are [`serde_json::Value`]; fan-out descends only into objects
//! (arrays and primitives are leaves), so `emit(["a"], v)` and
//! `emit([], {"a": v})` are observationally identical everywhere.
//!
//! ## Rules
//! - Nodes are created on demand: navigating with
//!   [`TopicHandler::at`](TopicHandler::at) or emitting at a path creates
//!   the (eventless) nodes along it; a node gains its event on first
//!   subscribe. Transitions are monotonic.
//! - Deliveries reach eventful nodes only, in a fixed order: ancestors
//!   root-first, then the exact node, then descent over the payload's own
//!   keys in map order.
//! - Each delivery is a full emission cycle of its node's event.

mod handle;
mod node;

pub use handle::{TopicEmitter, TopicHandler};

use std::rc::Rc;

use node::TopicNode;

/// Creates a topic: a `(handler, emitter)` pair over a fresh tree.
///
/// # Example
/// ```
/// use std::cell::RefCell;
/// use std::rc::Rc;
///
/// use eventflow::{create_listener, create_topic, with_scope};
/// use serde_json::json;
///
/// let seen = Rc::new(RefCell::new(Vec::new()));
/// let sink = Rc::clone(&seen);
///
/// let (emit, scope) = with_scope(|| {
///     let (on, emit) = create_topic();
///     let direct = on.on(&["b", "c"], Ok);
///     create_listener(&direct, move |v| sink.borrow_mut().push(v));
///     emit
/// });
///
/// emit.emit(&["b"], json!({"c": 2}));
/// emit.emit(&["b", "c"], json!(3));
/// assert_eq!(*seen.borrow(), [json!(2), json!(3)]);
/// scope.dispose();
/// ```
pub fn create_topic() -> (TopicHandler, TopicEmitter) {
    let root = Rc::new(TopicNode::new());
    (
        TopicHandler::new(Rc::clone(&root)),
        TopicEmitter::new(root),
    )
}
