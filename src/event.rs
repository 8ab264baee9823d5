//! # Event factory: paired handler and emitter.
//!
//! [`create_event`] allocates a root stream and returns its two faces: the
//! [`Handler`](crate::Handler) applications subscribe and derive from, and
//! the [`Emitter`] that pushes values in.
//!
//! Emitting never blocks and never fails: the value is enqueued as a
//! pure-queue delivery to the root stream, then the queues are flushed. An
//! emit with no subscribers is dropped silently; the system operates fine
//! without observers.

use crate::handler::{Feed, Handler};
use crate::scheduler;
use crate::stream::Stream;

/// Creates a root event: a `(handler, emitter)` pair over a fresh stream.
///
/// # Example
/// ```
/// use std::cell::RefCell;
/// use std::rc::Rc;
///
/// use eventflow::{create_event, create_listener, with_scope};
///
/// let seen = Rc::new(RefCell::new(Vec::new()));
/// let sink = Rc::clone(&seen);
///
/// let ((_on, emit), scope) = with_scope(|| {
///     let (on, emit) = create_event::<String>();
///     create_listener(&on, move |word: String| sink.borrow_mut().push(word));
///     (on, emit)
/// });
///
/// emit.emit("hello".into());
/// assert_eq!(*seen.borrow(), ["hello"]);
/// scope.dispose();
/// ```
pub fn create_event<E: Clone + 'static>() -> (Handler<E>, Emitter<E>) {
    let root: Stream<Feed<E>> = Stream::new();
    (Handler::from_stream(root.clone()), Emitter { sink: root })
}

/// Push handle paired with a root handler.
///
/// Cloneable and usable from outside the scope that created it; once that
/// scope disposes, emits still run but reach no subscribers.
pub struct Emitter<E: Clone + 'static> {
    sink: Stream<Feed<E>>,
}

impl<E: Clone + 'static> Clone for Emitter<E> {
    fn clone(&self) -> Self {
        Self {
            sink: self.sink.clone(),
        }
    }
}

impl<E: Clone + 'static> Emitter<E> {
    /// Emits a value into the root stream.
    ///
    /// Delivery goes through the pure queue; by the time this returns, the
    /// synchronous part of the propagation (pure transforms, then mutation
    /// effects, then listener effects) has completed. Reentrant
    /// emits (from inside a transform or effect) enqueue and return; the
    /// in-progress flush drains them in the correct phase.
    pub fn emit(&self, value: E) {
        let sink = self.sink.clone();
        scheduler::enqueue_pure(Box::new(move || sink.push(Feed::Value(value))));
        scheduler::flush_queues();
    }
}
