//! # Multicast stream: the push primitive backing every handler.
//!
//! [`Stream`] is a single-threaded multicast channel: every value pushed is
//! delivered **synchronously** to all subscribers registered at the moment of
//! the push.
//!
//! - [`Stream::push`] delivers a clone of the value to each subscriber.
//! - [`Stream::subscribe`] registers a callback and returns a [`Subscription`].
//!
//! ## Rules
//! - Delivery is synchronous and in registration order.
//! - A push with no subscribers is dropped silently. This is intentional:
//!   a stream whose scope has torn down must tolerate late pushes from
//!   pending async work.
//! - Callbacks may subscribe or unsubscribe reentrantly: delivery iterates a
//!   snapshot of the subscriber list taken at push time.
//! - [`Subscription::unsubscribe`] consumes the handle and is a no-op once
//!   the stream itself has been dropped.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

type Callback<T> = Rc<RefCell<dyn FnMut(T)>>;

struct Entry<T> {
    id: u64,
    callback: Callback<T>,
}

struct Inner<T> {
    next_id: u64,
    subscribers: Vec<Entry<T>>,
}

/// Single-threaded multicast stream.
///
/// Cloning a `Stream` creates a new handle to the **same** channel: pushes
/// through any handle reach all subscribers.
pub struct Stream<T> {
    inner: Rc<RefCell<Inner<T>>>,
}

impl<T> Clone for Stream<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: 'static> Default for Stream<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: 'static> Stream<T> {
    /// Creates an empty stream with no subscribers.
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(Inner {
                next_id: 0,
                subscribers: Vec::new(),
            })),
        }
    }

    /// Registers a callback and returns its [`Subscription`] handle.
    pub fn subscribe(&self, callback: impl FnMut(T) + 'static) -> Subscription {
        let id = {
            let mut inner = self.inner.borrow_mut();
            let id = inner.next_id;
            inner.next_id += 1;
            inner.subscribers.push(Entry {
                id,
                callback: Rc::new(RefCell::new(callback)),
            });
            id
        };

        let weak: Weak<RefCell<Inner<T>>> = Rc::downgrade(&self.inner);
        Subscription {
            cancel: Some(Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    inner.borrow_mut().subscribers.retain(|entry| entry.id != id);
                }
            })),
        }
    }

    /// Number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.inner.borrow().subscribers.len()
    }
}

impl<T: Clone + 'static> Stream<T> {
    /// Pushes a value to all current subscribers.
    ///
    /// Each subscriber receives its own clone. Subscribers added during
    /// delivery see only subsequent pushes; subscribers removed during
    /// delivery may still receive this value.
    pub fn push(&self, value: T) {
        // Snapshot before calling out: callbacks are free to mutate the list.
        let snapshot: Vec<Callback<T>> = self
            .inner
            .borrow()
            .subscribers
            .iter()
            .map(|entry| Rc::clone(&entry.callback))
            .collect();

        for callback in snapshot {
            (&mut *callback.borrow_mut())(value.clone());
        }
    }
}

/// Handle to one stream subscription.
///
/// Holding the handle keeps nothing alive; dropping it without calling
/// [`unsubscribe`](Subscription::unsubscribe) leaves the callback registered.
/// Subscriptions created through handlers are unsubscribed by the enclosing
/// scope's teardown.
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    /// Removes the callback from the stream.
    ///
    /// Safe to call after the stream has been dropped.
    pub fn unsubscribe(mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}
