//! # Listener registration: deferred side effects per emission.
//!
//! Listeners subscribe a raw feed observer that appends the user effect to
//! one of the effect queues and requests a flush. The effect therefore runs
//! after pure propagation has reached fixpoint for the current emission:
//! mutation effects first, listener effects after.
//!
//! ## Rules
//! - For a synchronously delivered value, the effect is enqueued at
//!   propagation time and runs in this emission's effect phase.
//! - For a value still resolving in an async stage, the effect is enqueued
//!   when the stage resolves and runs in a deferred flush. A halted stage
//!   enqueues nothing.
//! - [`create_sync_listener`] is the exception: its effect is enqueued at
//!   propagation time either way, receiving a [`SyncPayload`] future that
//!   the caller may await for the resolved value (`None` if halted).
//! - An effect that panics aborts the remainder of the current drain; the
//!   scheduler itself stays usable.

use std::cell::RefCell;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll};

use crate::handler::{Feed, Handler, StepFuture};
use crate::scheduler::{self, Lane};

/// Runs `effect` in the listener phase of each emission on `handler`.
///
/// The effect sees the resolved value: emissions flowing through async
/// stages trigger it on resolution, halted emissions not at all.
pub fn create_listener<E, F>(handler: &Handler<E>, effect: F)
where
    E: Clone + 'static,
    F: FnMut(E) + 'static,
{
    register(handler, Lane::Listener, effect);
}

/// Runs `effect` in the mutation phase: after all pure transforms, before
/// any listener effect.
pub fn create_mutation_listener<E, F>(handler: &Handler<E>, effect: F)
where
    E: Clone + 'static,
    F: FnMut(E) + 'static,
{
    register(handler, Lane::Mutation, effect);
}

fn register<E, F>(handler: &Handler<E>, lane: Lane, effect: F)
where
    E: Clone + 'static,
    F: FnMut(E) + 'static,
{
    let effect: Rc<RefCell<dyn FnMut(E)>> = Rc::new(RefCell::new(effect));

    handler.observe(move |feed| match feed {
        Feed::Value(value) => {
            enqueue(lane, Rc::clone(&effect), value);
            scheduler::schedule_flush();
        }
        Feed::Async(step) => {
            let effect = Rc::clone(&effect);
            tokio::task::spawn_local(async move {
                if let Ok(value) = step.await {
                    enqueue(lane, effect, value);
                    scheduler::schedule_flush();
                }
            });
        }
    });
}

fn enqueue<E: 'static>(lane: Lane, effect: Rc<RefCell<dyn FnMut(E)>>, value: E) {
    scheduler::enqueue_effect(
        lane,
        Box::new(move || {
            let mut effect = effect.borrow_mut();
            (&mut *effect)(value);
        }),
    );
}

/// Runs `effect` in the listener phase at propagation time, handing it a
/// [`SyncPayload`] instead of a value.
///
/// This lets a caller observe that an async pipeline stage was *reached*
/// without waiting for it; awaiting the payload yields the resolved value,
/// or `None` when that stage halted.
pub fn create_sync_listener<E, F>(handler: &Handler<E>, effect: F)
where
    E: Clone + 'static,
    F: FnMut(SyncPayload<E>) + 'static,
{
    let effect: Rc<RefCell<dyn FnMut(SyncPayload<E>)>> = Rc::new(RefCell::new(effect));

    handler.observe(move |feed| {
        let payload = match feed {
            Feed::Value(value) => SyncPayload {
                state: PayloadState::Ready(Some(value)),
            },
            Feed::Async(step) => SyncPayload {
                state: PayloadState::Pending(step),
            },
        };
        let effect = Rc::clone(&effect);
        scheduler::enqueue_effect(
            Lane::Listener,
            Box::new(move || {
                let mut effect = effect.borrow_mut();
                (&mut *effect)(payload);
            }),
        );
        scheduler::schedule_flush();
    });
}

/// Future handed to a sync listener: the emission's eventual value.
///
/// Resolves to `Some(value)` once every async stage upstream of the
/// listener has resolved (immediately for synchronous emissions), or to
/// `None` when an upstream stage halted.
pub struct SyncPayload<E: Clone + 'static> {
    state: PayloadState<E>,
}

enum PayloadState<E: Clone + 'static> {
    Ready(Option<E>),
    Pending(StepFuture<E>),
}

// The value is only ever moved out, never polled through a projection.
impl<E: Clone + 'static> Unpin for SyncPayload<E> {}

impl<E: Clone + 'static> Future for SyncPayload<E> {
    type Output = Option<E>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        match &mut this.state {
            PayloadState::Ready(slot) => Poll::Ready(slot.take()),
            PayloadState::Pending(step) => Pin::new(step).poll(cx).map(Result::ok),
        }
    }
}
