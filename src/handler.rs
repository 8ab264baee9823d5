//! # Handler node: a composable subscription point.
//!
//! A [`Handler`] wraps one multicast stream of [`Feed`] items. Applying a
//! transform subscribes to that stream and yields a fresh downstream
//! handler, so chains of transforms compose into a DAG that every emission
//! propagates through.
//!
//! ## Architecture
//! ```text
//! emit ─► [root stream] ─► transform A ─► [stream] ─► transform C ─► ...
//!                      └─► transform B ─► [stream] ─► ...
//! ```
//! Each edge delivers downstream **via the pure queue**, never inline. That
//! is what produces the breadth-fair propagation order: every subscriber of
//! a stream observes the value before any grandchild does.
//!
//! ## Rules
//! - A sync transform returning `Err(Halt)` suppresses this edge for the
//!   current emission (logged at `info`); siblings are unaffected. A panic
//!   propagates out of the emit call site.
//! - A future-returning transform resolves off-schedule: the downstream
//!   item is a shared [`StepFuture`] delivered at propagation time, and a
//!   local driver task keeps the chain eager. Requires a current-thread
//!   runtime with a `LocalSet`.
//! - A halt already in flight passes through downstream edges **without**
//!   invoking their transforms.
//! - Every subscription is registered with the enclosing scope and removed
//!   on scope disposal.

use std::cell::RefCell;
use std::future::Future;
use std::rc::Rc;

use futures::FutureExt;
use futures::future::{LocalBoxFuture, Shared};

use crate::halt::{Halt, Halted};
use crate::scheduler;
use crate::scope;
use crate::stream::Stream;

/// A pending emission: resolves to the value, or to the halt that stopped it.
pub type StepFuture<E> = Shared<LocalBoxFuture<'static, Halted<E>>>;

/// One item on a handler's stream.
#[derive(Clone)]
pub enum Feed<E: Clone + 'static> {
    /// A value delivered synchronously.
    Value(E),
    /// A value still resolving in an async transform upstream.
    Async(StepFuture<E>),
}

/// Result of invoking a transform: immediate, or still resolving.
enum TransformOut<O: Clone + 'static> {
    Now(Halted<O>),
    Later(LocalBoxFuture<'static, Halted<O>>),
}

type BoxedTransform<E, O> = Rc<RefCell<dyn FnMut(E) -> TransformOut<O>>>;

/// A composable subscription point carrying values of type `E`.
///
/// Cloning a `Handler` clones the handle, not the stream: all clones derive
/// from the same upstream. A handler is immutable: its upstream stream is
/// fixed at construction and subscriptions are append-only, removed by the
/// enclosing scope's teardown.
pub struct Handler<E: Clone + 'static> {
    source: Stream<Feed<E>>,
}

impl<E: Clone + 'static> Clone for Handler<E> {
    fn clone(&self) -> Self {
        Self {
            source: self.source.clone(),
        }
    }
}

impl<E: Clone + 'static> Handler<E> {
    pub(crate) fn from_stream(source: Stream<Feed<E>>) -> Self {
        Self { source }
    }

    /// Subscribes a synchronous transform; returns the downstream handler.
    ///
    /// The transform runs during pure propagation. Returning `Err(Halt)`
    /// stops this edge for the current emission; see [`halt`](crate::halt).
    pub fn subscribe<O, F>(&self, mut transform: F) -> Handler<O>
    where
        O: Clone + 'static,
        F: FnMut(E) -> Halted<O> + 'static,
    {
        self.attach(Rc::new(RefCell::new(move |value: E| {
            TransformOut::Now(transform(value))
        })))
    }

    /// Subscribes an async transform; returns the downstream handler.
    ///
    /// The future is shared with every downstream edge and driven eagerly
    /// by a local task, so it resolves whether or not anything listens.
    /// Resolving to `Err(Halt)` stops this edge. Nested handlers see the
    /// pending item immediately; the resolved value flows once the future
    /// completes (promise flattening: a transform may itself await).
    pub fn subscribe_async<O, F, Fut>(&self, mut transform: F) -> Handler<O>
    where
        O: Clone + 'static,
        F: FnMut(E) -> Fut + 'static,
        Fut: Future<Output = Halted<O>> + 'static,
    {
        self.attach(Rc::new(RefCell::new(move |value: E| {
            TransformOut::Later(transform(value).boxed_local())
        })))
    }

    /// Convenience for an infallible synchronous transform.
    pub fn map<O, F>(&self, mut f: F) -> Handler<O>
    where
        O: Clone + 'static,
        F: FnMut(E) -> O + 'static,
    {
        self.subscribe(move |value| Ok(f(value)))
    }

    /// The upstream stream facet, for interop outside the handler graph.
    pub fn source(&self) -> Stream<Feed<E>> {
        self.source.clone()
    }

    /// Subscribes a raw feed observer with scope-bound teardown.
    ///
    /// Listener registration goes through here: observers see items at
    /// propagation time, before async stages resolve.
    pub(crate) fn observe(&self, edge: impl FnMut(Feed<E>) + 'static) {
        let subscription = self.source.subscribe(edge);
        scope::on_teardown(move || subscription.unsubscribe());
    }

    fn attach<O: Clone + 'static>(&self, transform: BoxedTransform<E, O>) -> Handler<O> {
        let downstream: Stream<Feed<O>> = Stream::new();
        let down = downstream.clone();

        let subscription = self.source.subscribe(move |feed: Feed<E>| match feed {
            Feed::Value(value) => {
                let out = {
                    let mut transform = transform.borrow_mut();
                    (&mut *transform)(value)
                };
                match out {
                    TransformOut::Now(Ok(next)) => {
                        let down = down.clone();
                        scheduler::enqueue_pure(Box::new(move || down.push(Feed::Value(next))));
                    }
                    TransformOut::Now(Err(halt)) => log_halt(&halt),
                    TransformOut::Later(fut) => {
                        let step = noted(fut).boxed_local().shared();
                        drive(step.clone());
                        let down = down.clone();
                        scheduler::enqueue_pure(Box::new(move || down.push(Feed::Async(step))));
                    }
                }
            }
            Feed::Async(step) => {
                let chained = chain(step, Rc::clone(&transform));
                drive(chained.clone());
                let down = down.clone();
                scheduler::enqueue_pure(Box::new(move || down.push(Feed::Async(chained))));
            }
        });
        scope::on_teardown(move || subscription.unsubscribe());

        Handler {
            source: downstream,
        }
    }
}

/// Chains a pending upstream step through a transform.
///
/// Upstream halts pass through untouched; the transform is invoked only for
/// resolved values, and its own future output is flattened.
fn chain<E, O>(step: StepFuture<E>, transform: BoxedTransform<E, O>) -> StepFuture<O>
where
    E: Clone + 'static,
    O: Clone + 'static,
{
    async move {
        match step.await {
            Err(halt) => Err(halt),
            Ok(value) => {
                let out = {
                    let mut transform = transform.borrow_mut();
                    (&mut *transform)(value)
                };
                let resolved = match out {
                    TransformOut::Now(result) => result,
                    TransformOut::Later(fut) => fut.await,
                };
                if let Err(halt) = &resolved {
                    log_halt(halt);
                }
                resolved
            }
        }
    }
    .boxed_local()
    .shared()
}

/// Logs a halt produced by an async transform at its resolution.
async fn noted<O: Clone + 'static>(fut: LocalBoxFuture<'static, Halted<O>>) -> Halted<O> {
    let resolved = fut.await;
    if let Err(halt) = &resolved {
        log_halt(halt);
    }
    resolved
}

/// Keeps a shared step eager: futures are lazy, emissions are not.
fn drive<E: Clone + 'static>(step: StepFuture<E>) {
    tokio::task::spawn_local(async move {
        let _ = step.await;
    });
}

fn log_halt(halt: &Halt) {
    log::info!("{halt}");
}
