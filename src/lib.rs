//! # eventflow
//!
//! **Eventflow** is a fine-grained event-composition core.
//!
//! It provides primitives to declare event sources, derive transformed
//! streams from them, split and merge them, and run side effects against
//! them, with a fixed propagation order, halt semantics, async flattening,
//! and scope-bound teardown. The crate is designed as a building block for
//! reactive runtimes and interactive applications.
//!
//! ## Features
//!
//! | Area              | Description                                                    | Key types / functions                                               |
//! |-------------------|----------------------------------------------------------------|---------------------------------------------------------------------|
//! | **Events**        | Declare sources and push values into them.                     | [`create_event`], [`Handler`], [`Emitter`]                          |
//! | **Transforms**    | Derive streams; stop propagation in-band.                      | [`Handler::subscribe`], [`Handler::subscribe_async`], [`halt`]      |
//! | **Listeners**     | Deferred side effects, per phase.                              | [`create_listener`], [`create_mutation_listener`], [`create_sync_listener`] |
//! | **Partition**     | Split a stream by predicate.                                   | [`create_partition`]                                                |
//! | **Topics**        | Hierarchical keyed routing with payload fan-out.               | [`create_topic`], [`TopicHandler`], [`TopicEmitter`]                |
//! | **Scheduling**    | Three-queue ordering; explicit flush and introspection.        | [`flush_queues`], [`introspect_queues`], [`QueueDepths`]            |
//! | **Scopes**        | Ownership regions with automatic teardown.                     | [`with_scope`], [`Scope`], [`on_teardown`]                          |
//! | **Configuration** | Scheduler tuning.                                              | [`Config`], [`configure`]                                           |
//!
//! ## Ordering
//!
//! Every emission runs to a fixpoint of pure transforms across the whole
//! handler graph before any side effect fires; mutation effects then run
//! before listener effects, each queue in FIFO order.
//!
//! ```
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! use eventflow::{create_event, create_listener, with_scope};
//!
//! let seen = Rc::new(RefCell::new(Vec::new()));
//!
//! let ((_on, emit), scope) = with_scope(|| {
//!     let (on, emit) = create_event::<i64>();
//!
//!     let push = |sink: Rc<RefCell<Vec<i64>>>| move |n| sink.borrow_mut().push(n);
//!     create_listener(&on, push(Rc::clone(&seen)));
//!
//!     let doubled = on.map(|n| n * 2);
//!     let quadrupled = doubled.map(|n| n * 2);
//!     create_listener(&quadrupled, push(Rc::clone(&seen)));
//!     create_listener(&doubled, push(Rc::clone(&seen)));
//!     create_listener(&on, push(Rc::clone(&seen)));
//!
//!     (on, emit)
//! });
//!
//! emit.emit(1);
//! assert_eq!(*seen.borrow(), [1, 1, 2, 4]);
//!
//! scope.dispose();
//! emit.emit(5); // no subscribers left
//! assert_eq!(seen.borrow().len(), 4);
//! ```
//!
//! Async transforms need a current-thread tokio runtime with a `LocalSet`;
//! purely synchronous graphs, like the one above, run without any runtime.
//!
//! ---

mod config;
mod derive;
mod event;
mod halt;
mod handler;
mod scheduler;
mod scope;
mod stream;
mod topic;

// ---- Public re-exports ----

pub use config::Config;
pub use derive::{
    SyncPayload, create_listener, create_mutation_listener, create_partition,
    create_sync_listener,
};
pub use event::{Emitter, create_event};
pub use halt::{Halt, Halted, halt};
pub use handler::{Feed, Handler, StepFuture};
pub use scheduler::{QueueDepths, configure, flush_queues, introspect_queues};
pub use scope::{Scope, on_teardown, with_scope};
pub use stream::{Stream, Subscription};
pub use topic::{TopicEmitter, TopicHandler, create_topic};
