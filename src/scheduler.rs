//! # Three-queue scheduler: pure, mutation, listener.
//!
//! The scheduler enforces one cross-cutting ordering property: when a value
//! is emitted, all pure transforms propagate to fixpoint before any mutation
//! effect runs, and all mutation effects run before any listener effect.
//! Within a queue, enqueue order is preserved.
//!
//! ## Architecture
//! ```text
//! emit(value)
//!   │ enqueue                          flush_queues()
//!   ▼                                       │
//! [pure queue] ──► deliveries into streams ─┤  drained to fixpoint
//! [mutation queue] ──► mutation effects ────┤  snapshot, then run
//! [listener queue] ──► listener effects ────┘  snapshot, then run
//! ```
//!
//! ## Rules
//! - All state is per-thread: the core is single-threaded and a queue must
//!   order every emission on its thread, which also gives each test thread
//!   an isolated scheduler.
//! - `flush_queues` is a no-op while a flush is in progress. The in-progress
//!   flush loops pure → mutation → listener until all three queues are
//!   empty, so work enqueued by reentrant emits drains in the correct phase.
//! - The pure queue drains front-to-back while non-empty: tasks it enqueues
//!   run in the same pass. Mutation and listener drains run a snapshot;
//!   effects enqueued during the drain wait for the next phase loop.
//! - Running flags clear on unwind. A panicking effect aborts its snapshot
//!   (the remaining effects of that drain are dropped) but leaves the
//!   scheduler usable.

use std::cell::{Cell, OnceCell, RefCell};
use std::collections::VecDeque;
use std::mem;

use crate::config::Config;

type Task = Box<dyn FnOnce()>;

/// Which effect queue a deferred side effect belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Lane {
    /// Drained after pure propagation, before listeners.
    Mutation,
    /// Drained last.
    Listener,
}

/// Snapshot of the three queue depths, as reported by [`introspect_queues`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct QueueDepths {
    /// Pending pure-delivery tasks.
    pub pure: usize,
    /// Pending mutation effects.
    pub mutation: usize,
    /// Pending listener effects.
    pub listener: usize,
}

struct Scheduler {
    pure: RefCell<VecDeque<Task>>,
    mutation: RefCell<VecDeque<Task>>,
    listener: RefCell<VecDeque<Task>>,
    pure_running: Cell<bool>,
    mutation_running: Cell<bool>,
    listener_running: Cell<bool>,
    flushing: Cell<bool>,
    scheduled: Cell<bool>,
    warn_depth: usize,
}

thread_local! {
    static SCHEDULER: OnceCell<Scheduler> = const { OnceCell::new() };
}

fn with_scheduler<R>(f: impl FnOnce(&Scheduler) -> R) -> R {
    SCHEDULER.with(|cell| f(cell.get_or_init(|| Scheduler::new(Config::default()))))
}

/// Seeds this thread's scheduler with `config`.
///
/// Returns `false` (and logs a warning) if the scheduler was already created
/// by an earlier emit, flush, or `configure` call; the configuration is then
/// ignored.
pub fn configure(config: Config) -> bool {
    let fresh = SCHEDULER.with(|cell| cell.set(Scheduler::new(config)).is_ok());
    if !fresh {
        log::warn!("scheduler already initialized on this thread; configuration ignored");
    }
    fresh
}

/// Clears a running flag on scope exit, panics included.
struct FlagGuard<'a>(&'a Cell<bool>);

impl Drop for FlagGuard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

fn acquire(flag: &Cell<bool>) -> Option<FlagGuard<'_>> {
    if flag.replace(true) {
        None
    } else {
        Some(FlagGuard(flag))
    }
}

impl Scheduler {
    fn new(config: Config) -> Self {
        Self {
            pure: RefCell::new(VecDeque::with_capacity(config.queue_capacity)),
            mutation: RefCell::new(VecDeque::with_capacity(config.queue_capacity)),
            listener: RefCell::new(VecDeque::with_capacity(config.queue_capacity)),
            pure_running: Cell::new(false),
            mutation_running: Cell::new(false),
            listener_running: Cell::new(false),
            flushing: Cell::new(false),
            scheduled: Cell::new(false),
            warn_depth: config.warn_depth,
        }
    }

    fn flush(&self) {
        let Some(_flushing) = acquire(&self.flushing) else {
            return;
        };

        loop {
            self.drain_pure();
            self.drain_effects(&self.mutation, &self.mutation_running);
            self.drain_effects(&self.listener, &self.listener_running);

            let done = self.pure.borrow().is_empty()
                && self.mutation.borrow().is_empty()
                && self.listener.borrow().is_empty();
            if done {
                break;
            }
        }
    }

    fn drain_pure(&self) {
        let Some(_running) = acquire(&self.pure_running) else {
            return;
        };

        // Pop one at a time: a delivery may enqueue further deliveries, and
        // those belong to this same pass.
        loop {
            let task = self.pure.borrow_mut().pop_front();
            match task {
                Some(task) => task(),
                None => break,
            }
        }
    }

    fn drain_effects(&self, queue: &RefCell<VecDeque<Task>>, running: &Cell<bool>) {
        let Some(_running) = acquire(running) else {
            return;
        };

        let batch = mem::take(&mut *queue.borrow_mut());
        for task in batch {
            task();
        }
    }

    fn depths(&self) -> QueueDepths {
        QueueDepths {
            pure: self.pure.borrow().len(),
            mutation: self.mutation.borrow().len(),
            listener: self.listener.borrow().len(),
        }
    }
}

pub(crate) fn enqueue_pure(task: Task) {
    with_scheduler(|s| s.pure.borrow_mut().push_back(task));
}

pub(crate) fn enqueue_effect(lane: Lane, task: Task) {
    with_scheduler(|s| match lane {
        Lane::Mutation => s.mutation.borrow_mut().push_back(task),
        Lane::Listener => s.listener.borrow_mut().push_back(task),
    });
}

/// Drains the queues in order: pure, mutation, listener.
///
/// Called automatically by every emit; exposed for diagnostics and tests.
/// A call made while a flush is already in progress is a no-op; the
/// in-progress flush picks up whatever was enqueued.
pub fn flush_queues() {
    with_scheduler(Scheduler::flush);
}

/// Requests a deferred flush.
///
/// No-op while a flush is running (that flush will drain the new work) or
/// while a deferred flush is already pending. Otherwise spawns a local task
/// that flushes; this is the path async continuations use, so it always runs
/// inside a `LocalSet`.
pub(crate) fn schedule_flush() {
    let spawn = with_scheduler(|s| {
        if s.flushing.get() || s.scheduled.get() {
            return false;
        }
        s.scheduled.set(true);
        true
    });

    if spawn {
        tokio::task::spawn_local(async {
            with_scheduler(|s| s.scheduled.set(false));
            flush_queues();
        });
    }
}

/// Reports the current queue depths.
///
/// Logs at `debug`, or at `warn` once any depth passes the configured
/// [`Config::warn_depth`](crate::Config).
pub fn introspect_queues() -> QueueDepths {
    with_scheduler(|s| {
        let depths = s.depths();
        let deepest = depths.pure.max(depths.mutation).max(depths.listener);
        if deepest > s.warn_depth {
            log::warn!(
                "queue depth past threshold: pure={} mutation={} listener={}",
                depths.pure,
                depths.mutation,
                depths.listener
            );
        } else {
            log::debug!(
                "queue depths: pure={} mutation={} listener={}",
                depths.pure,
                depths.mutation,
                depths.listener
            );
        }
        depths
    })
}
