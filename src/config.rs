//! # Scheduler configuration.
//!
//! [`Config`] defines the tuning knobs of the per-thread scheduler: initial
//! queue capacity and the depth at which [`introspect_queues`] escalates its
//! report from `debug` to `warn`.
//!
//! The scheduler is created lazily with [`Config::default`] on first use;
//! call [`configure`](crate::configure) before the first emit to override.
//!
//! # Example
//! ```
//! use eventflow::Config;
//!
//! let mut cfg = Config::default();
//! cfg.queue_capacity = 256;
//! cfg.warn_depth = 4096;
//!
//! assert_eq!(cfg.queue_capacity, 256);
//! ```
//!
//! [`introspect_queues`]: crate::introspect_queues

/// Tuning knobs for the per-thread scheduler.
#[derive(Clone, Debug)]
pub struct Config {
    /// Initial capacity reserved for each of the three queues.
    pub queue_capacity: usize,
    /// Queue depth at which [`introspect_queues`](crate::introspect_queues)
    /// logs a warning instead of a debug line.
    pub warn_depth: usize,
}

impl Default for Config {
    /// Provides a default configuration:
    /// - `queue_capacity = 64`
    /// - `warn_depth = 1024`
    fn default() -> Self {
        Self {
            queue_capacity: 64,
            warn_depth: 1024,
        }
    }
}
