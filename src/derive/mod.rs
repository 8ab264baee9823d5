//! # Derivations built on handler subscription.
//!
//! - [`create_partition`]: split a handler into a matching and a
//!   non-matching branch.
//! - [`create_listener`] / [`create_mutation_listener`]: deferred side
//!   effects, drained in the listener / mutation phase.
//! - [`create_sync_listener`]: observe an emission at propagation time,
//!   before async stages resolve.

mod listener;
mod partition;

pub use listener::{SyncPayload, create_listener, create_mutation_listener, create_sync_listener};
pub use partition::create_partition;
