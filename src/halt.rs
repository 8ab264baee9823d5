//! # Halt signal: stop propagation along one edge.
//!
//! [`Halt`] is the in-band marker meaning "this emission stops here". A
//! transform halts by returning `Err(Halt)`; the owning handler swallows the
//! marker (logged at `info`) and suppresses everything downstream of that
//! edge for the current emission. Sibling edges are unaffected.
//!
//! Inside async transforms the same marker travels as the `Err` arm of the
//! resolved value, so an intentional stop is never conflated with a panic.

use thiserror::Error;

/// Marker value that stops propagation along the current edge.
///
/// Carries an optional human-readable reason for logs.
#[derive(Error, Debug, Clone, Default, PartialEq, Eq)]
#[error("propagation halted ({})", .reason.as_deref().unwrap_or("no reason"))]
pub struct Halt {
    /// Why the emission was stopped, if the caller said.
    pub reason: Option<String>,
}

impl Halt {
    /// Halt without a reason.
    pub fn new() -> Self {
        Self { reason: None }
    }

    /// Halt with a reason string for logs.
    pub fn because(reason: impl Into<String>) -> Self {
        Self {
            reason: Some(reason.into()),
        }
    }
}

/// Result of one transform step: a value, or a halt.
pub type Halted<T> = Result<T, Halt>;

/// Stops propagation along the current edge with a reason.
///
/// Use as the tail expression of a transform:
///
/// ```
/// use eventflow::{halt, Halted};
///
/// fn validate(word: String) -> Halted<String> {
///     if word.len() < 3 {
///         return halt("too short");
///     }
///     Ok(word)
/// }
/// ```
///
/// For a silent halt, return `Err(Halt::new())`.
pub fn halt<T>(reason: impl Into<String>) -> Halted<T> {
    Err(Halt::because(reason))
}
