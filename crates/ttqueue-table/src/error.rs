//! Error type for versioned table operations.

use thiserror::Error;

/// Errors surfaced by a [`VersionedTable`](crate::VersionedTable) implementation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TableError {
    /// A row or column key was empty.
    #[error("invalid key: {reason}")]
    InvalidKey { reason: String },
    /// An increment would overflow the 64-bit counter.
    #[error("counter overflow: {current} + {delta}")]
    CounterOverflow { current: i64, delta: i64 },
    /// The backend rejected or failed the operation.
    #[error("operation '{operation}' failed: {reason}")]
    Failed { operation: String, reason: String },
}
