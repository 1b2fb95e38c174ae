//! Error types for queue operations.

use std::path::PathBuf;

use snafu::Snafu;
use ttqueue_table::TableError;

/// Errors from queue operations.
///
/// An empty queue is not an error; see [`DequeueResult::Empty`](crate::DequeueResult::Empty).
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum QueueError {
    /// Ack of an entry that was never claimed, or is no longer claimed.
    #[snafu(display("illegal ack of entry {entry_id}: {reason}"))]
    IllegalAck {
        /// The entry being acknowledged.
        entry_id: u64,
        /// Why the ack was rejected.
        reason: String,
    },

    /// Underlying table operation failed.
    #[snafu(display("internal error during {operation}: {source}"))]
    Internal {
        /// Description of the operation.
        operation: String,
        /// The storage failure.
        source: TableError,
    },

    /// Partition headers could not be encoded.
    #[snafu(display("header serialization failed: {reason}"))]
    HeaderSerialization {
        /// Description of what went wrong.
        reason: String,
    },

    /// Data in storage is corrupted or unparseable.
    #[snafu(display("corrupted data in key '{key}': {reason}"))]
    CorruptedData {
        /// The key with corrupted data.
        key: String,
        /// Description of what went wrong.
        reason: String,
    },

    /// Consumer identity is not usable with the configured partitioner.
    #[snafu(display("invalid consumer: {reason}"))]
    InvalidConsumer {
        /// Description of what went wrong.
        reason: String,
    },

    /// Queue configuration is out of bounds.
    #[snafu(display("invalid queue config: {reason}"))]
    InvalidConfig {
        /// Description of what went wrong.
        reason: String,
    },

    /// Queue name is empty or too long.
    #[snafu(display("invalid queue name: {reason}"))]
    InvalidQueueName {
        /// Description of what went wrong.
        reason: String,
    },

    /// Entry pointer names a different queue.
    #[snafu(display("pointer for queue '{actual}' used with queue '{expected}'"))]
    ForeignPointer {
        /// This queue's name.
        expected: String,
        /// The queue named by the pointer.
        actual: String,
    },

    /// Config file could not be read.
    #[snafu(display("failed to read config file {}: {source}", path.display()))]
    ReadConfig {
        /// Path of the config file.
        path: PathBuf,
        /// The underlying error.
        source: std::io::Error,
    },

    /// Config text is not valid TOML for a queue config.
    #[snafu(display("failed to parse queue config: {source}"))]
    ParseConfig {
        /// The underlying error.
        source: toml::de::Error,
    },
}

impl QueueError {
    /// Whether this error reports an internal failure rather than a caller mistake.
    ///
    /// Internal errors wrap storage failures, encoding failures and corrupted cells.
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            QueueError::Internal { .. } | QueueError::HeaderSerialization { .. } | QueueError::CorruptedData { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_illegal_ack_not_internal() {
        let err = QueueError::IllegalAck {
            entry_id: 4,
            reason: "Entry has never been claimed.".to_string(),
        };
        assert!(!err.is_internal());
        assert_eq!(err.to_string(), "illegal ack of entry 4: Entry has never been claimed.");
    }

    #[test]
    fn test_storage_failure_is_internal() {
        let err = QueueError::Internal {
            operation: "allocate entry id".to_string(),
            source: TableError::Failed {
                operation: "increment_atomic".to_string(),
                reason: "down".to_string(),
            },
        };
        assert!(err.is_internal());
    }
}
