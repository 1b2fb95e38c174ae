//! Partitioned, multi-group queue on a versioned table.
//!
//! A queue is a set of rows in a [`VersionedTable`]: a global entry counter, one
//! data row per entry, and one state row per consumer instance. Producers append
//! entries; every consumer group sees every entry, and within a group each entry
//! is owned by exactly one instance.
//!
//! Features:
//! - Strictly increasing entry ids from a single atomic counter
//! - Disjoint hash partitioning with coordination-free batch fetching
//! - Shared round-robin (FIFO) partitioning through a per-group atomic pointer
//! - At-least-once delivery: an unacked entry is served again after a reload
//! - Invalidation with meta tombstones that scanners skip

mod ack_unack;
mod allocator;
mod dequeue;
mod fetch;
mod state;
mod store;

use std::sync::Arc;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

pub use state::CachedEntries;
pub use state::CachedEntry;
pub use state::QueueState;
use tracing::debug;
use tracing::warn;
use ttqueue_constants::MAX_QUEUE_NAME_SIZE;
use ttqueue_table::VersionedTable;

use crate::config::QueueConfig;
use crate::error::QueueError;
use crate::types::QueueConsumer;
use crate::types::QueueEntryPointer;
use crate::types::QueueInfo;

/// Manager for one named queue.
///
/// Holds no per-consumer state; consumers keep their own [`QueueState`] or let
/// each dequeue rebuild it from storage.
pub struct QueueManager<T: VersionedTable + ?Sized> {
    table: Arc<T>,
    name: String,
    config: QueueConfig,
    dequeue_returns: AtomicU64,
}

impl<T: VersionedTable + ?Sized + 'static> QueueManager<T> {
    /// Create a manager for queue `name` with default config `config`.
    pub fn new(table: Arc<T>, name: impl Into<String>, config: QueueConfig) -> Result<Self, QueueError> {
        let name = name.into();
        if name.is_empty() {
            return Err(QueueError::InvalidQueueName {
                reason: "queue name must not be empty".to_string(),
            });
        }
        if name.len() > MAX_QUEUE_NAME_SIZE as usize {
            return Err(QueueError::InvalidQueueName {
                reason: format!("queue name of {} bytes exceeds maximum of {}", name.len(), MAX_QUEUE_NAME_SIZE),
            });
        }
        config.validate()?;
        if config.batch_size == 0 {
            warn!(queue = %name, partitioner = %config.partitioner, "batch size 0 treated as 1");
        }

        debug!(queue = %name, partitioner = %config.partitioner, batch_size = config.batch_size, "queue manager created");
        Ok(Self {
            table,
            name,
            config,
            dequeue_returns: AtomicU64::new(0),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Default config used when a consumer carries none.
    pub fn config(&self) -> &QueueConfig {
        &self.config
    }

    /// Number of entries served by this manager since it was created.
    pub fn dequeue_returns(&self) -> u64 {
        self.dequeue_returns.load(Ordering::Relaxed)
    }

    /// Current information about the queue.
    pub async fn queue_info(&self) -> Result<QueueInfo, QueueError> {
        Ok(QueueInfo {
            name: self.name.clone(),
            write_pointer: self.peek_write_pointer().await?,
        })
    }

    fn config_for<'a>(&'a self, consumer: &'a QueueConsumer) -> &'a QueueConfig {
        consumer.config.as_ref().unwrap_or(&self.config)
    }

    fn check_pointer(&self, pointer: &QueueEntryPointer) -> Result<(), QueueError> {
        if pointer.queue_name != self.name {
            return Err(QueueError::ForeignPointer {
                expected: self.name.clone(),
                actual: pointer.queue_name.clone(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use ttqueue_table::DeterministicVersionedTable;
    use ttqueue_table::WriteVersion;

    use super::*;
    use crate::config::PartitionerKind;

    #[test]
    fn test_rejects_empty_name() {
        let result = QueueManager::new(DeterministicVersionedTable::new(), "", QueueConfig::new(PartitionerKind::Hash));
        assert!(matches!(result, Err(QueueError::InvalidQueueName { .. })));
    }

    #[test]
    fn test_rejects_oversized_name() {
        let name = "q".repeat(MAX_QUEUE_NAME_SIZE as usize + 1);
        let result = QueueManager::new(DeterministicVersionedTable::new(), name, QueueConfig::new(PartitionerKind::Hash));
        assert!(matches!(result, Err(QueueError::InvalidQueueName { .. })));
    }

    #[test]
    fn test_rejects_invalid_config() {
        let config = QueueConfig::new(PartitionerKind::Hash).with_batch_size(u32::MAX);
        let result = QueueManager::new(DeterministicVersionedTable::new(), "q", config);
        assert!(matches!(result, Err(QueueError::InvalidConfig { .. })));
    }

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for CapturedLogs {
        type Writer = CapturedLogs;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    #[test]
    fn test_zero_batch_size_warned_once() {
        let logs = CapturedLogs::default();
        let subscriber = tracing_subscriber::fmt().with_writer(logs.clone()).with_ansi(false).finish();

        tracing::subscriber::with_default(subscriber, || {
            let config = QueueConfig::new(PartitionerKind::Hash).with_batch_size(0);
            let manager = QueueManager::new(DeterministicVersionedTable::new(), "zero", config).unwrap();
            for _ in 0..3 {
                assert_eq!(manager.config().effective_batch_size(), 1);
            }
        });

        let output = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        assert_eq!(output.matches("batch size 0 treated as 1").count(), 1);
    }

    #[tokio::test]
    async fn test_queue_info_tracks_write_pointer() {
        let manager =
            QueueManager::new(DeterministicVersionedTable::new(), "info", QueueConfig::new(PartitionerKind::Hash)).unwrap();
        assert_eq!(manager.queue_info().await.unwrap().write_pointer, 0);
        manager.enqueue_bytes(b"a".to_vec(), WriteVersion(1)).await.unwrap();
        manager.enqueue_bytes(b"b".to_vec(), WriteVersion(2)).await.unwrap();
        let info = manager.queue_info().await.unwrap();
        assert_eq!(info.name, "info");
        assert_eq!(info.write_pointer, 2);
    }

    #[tokio::test]
    async fn test_queues_sharing_a_table_are_isolated() {
        let table = DeterministicVersionedTable::new();
        let a = QueueManager::new(table.clone(), "a", QueueConfig::new(PartitionerKind::Hash)).unwrap();
        let ab = QueueManager::new(table, "ab", QueueConfig::new(PartitionerKind::Hash)).unwrap();
        a.enqueue_bytes(b"x".to_vec(), WriteVersion(1)).await.unwrap();
        assert_eq!(a.queue_info().await.unwrap().write_pointer, 1);
        assert_eq!(ab.queue_info().await.unwrap().write_pointer, 0);
    }
}
