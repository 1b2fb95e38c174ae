//! Multi-consumer-group partitioned queue on a versioned key-value table.
//!
//! `ttqueue` builds an at-least-once queue from nothing but row/column reads and
//! writes under MVCC snapshots and an atomic per-cell counter:
//!
//! - Producers [`enqueue`](QueueManager::enqueue) entries and get strictly
//!   increasing ids from the global counter
//! - Every consumer group sees every entry; within a group each entry has one owner
//! - [`PartitionerKind::Hash`] lets instances pick their entries by header hash
//!   without coordinating
//! - [`PartitionerKind::RoundRobin`] hands out one id at a time through a shared
//!   group pointer
//! - Served entries stay claimed until [`ack`](QueueManager::ack)ed and are served
//!   again after a consumer reloads its state
//!
//! Storage is any [`VersionedTable`]; [`DeterministicVersionedTable`] is the
//! in-memory implementation.
//!
//! ## Example
//!
//! ```ignore
//! use ttqueue::{DeterministicVersionedTable, MemoryTimestampOracle, PartitionerKind};
//! use ttqueue::{QueueConfig, QueueConsumer, QueueEntry, QueueManager};
//!
//! let table = DeterministicVersionedTable::new();
//! let oracle = MemoryTimestampOracle::new();
//! let queue = QueueManager::new(table, "jobs", QueueConfig::new(PartitionerKind::Hash))?;
//!
//! let entry = QueueEntry::new(b"payload".to_vec()).with_partition("user", 42);
//! queue.enqueue(&entry, oracle.write_version()).await?;
//!
//! let group_id = queue.allocate_group_id().await?;
//! let consumer = QueueConsumer::new(group_id, 0, 2).with_partitioning_key("user");
//! let rp = oracle.read_pointer();
//! if let Some((pointer, entry)) = queue.dequeue(&consumer, queue.config(), None, &rp).await?.into_success() {
//!     // process entry.data
//!     queue.ack(&pointer, &consumer, &oracle.read_pointer()).await?;
//! }
//! ```

pub mod config;
mod error;
pub mod queue;
mod types;
pub mod verified;

pub use config::PartitionerKind;
pub use config::QueueConfig;
pub use error::QueueError;
pub use queue::QueueManager;
pub use queue::QueueState;
pub use ttqueue_table::DeterministicVersionedTable;
pub use ttqueue_table::MemoryTimestampOracle;
pub use ttqueue_table::ReadPointer;
pub use ttqueue_table::TableError;
pub use ttqueue_table::VersionedTable;
pub use ttqueue_table::WriteVersion;
pub use types::ClaimState;
pub use types::DequeueResult;
pub use types::EnqueueResult;
pub use types::EntryState;
pub use types::QueueConsumer;
pub use types::QueueEntry;
pub use types::QueueEntryPointer;
pub use types::QueueInfo;
