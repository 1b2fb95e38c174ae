//! Queue data types.
//!
//! Entries, consumer identities, entry pointers and operation results shared by the
//! queue shell and its callers.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;
use ttqueue_constants::MAX_GROUP_SIZE;

use crate::config::PartitionerKind;
use crate::config::QueueConfig;
use crate::error::QueueError;

/// Lifecycle state of a stored entry.
///
/// Stored in the entry meta column. States only move forward: an entry that is
/// `Invalid` or `Evicted` has had its payload removed and is never served again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryState {
    Valid,
    Invalid,
    Evicted,
}

/// Claim state of one entry for one consumer instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimState {
    /// Served to the consumer and awaiting acknowledgment.
    Claimed,
    /// Acknowledged. Terminal.
    Acked,
}

impl std::fmt::Display for ClaimState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClaimState::Claimed => write!(f, "CLAIMED"),
            ClaimState::Acked => write!(f, "ACKED"),
        }
    }
}

/// A unit of queued payload plus routing metadata.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct QueueEntry {
    /// Opaque payload.
    pub data: Vec<u8>,
    /// Partitioning key to hash value, written as header columns at enqueue.
    #[serde(default)]
    pub partitioning: BTreeMap<String, i32>,
}

impl QueueEntry {
    /// Entry with no partitioning headers.
    pub fn new(data: impl Into<Vec<u8>>) -> Self {
        Self {
            data: data.into(),
            partitioning: BTreeMap::new(),
        }
    }

    /// Add a partitioning header.
    pub fn with_partition(mut self, key: impl Into<String>, hash_value: i32) -> Self {
        self.partitioning.insert(key.into(), hash_value);
        self
    }
}

/// Identity of one consumer instance within a consumer group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueConsumer {
    /// Consumer group id. Every group sees every entry.
    pub group_id: u64,
    /// Instance id within the group, in `0..group_size`.
    pub instance_id: u32,
    /// Number of instances in the group.
    pub group_size: u32,
    /// Header key used by the hash partitioner.
    #[serde(default)]
    pub partitioning_key: Option<String>,
    /// Per-consumer queue configuration, overriding the manager default.
    #[serde(default)]
    pub config: Option<QueueConfig>,
}

impl QueueConsumer {
    pub fn new(group_id: u64, instance_id: u32, group_size: u32) -> Self {
        Self {
            group_id,
            instance_id,
            group_size,
            partitioning_key: None,
            config: None,
        }
    }

    pub fn with_partitioning_key(mut self, key: impl Into<String>) -> Self {
        self.partitioning_key = Some(key.into());
        self
    }

    pub fn with_config(mut self, config: QueueConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Check the consumer identity against the partitioner it will be used with.
    pub fn validate(&self, partitioner: PartitionerKind) -> Result<(), QueueError> {
        if self.group_size == 0 || self.group_size > MAX_GROUP_SIZE {
            return Err(QueueError::InvalidConsumer {
                reason: format!("group size {} must be in 1..={}", self.group_size, MAX_GROUP_SIZE),
            });
        }
        if self.instance_id >= self.group_size {
            return Err(QueueError::InvalidConsumer {
                reason: format!("instance id {} must be below group size {}", self.instance_id, self.group_size),
            });
        }
        if partitioner.uses_header_data() && self.partitioning_key.as_deref().is_none_or(str::is_empty) {
            return Err(QueueError::InvalidConsumer {
                reason: "hash partitioner requires a partitioning key".to_string(),
            });
        }
        Ok(())
    }
}

/// Stable external handle to one entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QueueEntryPointer {
    pub queue_name: String,
    pub entry_id: u64,
}

impl QueueEntryPointer {
    pub fn new(queue_name: impl Into<String>, entry_id: u64) -> Self {
        Self {
            queue_name: queue_name.into(),
            entry_id,
        }
    }
}

impl std::fmt::Display for QueueEntryPointer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}#{}", self.queue_name, self.entry_id)
    }
}

/// Result of a successful enqueue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnqueueResult {
    pub pointer: QueueEntryPointer,
}

/// Result of a dequeue.
///
/// `Empty` is a normal outcome meaning no work is currently available.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DequeueResult {
    Success {
        pointer: QueueEntryPointer,
        entry: QueueEntry,
    },
    Empty,
}

impl DequeueResult {
    pub fn is_empty(&self) -> bool {
        matches!(self, DequeueResult::Empty)
    }

    pub fn pointer(&self) -> Option<&QueueEntryPointer> {
        match self {
            DequeueResult::Success { pointer, .. } => Some(pointer),
            DequeueResult::Empty => None,
        }
    }

    pub fn entry(&self) -> Option<&QueueEntry> {
        match self {
            DequeueResult::Success { entry, .. } => Some(entry),
            DequeueResult::Empty => None,
        }
    }

    /// Consume the result, yielding the pointer and entry if one was served.
    pub fn into_success(self) -> Option<(QueueEntryPointer, QueueEntry)> {
        match self {
            DequeueResult::Success { pointer, entry } => Some((pointer, entry)),
            DequeueResult::Empty => None,
        }
    }
}

/// Point-in-time information about a queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueInfo {
    pub name: String,
    /// Highest entry id allocated so far. Zero for a queue that has never been written.
    pub write_pointer: u64,
}
