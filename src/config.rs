//! Queue configuration.
//!
//! A [`QueueConfig`] selects one partitioning discipline and a batch size. It is
//! immutable for the lifetime of a queue usage and may be loaded from TOML:
//!
//! ```toml
//! partitioner = "hash"
//! batch_size = 50
//! ```

use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;
use snafu::ResultExt;
use ttqueue_constants::DEFAULT_BATCH_SIZE;
use ttqueue_constants::MAX_BATCH_SIZE;

use crate::error::ParseConfigSnafu;
use crate::error::QueueError;
use crate::error::ReadConfigSnafu;
use crate::types::QueueConsumer;
use crate::verified;

/// Strategy deciding which consumer instance of a group owns which entry.
///
/// The two variants use different claiming protocols and are matched exhaustively
/// by the fetch loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartitionerKind {
    /// Disjoint hash partitioning.
    ///
    /// Each instance scans the id space on its own and keeps entries whose header
    /// hash for the consumer's partitioning key maps to its instance id.
    Hash,
    /// Shared FIFO partitioning.
    ///
    /// Instances claim one id at a time by incrementing the group's shared read
    /// pointer; the incrementing instance owns the id.
    #[serde(alias = "fifo")]
    RoundRobin,
}

impl PartitionerKind {
    /// Whether instances can decide ownership without coordinating.
    pub fn is_disjoint(&self) -> bool {
        match self {
            Self::Hash => true,
            Self::RoundRobin => false,
        }
    }

    /// Whether ownership depends on per-entry header values.
    pub fn uses_header_data(&self) -> bool {
        match self {
            Self::Hash => true,
            Self::RoundRobin => false,
        }
    }

    /// Whether `consumer` should emit entry `entry_id`.
    ///
    /// `hash_value` is the entry's header value for the consumer's partitioning key,
    /// or `None` if the entry carries no such header. Round-robin ownership was
    /// already decided by the shared pointer increment, so every claimed id is emitted.
    pub fn should_emit(&self, consumer: &QueueConsumer, entry_id: u64, hash_value: Option<i32>) -> bool {
        debug_assert!(entry_id > 0, "PARTITION: entry ids start at 1");
        match self {
            Self::Hash => verified::should_emit_hashed(hash_value, consumer.group_size, consumer.instance_id),
            Self::RoundRobin => true,
        }
    }
}

impl FromStr for PartitionerKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "hash" => Ok(Self::Hash),
            "round_robin" | "roundrobin" | "fifo" => Ok(Self::RoundRobin),
            _ => Err(format!("invalid partitioner: '{}' (expected: hash, round_robin, fifo)", s)),
        }
    }
}

impl std::fmt::Display for PartitionerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Hash => write!(f, "hash"),
            Self::RoundRobin => write!(f, "round_robin"),
        }
    }
}

/// Configuration for one queue usage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct QueueConfig {
    /// Partitioning discipline.
    pub partitioner: PartitionerKind,

    /// Entries each instance fetches per round trip.
    ///
    /// The disjoint fetch window spans `batch_size * group_size` ids. Round-robin
    /// queues always claim one id at a time.
    ///
    /// Default: 20. Zero is treated as 1.
    #[serde(default = "default_batch_size")]
    pub batch_size: u32,
}

impl QueueConfig {
    pub fn new(partitioner: PartitionerKind) -> Self {
        Self {
            partitioner,
            batch_size: default_batch_size(),
        }
    }

    pub fn with_batch_size(mut self, batch_size: u32) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Batch size used by the fetch loop.
    pub fn effective_batch_size(&self) -> u64 {
        match self.partitioner {
            PartitionerKind::Hash => verified::effective_batch_size(self.batch_size),
            PartitionerKind::RoundRobin => 1,
        }
    }

    /// Reject configurations outside the fixed bounds.
    pub fn validate(&self) -> Result<(), QueueError> {
        if self.batch_size > MAX_BATCH_SIZE {
            return Err(QueueError::InvalidConfig {
                reason: format!("batch size {} exceeds maximum of {}", self.batch_size, MAX_BATCH_SIZE),
            });
        }
        Ok(())
    }

    /// Parse and validate a config from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, QueueError> {
        let config: QueueConfig = toml::from_str(text).context(ParseConfigSnafu)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a config file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, QueueError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).context(ReadConfigSnafu { path })?;
        Self::from_toml_str(&text)
    }
}

pub(crate) fn default_batch_size() -> u32 {
    DEFAULT_BATCH_SIZE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partitioner_capabilities() {
        assert!(PartitionerKind::Hash.is_disjoint());
        assert!(PartitionerKind::Hash.uses_header_data());
        assert!(!PartitionerKind::RoundRobin.is_disjoint());
        assert!(!PartitionerKind::RoundRobin.uses_header_data());
    }

    #[test]
    fn test_partitioner_from_str() {
        assert_eq!("hash".parse::<PartitionerKind>().unwrap(), PartitionerKind::Hash);
        assert_eq!("FIFO".parse::<PartitionerKind>().unwrap(), PartitionerKind::RoundRobin);
        assert_eq!("round_robin".parse::<PartitionerKind>().unwrap(), PartitionerKind::RoundRobin);
        assert!("random".parse::<PartitionerKind>().is_err());
    }

    #[test]
    fn test_hash_emit_by_instance() {
        let c0 = QueueConsumer::new(1, 0, 2).with_partitioning_key("k");
        let c1 = QueueConsumer::new(1, 1, 2).with_partitioning_key("k");
        assert!(PartitionerKind::Hash.should_emit(&c0, 1, Some(4)));
        assert!(!PartitionerKind::Hash.should_emit(&c1, 1, Some(4)));
        assert!(!PartitionerKind::Hash.should_emit(&c0, 1, None));
        assert!(PartitionerKind::RoundRobin.should_emit(&c1, 1, None));
    }

    #[test]
    fn test_toml_defaults() {
        let config = QueueConfig::from_toml_str("partitioner = \"hash\"").unwrap();
        assert_eq!(config.partitioner, PartitionerKind::Hash);
        assert_eq!(config.batch_size, DEFAULT_BATCH_SIZE);
    }

    #[test]
    fn test_toml_fifo_alias() {
        let config = QueueConfig::from_toml_str("partitioner = \"fifo\"\nbatch_size = 5").unwrap();
        assert_eq!(config.partitioner, PartitionerKind::RoundRobin);
        assert_eq!(config.effective_batch_size(), 1);
    }

    #[test]
    fn test_toml_rejects_oversized_batch() {
        let text = format!("partitioner = \"hash\"\nbatch_size = {}", MAX_BATCH_SIZE + 1);
        assert!(matches!(QueueConfig::from_toml_str(&text), Err(QueueError::InvalidConfig { .. })));
    }

    #[test]
    fn test_toml_requires_partitioner() {
        assert!(matches!(QueueConfig::from_toml_str("batch_size = 3"), Err(QueueError::ParseConfig { .. })));
    }

    #[test]
    fn test_zero_batch_clamped() {
        assert_eq!(QueueConfig::new(PartitionerKind::Hash).with_batch_size(0).effective_batch_size(), 1);
    }
}
