//! Queue sizing constants.

/// Default number of entries each consumer instance claims per fetch.
///
/// The disjoint fetch window spans `batch_size * group_size` entry ids.
pub const DEFAULT_BATCH_SIZE: u32 = 20;

/// Maximum configurable batch size.
pub const MAX_BATCH_SIZE: u32 = 1_000;

/// Maximum number of consumer instances in one consumer group.
pub const MAX_GROUP_SIZE: u32 = 1_024;

/// Maximum number of partitioning keys carried by a single entry.
pub const MAX_PARTITION_KEYS: u32 = 32;

/// Maximum size of a partitioning key in bytes.
pub const MAX_PARTITION_KEY_SIZE: u32 = 256;

/// Maximum size of a queue name in bytes.
///
/// Queue names are length-prefixed with a `u16` in every row key.
pub const MAX_QUEUE_NAME_SIZE: u32 = 1_024;

/// First entry id handed out by the global entry allocator.
pub const FIRST_QUEUE_ENTRY_ID: u64 = 1;

/// Stored in the active-entry column when a consumer has no active entry.
///
/// Entry ids start at [`FIRST_QUEUE_ENTRY_ID`], so zero never names a real entry.
pub const NO_ENTRY_ID: u64 = 0;
