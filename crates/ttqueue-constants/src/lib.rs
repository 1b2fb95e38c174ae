//! Centralized constants for the ttqueue engine.
//!
//! Constants are fixed and immutable, enforced at compile time. Each limit has an
//! explicit bound so that no queue operation allocates without limit.
//!
//! # Modules
//!
//! - [`queue`]: Batch sizing, group sizing, partition map bounds, entry id origin
//! - [`layout`]: Row family and column prefix bytes used by the key codec

mod assertions;
pub mod layout;
pub mod queue;

pub use queue::DEFAULT_BATCH_SIZE;
pub use queue::FIRST_QUEUE_ENTRY_ID;
pub use queue::MAX_BATCH_SIZE;
pub use queue::MAX_GROUP_SIZE;
pub use queue::MAX_PARTITION_KEY_SIZE;
pub use queue::MAX_PARTITION_KEYS;
pub use queue::MAX_QUEUE_NAME_SIZE;
pub use queue::NO_ENTRY_ID;
