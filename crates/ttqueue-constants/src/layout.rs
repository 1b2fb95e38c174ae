//! Row family and column prefix bytes.
//!
//! Every row key is `len(name) ‖ name ‖ family ‖ ids...`. Column keys inside a row
//! start with one of the column prefix bytes below.
//!
//! ```text
//! row family            | row key suffix            | columns
//! ----------------------+---------------------------+-------------------------------------
//! GLOBAL_ENTRY_ID  (10) | -                         | 10 -> entry id counter
//! GROUP_READ_PTR   (11) | <group id:u64>            | 10 -> group read pointer
//! GLOBAL_DATA      (20) | <entry id:u64>            | 10 -> entry meta, 20 -> data,
//!                       |                           | 30<key> -> header hash (i32)
//! CONSUMER_META    (30) | <group id:u64><inst:u32>  | 10 -> active entry,
//!                       |                           | 20<entry id> -> claim state,
//!                       |                           | 30 -> consumer read pointer
//! GLOBAL_GROUP_ID  (40) | -                         | 10 -> group id counter
//! ```

/// Row holding the global entry id counter.
pub const ROW_GLOBAL_ENTRY_ID: u8 = 10;
/// Row holding a consumer group's shared read pointer (FIFO partitioning).
pub const ROW_GROUP_READ_POINTER: u8 = 11;
/// Row holding one entry's data, meta and headers.
pub const ROW_GLOBAL_DATA: u8 = 20;
/// Row holding one consumer instance's state.
pub const ROW_CONSUMER_META: u8 = 30;
/// Row holding the consumer group id counter.
pub const ROW_GLOBAL_GROUP_ID: u8 = 40;

/// Counter column in the counter rows.
pub const COL_COUNTER: u8 = 10;

/// Entry lifecycle meta column in a data row.
pub const COL_ENTRY_META: u8 = 10;
/// Entry payload column in a data row.
pub const COL_ENTRY_DATA: u8 = 20;
/// Prefix of the per-partition-key header columns in a data row.
pub const COL_ENTRY_HEADER: u8 = 30;

/// Active entry column in a consumer meta row.
pub const COL_ACTIVE_ENTRY: u8 = 10;
/// Prefix of the per-entry claim state columns in a consumer meta row.
pub const COL_ENTRY_CLAIM: u8 = 20;
/// Consumer read pointer column in a consumer meta row.
pub const COL_CONSUMER_READ_POINTER: u8 = 30;
