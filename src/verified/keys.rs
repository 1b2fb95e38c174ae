//! Binary key codec for queue rows and columns.
//!
//! Every row key has the shape
//!
//! ```text
//! name_len:u16 BE ‖ name bytes ‖ family:u8 ‖ ids (fixed-width big-endian)
//! ```
//!
//! The length prefix keeps keys of different queues apart even when one queue name
//! is a prefix of another. Numeric ids are fixed-width big-endian so that byte order
//! of keys equals numeric order of ids, which range scans over data rows rely on.
//!
//! Column keys are one prefix byte, optionally followed by an id or a partition key.
//! The encoding is total and injective: distinct (family, ids) tuples never produce
//! the same bytes.

use ttqueue_constants::layout::COL_ACTIVE_ENTRY;
use ttqueue_constants::layout::COL_CONSUMER_READ_POINTER;
use ttqueue_constants::layout::COL_COUNTER;
use ttqueue_constants::layout::COL_ENTRY_CLAIM;
use ttqueue_constants::layout::COL_ENTRY_DATA;
use ttqueue_constants::layout::COL_ENTRY_HEADER;
use ttqueue_constants::layout::COL_ENTRY_META;
use ttqueue_constants::layout::ROW_CONSUMER_META;
use ttqueue_constants::layout::ROW_GLOBAL_DATA;
use ttqueue_constants::layout::ROW_GLOBAL_ENTRY_ID;
use ttqueue_constants::layout::ROW_GLOBAL_GROUP_ID;
use ttqueue_constants::layout::ROW_GROUP_READ_POINTER;

// ============================================================================
// Fixed-width integers
// ============================================================================

/// Encode a u64 as 8 big-endian bytes.
#[inline]
pub fn encode_u64(value: u64) -> [u8; 8] {
    value.to_be_bytes()
}

/// Decode 8 big-endian bytes. Returns `None` for any other length.
#[inline]
pub fn decode_u64(bytes: &[u8]) -> Option<u64> {
    <[u8; 8]>::try_from(bytes).ok().map(u64::from_be_bytes)
}

/// Encode an i32 partition hash as 4 big-endian bytes.
#[inline]
pub fn encode_i32(value: i32) -> [u8; 4] {
    value.to_be_bytes()
}

/// Decode 4 big-endian bytes. Returns `None` for any other length.
#[inline]
pub fn decode_i32(bytes: &[u8]) -> Option<i32> {
    <[u8; 4]>::try_from(bytes).ok().map(i32::from_be_bytes)
}

// ============================================================================
// Row keys
// ============================================================================

/// Shared row key prefix: `name_len ‖ name ‖ family`.
///
/// Callers validate name length up front; names longer than `u16::MAX` are
/// rejected by the queue constructor.
fn row_prefix(name: &str, family: u8, extra_capacity: usize) -> Vec<u8> {
    let name = name.as_bytes();
    debug_assert!(name.len() <= u16::MAX as usize, "KEYS: queue name length must fit in u16");
    let mut key = Vec::with_capacity(2 + name.len() + 1 + extra_capacity);
    key.extend_from_slice(&(name.len() as u16).to_be_bytes());
    key.extend_from_slice(name);
    key.push(family);
    key
}

/// Row holding the global entry id counter.
pub fn entry_id_counter_row(name: &str) -> Vec<u8> {
    row_prefix(name, ROW_GLOBAL_ENTRY_ID, 0)
}

/// Row holding the shared read pointer of consumer group `group_id`.
pub fn group_read_pointer_row(name: &str, group_id: u64) -> Vec<u8> {
    let mut key = row_prefix(name, ROW_GROUP_READ_POINTER, 8);
    key.extend_from_slice(&encode_u64(group_id));
    key
}

/// Row holding data, meta and headers of entry `entry_id`.
///
/// # Example
///
/// ```ignore
/// assert!(data_row("q", 9) < data_row("q", 10));
/// assert!(data_row("q", 255) < data_row("q", 256));
/// ```
pub fn data_row(name: &str, entry_id: u64) -> Vec<u8> {
    let mut key = row_prefix(name, ROW_GLOBAL_DATA, 8);
    key.extend_from_slice(&encode_u64(entry_id));
    key
}

/// Row holding the state of consumer instance (`group_id`, `instance_id`).
pub fn consumer_meta_row(name: &str, group_id: u64, instance_id: u32) -> Vec<u8> {
    let mut key = row_prefix(name, ROW_CONSUMER_META, 12);
    key.extend_from_slice(&encode_u64(group_id));
    key.extend_from_slice(&instance_id.to_be_bytes());
    key
}

/// Row holding the consumer group id counter.
pub fn group_id_counter_row(name: &str) -> Vec<u8> {
    row_prefix(name, ROW_GLOBAL_GROUP_ID, 0)
}

// ============================================================================
// Column keys
// ============================================================================

/// Counter column of the counter rows.
pub fn counter_column() -> Vec<u8> {
    vec![COL_COUNTER]
}

/// Entry lifecycle meta column.
pub fn entry_meta_column() -> Vec<u8> {
    vec![COL_ENTRY_META]
}

/// Entry payload column.
pub fn entry_data_column() -> Vec<u8> {
    vec![COL_ENTRY_DATA]
}

/// Header column carrying the hash value for `partition_key`.
pub fn entry_header_column(partition_key: &str) -> Vec<u8> {
    let mut column = Vec::with_capacity(1 + partition_key.len());
    column.push(COL_ENTRY_HEADER);
    column.extend_from_slice(partition_key.as_bytes());
    column
}

/// Active entry column of a consumer row.
pub fn active_entry_column() -> Vec<u8> {
    vec![COL_ACTIVE_ENTRY]
}

/// Per-entry claim state column of a consumer row.
pub fn entry_claim_column(entry_id: u64) -> Vec<u8> {
    let mut column = Vec::with_capacity(9);
    column.push(COL_ENTRY_CLAIM);
    column.extend_from_slice(&encode_u64(entry_id));
    column
}

/// Consumer read pointer column of a consumer row.
pub fn consumer_read_pointer_column() -> Vec<u8> {
    vec![COL_CONSUMER_READ_POINTER]
}

/// Printable form of a binary key for logs and error messages.
pub fn display_key(key: &[u8]) -> String {
    key.escape_ascii().to_string()
}
