//! Compile-time constant assertions.
//!
//! Each assertion pins a relationship between constants that the key codec or the
//! fetch algorithm depends on.

use super::layout::*;
use super::queue::*;

// ============================================================================
// Queue Bounds
// ============================================================================

const _: () = assert!(DEFAULT_BATCH_SIZE > 0);
const _: () = assert!(DEFAULT_BATCH_SIZE <= MAX_BATCH_SIZE);
const _: () = assert!(MAX_GROUP_SIZE > 0);
const _: () = assert!(MAX_PARTITION_KEYS > 0);

// A full disjoint window must fit comfortably in u64 arithmetic.
const _: () = assert!((MAX_BATCH_SIZE as u64) * (MAX_GROUP_SIZE as u64) < u32::MAX as u64);

// Queue names carry a u16 length prefix.
const _: () = assert!(MAX_QUEUE_NAME_SIZE <= u16::MAX as u32);

// The "no active entry" sentinel must sit below the first real id.
const _: () = assert!(NO_ENTRY_ID < FIRST_QUEUE_ENTRY_ID);

// ============================================================================
// Key Layout
// ============================================================================
// Row families must be pairwise distinct so that two keys of different families
// never share the byte at the family position.

const _: () = assert!(ROW_GLOBAL_ENTRY_ID != ROW_GROUP_READ_POINTER);
const _: () = assert!(ROW_GLOBAL_ENTRY_ID != ROW_GLOBAL_DATA);
const _: () = assert!(ROW_GLOBAL_ENTRY_ID != ROW_CONSUMER_META);
const _: () = assert!(ROW_GLOBAL_ENTRY_ID != ROW_GLOBAL_GROUP_ID);
const _: () = assert!(ROW_GROUP_READ_POINTER != ROW_GLOBAL_DATA);
const _: () = assert!(ROW_GROUP_READ_POINTER != ROW_CONSUMER_META);
const _: () = assert!(ROW_GROUP_READ_POINTER != ROW_GLOBAL_GROUP_ID);
const _: () = assert!(ROW_GLOBAL_DATA != ROW_CONSUMER_META);
const _: () = assert!(ROW_GLOBAL_DATA != ROW_GLOBAL_GROUP_ID);
const _: () = assert!(ROW_CONSUMER_META != ROW_GLOBAL_GROUP_ID);

// Columns within the same row family must be distinct.
const _: () = assert!(COL_ENTRY_META != COL_ENTRY_DATA);
const _: () = assert!(COL_ENTRY_META != COL_ENTRY_HEADER);
const _: () = assert!(COL_ENTRY_DATA != COL_ENTRY_HEADER);
const _: () = assert!(COL_ACTIVE_ENTRY != COL_ENTRY_CLAIM);
const _: () = assert!(COL_ACTIVE_ENTRY != COL_CONSUMER_READ_POINTER);
const _: () = assert!(COL_ENTRY_CLAIM != COL_CONSUMER_READ_POINTER);
