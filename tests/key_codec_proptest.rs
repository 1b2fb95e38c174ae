//! Property-based tests for the queue key codec and partition ownership.
//!
//! Row keys must sort like the ids they encode and never collide across queues,
//! row families or consumers. Ownership must pick exactly one instance per hash.

use bolero::check;
use ttqueue::verified::consumer_meta_row;
use ttqueue::verified::data_row;
use ttqueue::verified::decode_u64;
use ttqueue::verified::encode_u64;
use ttqueue::verified::entry_claim_column;
use ttqueue::verified::entry_header_column;
use ttqueue::verified::group_read_pointer_row;
use ttqueue::verified::hash_partition_owner;
use ttqueue::verified::should_emit_hashed;

#[test]
fn prop_data_rows_preserve_id_order() {
    check!().with_iterations(1000).with_type::<(u64, u64)>().for_each(|(a, b)| {
        let ka = data_row("queue", *a);
        let kb = data_row("queue", *b);
        assert_eq!(a.cmp(b), ka.cmp(&kb));
    });
}

#[test]
fn prop_claim_columns_preserve_id_order() {
    check!().with_iterations(1000).with_type::<(u64, u64)>().for_each(|(a, b)| {
        assert_eq!(a.cmp(b), entry_claim_column(*a).cmp(&entry_claim_column(*b)));
    });
}

#[test]
fn prop_u64_codec_roundtrip() {
    check!().with_iterations(1000).with_type::<u64>().for_each(|value| {
        assert_eq!(decode_u64(&encode_u64(*value)), Some(*value));
    });
}

#[test]
fn prop_rows_of_distinct_queues_differ() {
    check!().with_iterations(500).with_type::<(String, String, u64)>().for_each(|(q1, q2, id)| {
        if q1 != q2 {
            assert_ne!(data_row(q1, *id), data_row(q2, *id));
            assert_ne!(group_read_pointer_row(q1, *id), group_read_pointer_row(q2, *id));
        }
    });
}

#[test]
fn prop_consumer_rows_injective() {
    check!().with_iterations(1000).with_type::<(u64, u32, u64, u32)>().for_each(|(g1, i1, g2, i2)| {
        let same = g1 == g2 && i1 == i2;
        assert_eq!(same, consumer_meta_row("q", *g1, *i1) == consumer_meta_row("q", *g2, *i2));
    });
}

#[test]
fn prop_header_columns_injective() {
    check!().with_iterations(500).with_type::<(String, String)>().for_each(|(k1, k2)| {
        assert_eq!(k1 == k2, entry_header_column(k1) == entry_header_column(k2));
    });
}

#[test]
fn prop_exactly_one_owner_per_hash() {
    check!().with_iterations(1000).with_type::<(i32, u8)>().for_each(|(hash, size)| {
        let group_size = u32::from(*size).max(1);
        let owners = (0..group_size).filter(|i| should_emit_hashed(Some(*hash), group_size, *i)).count();
        assert_eq!(owners, 1);
        assert!(hash_partition_owner(*hash, group_size).is_some_and(|o| o < group_size));
    });
}
