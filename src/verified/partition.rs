//! Pure partition ownership functions.
//!
//! # Tiger Style
//!
//! - Total over all inputs, including negative hash values and zero group size
//! - No I/O; the shell supplies header values it has read

/// Instance that owns hash value `hash_value` in a group of `group_size`.
///
/// Uses Euclidean remainder so negative hash values still map into
/// `0..group_size`. Returns `None` when `group_size` is zero.
///
/// # Example
///
/// ```ignore
/// assert_eq!(hash_partition_owner(7, 3), Some(1));
/// assert_eq!(hash_partition_owner(-1, 3), Some(2));
/// ```
#[inline]
pub fn hash_partition_owner(hash_value: i32, group_size: u32) -> Option<u32> {
    if group_size == 0 {
        return None;
    }
    let owner = i64::from(hash_value).rem_euclid(i64::from(group_size));
    u32::try_from(owner).ok()
}

/// Whether the instance `instance_id` should emit an entry carrying `hash_value`.
///
/// A missing header (`None`) never matches any instance.
#[inline]
pub fn should_emit_hashed(hash_value: Option<i32>, group_size: u32, instance_id: u32) -> bool {
    match hash_value {
        Some(hash) => hash_partition_owner(hash, group_size) == Some(instance_id),
        None => false,
    }
}


#[cfg(all(test, feature = "bolero"))]
mod property_tests {
    use bolero::check;

    use super::*;

    #[test]
    fn prop_owner_always_in_range() {
        check!().with_type::<(i32, u32)>().for_each(|(hash, size)| {
            if let Some(owner) = hash_partition_owner(*hash, *size) {
                assert!(owner < *size, "owner must be below group size");
            } else {
                assert_eq!(*size, 0);
            }
        });
    }
}
