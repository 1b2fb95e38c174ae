//! Pure fetch window computation.
//!
//! The fetch loop in the shell reads the cached write pointer, asks these functions
//! which entry ids to look at next, and performs the table reads.

/// Batch size actually used for window computation.
///
/// Non-positive configured sizes fall back to one entry per fetch.
#[inline]
pub fn effective_batch_size(configured: u32) -> u64 {
    u64::from(configured.max(1))
}

/// Whether a cursor has reached the (cached) write pointer.
#[inline]
pub fn is_caught_up(cursor: u64, write_pointer: u64) -> bool {
    cursor >= write_pointer
}

/// Inclusive id window a disjoint consumer scans after `cursor`.
///
/// The window is `[cursor + 1, min(cursor + batch_size * group_size, write_pointer)]`.
/// Returns `None` when the cursor is already at or past the write pointer.
///
/// # Example
///
/// ```ignore
/// assert_eq!(compute_disjoint_window(0, 20, 2, 5), Some((1, 5)));
/// assert_eq!(compute_disjoint_window(0, 2, 2, 10), Some((1, 4)));
/// ```
#[inline]
pub fn compute_disjoint_window(cursor: u64, batch_size: u64, group_size: u32, write_pointer: u64) -> Option<(u64, u64)> {
    if is_caught_up(cursor, write_pointer) {
        return None;
    }
    let span = batch_size.max(1).saturating_mul(u64::from(group_size.max(1)));
    let start = cursor.saturating_add(1);
    let end = cursor.saturating_add(span).min(write_pointer);
    debug_assert!(start <= end, "FETCH: window must be non-empty");
    Some((start, end))
}

/// Whether a group member may take the next id from the shared group pointer.
///
/// The shared pointer names the last id claimed by any member of the group; only
/// ids up to the write pointer have been allocated.
#[inline]
pub fn should_claim_shared(group_pointer: u64, write_pointer: u64) -> bool {
    group_pointer < write_pointer
}


#[cfg(all(test, feature = "bolero"))]
mod property_tests {
    use bolero::check;

    use super::*;

    #[test]
    fn prop_window_within_bounds() {
        check!().with_type::<(u64, u16, u16, u64)>().for_each(|(cursor, batch, group, write)| {
            if let Some((start, end)) = compute_disjoint_window(*cursor, u64::from(*batch), u32::from(*group), *write) {
                assert!(start > *cursor);
                assert!(start <= end);
                assert!(end <= *write);
            } else {
                assert!(*cursor >= *write);
            }
        });
    }
}
