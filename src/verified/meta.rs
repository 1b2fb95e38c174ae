//! Encoding of per-entry lifecycle and claim state cells.
//!
//! Both states are stored as a single tag byte. Decoding is strict: any other length
//! or tag is reported as `None` so the shell can raise a corruption error.

use crate::types::ClaimState;
use crate::types::EntryState;

const ENTRY_VALID: u8 = 1;
const ENTRY_INVALID: u8 = 2;
const ENTRY_EVICTED: u8 = 3;

const CLAIM_CLAIMED: u8 = 1;
const CLAIM_ACKED: u8 = 2;

/// Encode an entry lifecycle state.
#[inline]
pub fn encode_entry_state(state: EntryState) -> Vec<u8> {
    let tag = match state {
        EntryState::Valid => ENTRY_VALID,
        EntryState::Invalid => ENTRY_INVALID,
        EntryState::Evicted => ENTRY_EVICTED,
    };
    vec![tag]
}

/// Decode an entry lifecycle state.
#[inline]
pub fn decode_entry_state(bytes: &[u8]) -> Option<EntryState> {
    match bytes {
        [ENTRY_VALID] => Some(EntryState::Valid),
        [ENTRY_INVALID] => Some(EntryState::Invalid),
        [ENTRY_EVICTED] => Some(EntryState::Evicted),
        _ => None,
    }
}

/// Encode a consumer's claim state for one entry.
#[inline]
pub fn encode_claim_state(state: ClaimState) -> Vec<u8> {
    let tag = match state {
        ClaimState::Claimed => CLAIM_CLAIMED,
        ClaimState::Acked => CLAIM_ACKED,
    };
    vec![tag]
}

/// Decode a consumer's claim state for one entry.
#[inline]
pub fn decode_claim_state(bytes: &[u8]) -> Option<ClaimState> {
    match bytes {
        [CLAIM_CLAIMED] => Some(ClaimState::Claimed),
        [CLAIM_ACKED] => Some(ClaimState::Acked),
        _ => None,
    }
}

/// Whether an entry in `state` may be delivered to a consumer.
#[inline]
pub fn is_entry_servable(state: EntryState) -> bool {
    matches!(state, EntryState::Valid)
}

/// Whether the lifecycle transition `from -> to` is legal.
///
/// States only move forward: `Valid` may become `Invalid` or `Evicted`, and a
/// retired entry never becomes `Valid` again.
#[inline]
pub fn is_valid_entry_transition(from: EntryState, to: EntryState) -> bool {
    match (from, to) {
        (EntryState::Valid, _) => true,
        (EntryState::Invalid, EntryState::Invalid) => true,
        (EntryState::Evicted, EntryState::Evicted) => true,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_state_tags() {
        for state in [EntryState::Valid, EntryState::Invalid, EntryState::Evicted] {
            assert_eq!(decode_entry_state(&encode_entry_state(state)), Some(state));
        }
        assert_eq!(decode_entry_state(&[]), None);
        assert_eq!(decode_entry_state(&[0]), None);
        assert_eq!(decode_entry_state(&[1, 1]), None);
    }

    #[test]
    fn test_claim_state_tags() {
        assert_eq!(decode_claim_state(&encode_claim_state(ClaimState::Claimed)), Some(ClaimState::Claimed));
        assert_eq!(decode_claim_state(&encode_claim_state(ClaimState::Acked)), Some(ClaimState::Acked));
        assert_eq!(decode_claim_state(&[9]), None);
    }

    #[test]
    fn test_only_valid_entries_servable() {
        assert!(is_entry_servable(EntryState::Valid));
        assert!(!is_entry_servable(EntryState::Invalid));
        assert!(!is_entry_servable(EntryState::Evicted));
    }

    #[test]
    fn test_no_resurrection() {
        assert!(is_valid_entry_transition(EntryState::Valid, EntryState::Invalid));
        assert!(is_valid_entry_transition(EntryState::Valid, EntryState::Evicted));
        assert!(!is_valid_entry_transition(EntryState::Invalid, EntryState::Valid));
        assert!(!is_valid_entry_transition(EntryState::Evicted, EntryState::Valid));
        assert!(!is_valid_entry_transition(EntryState::Invalid, EntryState::Evicted));
    }
}
