//! Ack validation and partition header checks.

use std::collections::BTreeMap;

use ttqueue_constants::MAX_PARTITION_KEY_SIZE;
use ttqueue_constants::MAX_PARTITION_KEYS;

use super::keys::encode_i32;
use super::keys::entry_header_column;
use crate::types::ClaimState;

/// Outcome of checking an ack against the stored claim state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AckDecision {
    /// The ack may be written.
    Allowed,
    /// No claim column exists for this entry and consumer.
    NeverClaimed,
    /// The claim column exists but is not `Claimed`.
    NotClaimed(ClaimState),
}

/// Decide whether an ack is legal.
///
/// Disjoint partitioners never write claim markers on dequeue, so their acks are not
/// checked. Shared (FIFO) partitioners require a `Claimed` marker.
#[inline]
pub fn check_ack(is_disjoint: bool, current: Option<ClaimState>) -> AckDecision {
    if is_disjoint {
        return AckDecision::Allowed;
    }
    match current {
        None => AckDecision::NeverClaimed,
        Some(ClaimState::Claimed) => AckDecision::Allowed,
        Some(state) => AckDecision::NotClaimed(state),
    }
}

/// Reason a partitioning map cannot be turned into header columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderRejection {
    TooManyKeys { count: usize, max: u32 },
    EmptyKey,
    KeyTooLarge { size: usize, max: u32 },
}

impl std::fmt::Display for HeaderRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HeaderRejection::TooManyKeys { count, max } => {
                write!(f, "{} partitioning keys exceeds maximum of {}", count, max)
            }
            HeaderRejection::EmptyKey => write!(f, "partitioning key must not be empty"),
            HeaderRejection::KeyTooLarge { size, max } => {
                write!(f, "partitioning key of {} bytes exceeds maximum of {}", size, max)
            }
        }
    }
}

/// Turn a partitioning map into (header column, hash value) cells.
pub fn encode_partition_headers(
    partitioning: &BTreeMap<String, i32>,
) -> Result<Vec<(Vec<u8>, Vec<u8>)>, HeaderRejection> {
    if partitioning.len() > MAX_PARTITION_KEYS as usize {
        return Err(HeaderRejection::TooManyKeys {
            count: partitioning.len(),
            max: MAX_PARTITION_KEYS,
        });
    }

    let mut cells = Vec::with_capacity(partitioning.len());
    for (key, hash) in partitioning {
        if key.is_empty() {
            return Err(HeaderRejection::EmptyKey);
        }
        if key.len() > MAX_PARTITION_KEY_SIZE as usize {
            return Err(HeaderRejection::KeyTooLarge {
                size: key.len(),
                max: MAX_PARTITION_KEY_SIZE,
            });
        }
        cells.push((entry_header_column(key), encode_i32(*hash).to_vec()));
    }
    Ok(cells)
}
