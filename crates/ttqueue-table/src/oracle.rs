//! In-process timestamp oracle.

use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

use crate::ReadPointer;
use crate::WriteVersion;

/// Hands out strictly increasing timestamps for write versions and read pointers.
///
/// Suitable for a single process sharing one [`DeterministicVersionedTable`](crate::DeterministicVersionedTable).
#[derive(Debug, Default)]
pub struct MemoryTimestampOracle {
    last: AtomicU64,
}

impl MemoryTimestampOracle {
    /// Create an oracle whose first timestamp is 1.
    pub fn new() -> Self {
        Self::default()
    }

    /// Next timestamp, strictly greater than every previous one.
    pub fn next_timestamp(&self) -> u64 {
        self.last.fetch_add(1, Ordering::SeqCst).saturating_add(1)
    }

    /// Fresh write version.
    pub fn write_version(&self) -> WriteVersion {
        WriteVersion(self.next_timestamp())
    }

    /// Fresh snapshot that sees every write version handed out so far.
    pub fn read_pointer(&self) -> ReadPointer {
        ReadPointer::new(self.next_timestamp())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamps_strictly_increase() {
        let oracle = MemoryTimestampOracle::new();
        let a = oracle.next_timestamp();
        let b = oracle.next_timestamp();
        assert_eq!(a, 1);
        assert!(b > a);
    }

    #[test]
    fn test_read_pointer_sees_prior_writes() {
        let oracle = MemoryTimestampOracle::new();
        let version = oracle.write_version();
        let rp = oracle.read_pointer();
        assert!(rp.is_visible(version.value()));
    }
}
