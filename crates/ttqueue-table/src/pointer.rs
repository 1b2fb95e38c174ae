//! MVCC snapshot and write version types.

use std::collections::BTreeSet;

use serde::Deserialize;
use serde::Serialize;

/// Version stamped on every versioned write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct WriteVersion(pub u64);

impl WriteVersion {
    /// Get the raw version value.
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for WriteVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// MVCC snapshot bound.
///
/// A version is visible when it is at most `maximum` and not explicitly excluded.
/// Exclusions model transactions that were in flight when the snapshot was taken.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadPointer {
    maximum: u64,
    #[serde(default)]
    excluded: BTreeSet<u64>,
}

impl ReadPointer {
    /// Snapshot that sees every version up to and including `maximum`.
    pub fn new(maximum: u64) -> Self {
        Self {
            maximum,
            excluded: BTreeSet::new(),
        }
    }

    /// Snapshot that additionally hides the given in-flight versions.
    pub fn with_excluded(maximum: u64, excluded: impl IntoIterator<Item = u64>) -> Self {
        Self {
            maximum,
            excluded: excluded.into_iter().collect(),
        }
    }

    /// Highest version this snapshot can observe.
    pub fn maximum(&self) -> u64 {
        self.maximum
    }

    /// Whether a write at `version` is visible to this snapshot.
    pub fn is_visible(&self, version: u64) -> bool {
        version <= self.maximum && !self.excluded.contains(&version)
    }

    /// Write version used for writes made on behalf of this snapshot's transaction.
    pub fn write_version(&self) -> WriteVersion {
        WriteVersion(self.maximum)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visibility_bounded_by_maximum() {
        let rp = ReadPointer::new(10);
        assert!(rp.is_visible(0));
        assert!(rp.is_visible(10));
        assert!(!rp.is_visible(11));
    }

    #[test]
    fn test_excluded_versions_hidden() {
        let rp = ReadPointer::with_excluded(10, [4, 7]);
        assert!(rp.is_visible(3));
        assert!(!rp.is_visible(4));
        assert!(!rp.is_visible(7));
        assert!(rp.is_visible(8));
    }

    #[test]
    fn test_write_version_matches_maximum() {
        assert_eq!(ReadPointer::new(42).write_version(), WriteVersion(42));
    }
}
