//! Per-consumer dequeue state.

use ttqueue_constants::FIRST_QUEUE_ENTRY_ID;

/// One fetched entry waiting to be served.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedEntry {
    pub entry_id: u64,
    pub data: Vec<u8>,
}

/// Forward-only, single-pass cache of fetched entries.
///
/// Entries are held in ascending id order and each is handed out exactly once.
/// The cache cannot be rewound; a refill replaces it wholesale.
#[derive(Debug, Clone, Default)]
pub struct CachedEntries {
    entries: Vec<CachedEntry>,
    position: usize,
}

impl CachedEntries {
    pub fn new(entries: Vec<CachedEntry>) -> Self {
        debug_assert!(
            entries.windows(2).all(|w| w[0].entry_id < w[1].entry_id),
            "CACHE: entries must be in ascending id order"
        );
        Self { entries, position: 0 }
    }

    pub fn has_next(&self) -> bool {
        self.position < self.entries.len()
    }

    /// Number of entries not yet handed out.
    pub fn remaining(&self) -> usize {
        self.entries.len() - self.position
    }

    /// Hand out the next entry.
    ///
    /// # Panics
    ///
    /// Reading past the end is a logic error in the caller and panics.
    pub fn take_next(&mut self) -> CachedEntry {
        assert!(self.has_next(), "CACHE: read past end of cached entries");
        let slot = &mut self.entries[self.position];
        self.position += 1;
        CachedEntry {
            entry_id: slot.entry_id,
            data: std::mem::take(&mut slot.data),
        }
    }
}

impl Iterator for CachedEntries {
    type Item = CachedEntry;

    fn next(&mut self) -> Option<Self::Item> {
        if self.has_next() { Some(self.take_next()) } else { None }
    }
}

/// Mutable cursor of one consumer instance.
///
/// Owned exclusively by that instance. A state that has never been loaded (fresh
/// from [`QueueState::new`]) is rebuilt from the consumer's stored row on the next
/// dequeue; a loaded state is trusted as-is and only written back.
#[derive(Debug, Clone)]
pub struct QueueState {
    pub(crate) loaded: bool,
    /// Entry served and not yet acked, as of the last load or serve.
    pub(crate) active_entry_id: Option<u64>,
    /// Highest entry id this consumer has advanced past.
    pub(crate) consumer_read_pointer: u64,
    /// Last observed global write pointer. May lag.
    pub(crate) queue_write_pointer: u64,
    /// Round-robin id claimed from the group pointer whose entry was not yet visible.
    pub(crate) pending_claim: Option<u64>,
    pub(crate) cached_entries: CachedEntries,
}

impl Default for QueueState {
    fn default() -> Self {
        Self::new()
    }
}

impl QueueState {
    /// An unloaded state.
    pub fn new() -> Self {
        Self {
            loaded: false,
            active_entry_id: None,
            consumer_read_pointer: FIRST_QUEUE_ENTRY_ID - 1,
            queue_write_pointer: FIRST_QUEUE_ENTRY_ID - 1,
            pending_claim: None,
            cached_entries: CachedEntries::default(),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn active_entry_id(&self) -> Option<u64> {
        self.active_entry_id
    }

    pub fn consumer_read_pointer(&self) -> u64 {
        self.consumer_read_pointer
    }

    pub fn queue_write_pointer(&self) -> u64 {
        self.queue_write_pointer
    }

    pub fn pending_claim(&self) -> Option<u64> {
        self.pending_claim
    }

    /// Entries fetched but not yet served.
    pub fn cached_len(&self) -> usize {
        self.cached_entries.remaining()
    }

    /// Move the read pointer forward; never backward.
    pub(crate) fn advance_read_pointer(&mut self, entry_id: u64) {
        self.consumer_read_pointer = self.consumer_read_pointer.max(entry_id);
    }

    /// Forget everything and mark the state for reload on the next dequeue.
    pub fn invalidate(&mut self) {
        *self = Self::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cached(ids: &[u64]) -> CachedEntries {
        CachedEntries::new(
            ids.iter()
                .map(|id| CachedEntry {
                    entry_id: *id,
                    data: id.to_be_bytes().to_vec(),
                })
                .collect(),
        )
    }

    #[test]
    fn test_cache_single_pass() {
        let mut cache = cached(&[2, 5, 9]);
        assert_eq!(cache.remaining(), 3);
        assert_eq!(cache.take_next().entry_id, 2);
        let ids: Vec<u64> = cache.by_ref().map(|e| e.entry_id).collect();
        assert_eq!(ids, vec![5, 9]);
        assert!(!cache.has_next());
        assert!(cache.next().is_none());
    }

    #[test]
    fn test_cache_hands_out_data_once() {
        let mut cache = cached(&[1]);
        let entry = cache.take_next();
        assert_eq!(entry.data, 1u64.to_be_bytes().to_vec());
    }

    #[test]
    #[should_panic(expected = "CACHE: read past end")]
    fn test_cache_overrun_panics() {
        let mut cache = cached(&[1]);
        cache.take_next();
        cache.take_next();
    }

    #[test]
    fn test_read_pointer_never_moves_back() {
        let mut state = QueueState::new();
        state.advance_read_pointer(5);
        state.advance_read_pointer(3);
        assert_eq!(state.consumer_read_pointer(), 5);
    }

    #[test]
    fn test_new_state_is_unloaded() {
        let mut state = QueueState::new();
        assert!(!state.is_loaded());
        state.loaded = true;
        state.active_entry_id = Some(4);
        state.invalidate();
        assert!(!state.is_loaded());
        assert_eq!(state.active_entry_id(), None);
    }
}
