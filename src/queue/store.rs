//! Entry store: write, retire and batch-read entry rows.

use snafu::ResultExt;
use tracing::debug;
use ttqueue_table::ReadPointer;
use ttqueue_table::VersionedTable;
use ttqueue_table::WriteVersion;

use super::QueueManager;
use super::state::CachedEntry;
use crate::error::InternalSnafu;
use crate::error::QueueError;
use crate::types::EnqueueResult;
use crate::types::EntryState;
use crate::types::QueueEntry;
use crate::types::QueueEntryPointer;
use crate::verified;

/// Outcome of reading a batch of entry rows.
#[derive(Debug, Default)]
pub(crate) struct EntryBatch {
    /// Servable entries in ascending id order.
    pub entries: Vec<CachedEntry>,
    /// Ids with no visible meta under the read pointer.
    pub unseen: Vec<u64>,
    /// Ids whose entries were invalidated or evicted.
    pub retired: Vec<u64>,
}

/// Outcome of scanning partition headers over a window of entry rows.
#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct HeaderScan {
    /// Visible ids in ascending order with their header hash, if any.
    pub visible: Vec<(u64, Option<i32>)>,
    /// First id whose meta was not visible. Nothing past it was scanned.
    pub first_unseen: Option<u64>,
}

impl<T: VersionedTable + ?Sized + 'static> QueueManager<T> {
    /// Append an entry to the queue.
    ///
    /// Allocates a fresh id and writes payload, `Valid` meta and one header column
    /// per partitioning key in a single row write at `version`.
    pub async fn enqueue(&self, entry: &QueueEntry, version: WriteVersion) -> Result<EnqueueResult, QueueError> {
        let headers = verified::encode_partition_headers(&entry.partitioning)
            .map_err(|rejection| QueueError::HeaderSerialization {
                reason: rejection.to_string(),
            })?;

        let entry_id = self.allocate_entry_id().await?;

        let mut cells = Vec::with_capacity(2 + headers.len());
        cells.push((verified::entry_meta_column(), verified::encode_entry_state(EntryState::Valid)));
        cells.push((verified::entry_data_column(), entry.data.clone()));
        cells.extend(headers);

        self.table
            .put(&verified::data_row(&self.name, entry_id), cells, version)
            .await
            .context(InternalSnafu { operation: "write entry" })?;

        debug!(queue = %self.name, entry_id, %version, bytes = entry.data.len(), "entry enqueued");
        Ok(EnqueueResult {
            pointer: QueueEntryPointer::new(self.name.clone(), entry_id),
        })
    }

    /// Append a payload with no partitioning headers.
    pub async fn enqueue_bytes(&self, data: impl Into<Vec<u8>>, version: WriteVersion) -> Result<EnqueueResult, QueueError> {
        self.enqueue(&QueueEntry::new(data), version).await
    }

    /// Permanently retire an entry.
    ///
    /// Flips the meta to `Invalid` and deletes the payload at `version`. The meta
    /// tombstone stays so that scanners skip the id. An entry that is already
    /// evicted keeps its tombstone.
    pub async fn invalidate(&self, pointer: &QueueEntryPointer, version: WriteVersion) -> Result<(), QueueError> {
        self.check_pointer(pointer)?;
        let entry_id = pointer.entry_id;

        let current = self.read_entry_state(entry_id, &ReadPointer::new(version.value())).await?;
        if let Some(state) = current
            && !verified::is_valid_entry_transition(state, EntryState::Invalid)
        {
            debug!(queue = %self.name, entry_id, ?state, "entry already retired, invalidate skipped");
            return Ok(());
        }

        let row = verified::data_row(&self.name, entry_id);
        self.table
            .put(
                &row,
                vec![(verified::entry_meta_column(), verified::encode_entry_state(EntryState::Invalid))],
                version,
            )
            .await
            .context(InternalSnafu {
                operation: "write invalid meta",
            })?;
        self.table.delete(&row, &verified::entry_data_column(), version).await.context(InternalSnafu {
            operation: "delete entry data",
        })?;

        debug!(queue = %self.name, entry_id, %version, "entry invalidated");
        Ok(())
    }

    /// Lifecycle state of one entry, or `None` if its row is not visible.
    pub(crate) async fn read_entry_state(
        &self,
        entry_id: u64,
        read_pointer: &ReadPointer,
    ) -> Result<Option<EntryState>, QueueError> {
        let row_key = verified::data_row(&self.name, entry_id);
        let row = self
            .table
            .get_row(&row_key, &[verified::entry_meta_column()], read_pointer)
            .await
            .context(InternalSnafu {
                operation: "read entry meta",
            })?;
        match row.get(&verified::entry_meta_column()) {
            Some(bytes) => decode_meta(&row_key, bytes).map(Some),
            None => Ok(None),
        }
    }

    /// Read meta and payload of `entry_ids` under one snapshot.
    ///
    /// `entry_ids` must be ascending; the servable entries come back in the same order.
    pub(crate) async fn read_entries(
        &self,
        entry_ids: &[u64],
        read_pointer: &ReadPointer,
    ) -> Result<EntryBatch, QueueError> {
        debug_assert!(entry_ids.windows(2).all(|w| w[0] < w[1]), "STORE: entry ids must be ascending");

        let row_keys: Vec<Vec<u8>> = entry_ids.iter().map(|id| verified::data_row(&self.name, *id)).collect();
        let meta_column = verified::entry_meta_column();
        let data_column = verified::entry_data_column();
        let mut rows = self
            .table
            .get(&row_keys, &[meta_column.clone(), data_column.clone()], read_pointer)
            .await
            .context(InternalSnafu { operation: "read entries" })?;

        let mut batch = EntryBatch::default();
        for (entry_id, row_key) in entry_ids.iter().copied().zip(row_keys) {
            let Some(mut row) = rows.remove(&row_key) else {
                batch.unseen.push(entry_id);
                continue;
            };
            let Some(meta) = row.get(&meta_column) else {
                batch.unseen.push(entry_id);
                continue;
            };
            let state = decode_meta(&row_key, meta)?;
            if !verified::is_entry_servable(state) {
                debug!(queue = %self.name, entry_id, ?state, "skipping retired entry");
                batch.retired.push(entry_id);
                continue;
            }
            let data = row.remove(&data_column).ok_or_else(|| QueueError::CorruptedData {
                key: verified::display_key(&row_key),
                reason: "valid entry has no data".to_string(),
            })?;
            batch.entries.push(CachedEntry { entry_id, data });
        }
        Ok(batch)
    }

    /// Partition headers of a window of entry rows under one snapshot.
    ///
    /// Meta and header are read in one batched get. The scan stops at the first id
    /// whose meta is not visible, so a caller never steps over an entry that a
    /// producer has allocated but not yet committed. `entry_ids` must be ascending.
    pub(crate) async fn read_partition_headers(
        &self,
        entry_ids: &[u64],
        partitioning_key: &str,
        read_pointer: &ReadPointer,
    ) -> Result<HeaderScan, QueueError> {
        debug_assert!(entry_ids.windows(2).all(|w| w[0] < w[1]), "STORE: entry ids must be ascending");

        let row_keys: Vec<Vec<u8>> = entry_ids.iter().map(|id| verified::data_row(&self.name, *id)).collect();
        let meta_column = verified::entry_meta_column();
        let header_column = verified::entry_header_column(partitioning_key);
        let rows = self
            .table
            .get(&row_keys, &[meta_column.clone(), header_column.clone()], read_pointer)
            .await
            .context(InternalSnafu {
                operation: "read partition headers",
            })?;

        let mut scan = HeaderScan::default();
        for (entry_id, row_key) in entry_ids.iter().copied().zip(&row_keys) {
            let Some(row) = rows.get(row_key).filter(|row| row.contains_key(&meta_column)) else {
                scan.first_unseen = Some(entry_id);
                break;
            };
            let hash = match row.get(&header_column) {
                Some(bytes) => Some(verified::decode_i32(bytes).ok_or_else(|| QueueError::CorruptedData {
                    key: verified::display_key(row_key),
                    reason: format!("partition header is {} bytes, expected 4", bytes.len()),
                })?),
                None => None,
            };
            scan.visible.push((entry_id, hash));
        }
        Ok(scan)
    }
}

fn decode_meta(row_key: &[u8], bytes: &[u8]) -> Result<EntryState, QueueError> {
    verified::decode_entry_state(bytes).ok_or_else(|| QueueError::CorruptedData {
        key: verified::display_key(row_key),
        reason: format!("unknown entry meta {:?}", bytes),
    })
}
