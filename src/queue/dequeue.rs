//! Dequeue: load consumer state, serve entries, persist the cursor.

use std::sync::atomic::Ordering;

use snafu::ResultExt;
use tracing::debug;
use tracing::info;
use ttqueue_constants::FIRST_QUEUE_ENTRY_ID;
use ttqueue_constants::NO_ENTRY_ID;
use ttqueue_table::ReadPointer;
use ttqueue_table::VersionedTable;

use super::QueueManager;
use super::state::CachedEntries;
use super::state::CachedEntry;
use super::state::QueueState;
use crate::config::PartitionerKind;
use crate::config::QueueConfig;
use crate::error::InternalSnafu;
use crate::error::QueueError;
use crate::types::ClaimState;
use crate::types::DequeueResult;
use crate::types::QueueConsumer;
use crate::types::QueueEntry;
use crate::types::QueueEntryPointer;
use crate::verified;

impl<T: VersionedTable + ?Sized + 'static> QueueManager<T> {
    /// Serve the next entry owned by `consumer`.
    ///
    /// With no `state`, or an unloaded one, the consumer's cursor is rebuilt from
    /// storage first and an entry that was served but never acked is served again.
    /// A loaded `state` is used as-is, so a caller keeping one across calls sees
    /// each entry once.
    ///
    /// Returns [`DequeueResult::Empty`] when nothing is available. Every call
    /// persists the consumer's cursor under `read_pointer`'s write version.
    pub async fn dequeue(
        &self,
        consumer: &QueueConsumer,
        config: &QueueConfig,
        state: Option<&mut QueueState>,
        read_pointer: &ReadPointer,
    ) -> Result<DequeueResult, QueueError> {
        config.validate()?;
        consumer.validate(config.partitioner)?;

        let mut scratch = QueueState::new();
        let state = state.unwrap_or(&mut scratch);
        if !state.loaded {
            self.load_state(consumer, config, state, read_pointer).await?;
        }

        loop {
            if let Some(cached) = state.cached_entries.next() {
                return self.serve(consumer, config, state, cached, read_pointer).await;
            }

            let entry_ids = self.fetch_next_entry_ids(consumer, config, state, read_pointer).await?;
            if entry_ids.is_empty() {
                break;
            }

            let batch = self.read_entries(&entry_ids, read_pointer).await?;
            if !batch.entries.is_empty() {
                state.cached_entries = CachedEntries::new(batch.entries);
                continue;
            }

            match config.partitioner {
                PartitionerKind::Hash => {
                    // Every owned id in this batch is retired, so the cursor may pass them.
                    if let Some(last) = entry_ids.last() {
                        state.advance_read_pointer(*last);
                    }
                }
                PartitionerKind::RoundRobin => {
                    let Some(claimed) = state.pending_claim else {
                        break;
                    };
                    if batch.unseen.contains(&claimed) {
                        debug!(queue = %self.name, entry_id = claimed, "claimed entry not yet visible");
                        break;
                    }
                    debug!(queue = %self.name, entry_id = claimed, "dropping claim on retired entry");
                    state.pending_claim = None;
                }
            }
        }

        self.save_empty(consumer, state, read_pointer).await?;
        Ok(DequeueResult::Empty)
    }

    /// Dequeue using the consumer's own config, or the queue default.
    pub async fn dequeue_with_consumer_config(
        &self,
        consumer: &QueueConsumer,
        state: Option<&mut QueueState>,
        read_pointer: &ReadPointer,
    ) -> Result<DequeueResult, QueueError> {
        let config = self.config_for(consumer).clone();
        self.dequeue(consumer, &config, state, read_pointer).await
    }

    /// Rebuild `state` from the consumer's stored row.
    async fn load_state(
        &self,
        consumer: &QueueConsumer,
        config: &QueueConfig,
        state: &mut QueueState,
        read_pointer: &ReadPointer,
    ) -> Result<(), QueueError> {
        let row_key = verified::consumer_meta_row(&self.name, consumer.group_id, consumer.instance_id);
        let active_column = verified::active_entry_column();
        let read_pointer_column = verified::consumer_read_pointer_column();
        let row = self
            .table
            .get_row(&row_key, &[active_column.clone(), read_pointer_column.clone()], read_pointer)
            .await
            .context(InternalSnafu {
                operation: "read consumer state",
            })?;

        let active = match row.get(&active_column) {
            Some(bytes) => decode_id(&row_key, bytes)?,
            None => NO_ENTRY_ID,
        };
        let consumer_read_pointer = match row.get(&read_pointer_column) {
            Some(bytes) => decode_id(&row_key, bytes)?,
            None => FIRST_QUEUE_ENTRY_ID - 1,
        };

        *state = QueueState::new();
        state.loaded = true;
        state.consumer_read_pointer = consumer_read_pointer;
        state.queue_write_pointer = self.peek_write_pointer().await?;

        if active != NO_ENTRY_ID {
            let batch = self.read_entries(&[active], read_pointer).await?;
            if !batch.entries.is_empty() {
                state.active_entry_id = Some(active);
                state.cached_entries = CachedEntries::new(batch.entries);
            } else if !batch.unseen.is_empty() && !config.partitioner.is_disjoint() {
                state.pending_claim = Some(active);
            } else {
                debug!(queue = %self.name, entry_id = active, "clearing active entry that can no longer be served");
                self.table
                    .put(
                        &row_key,
                        vec![(active_column, verified::encode_u64(NO_ENTRY_ID).to_vec())],
                        read_pointer.write_version(),
                    )
                    .await
                    .context(InternalSnafu {
                        operation: "clear active entry",
                    })?;
            }
        }

        info!(
            queue = %self.name,
            group_id = consumer.group_id,
            instance_id = consumer.instance_id,
            consumer_read_pointer,
            write_pointer = state.queue_write_pointer,
            active = ?state.active_entry_id,
            pending = ?state.pending_claim,
            "consumer state loaded"
        );
        Ok(())
    }

    /// Mark `cached` active, persist the cursor and hand the entry out.
    async fn serve(
        &self,
        consumer: &QueueConsumer,
        config: &QueueConfig,
        state: &mut QueueState,
        cached: CachedEntry,
        read_pointer: &ReadPointer,
    ) -> Result<DequeueResult, QueueError> {
        let entry_id = cached.entry_id;
        state.active_entry_id = Some(entry_id);
        state.advance_read_pointer(entry_id);
        if state.pending_claim == Some(entry_id) {
            state.pending_claim = None;
        }

        let mut cells = vec![
            (verified::consumer_read_pointer_column(), verified::encode_u64(state.consumer_read_pointer).to_vec()),
            (verified::active_entry_column(), verified::encode_u64(entry_id).to_vec()),
        ];
        if !config.partitioner.is_disjoint() {
            cells.push((verified::entry_claim_column(entry_id), verified::encode_claim_state(ClaimState::Claimed)));
        }
        self.write_consumer_row(consumer, cells, read_pointer).await?;

        self.dequeue_returns.fetch_add(1, Ordering::Relaxed);
        debug!(
            queue = %self.name,
            group_id = consumer.group_id,
            instance_id = consumer.instance_id,
            entry_id,
            "entry dequeued"
        );
        Ok(DequeueResult::Success {
            pointer: QueueEntryPointer::new(self.name.clone(), entry_id),
            entry: QueueEntry::new(cached.data),
        })
    }

    /// Persist the cursor after an empty dequeue.
    ///
    /// The active entry column is left alone: an ack may have cleared it since this
    /// state was loaded. A pending round-robin claim is stored as the active entry so
    /// a reload picks it up again.
    async fn save_empty(
        &self,
        consumer: &QueueConsumer,
        state: &QueueState,
        read_pointer: &ReadPointer,
    ) -> Result<(), QueueError> {
        let mut cells = vec![(
            verified::consumer_read_pointer_column(),
            verified::encode_u64(state.consumer_read_pointer).to_vec(),
        )];
        if let Some(claimed) = state.pending_claim {
            cells.push((verified::active_entry_column(), verified::encode_u64(claimed).to_vec()));
            cells.push((verified::entry_claim_column(claimed), verified::encode_claim_state(ClaimState::Claimed)));
        }
        self.write_consumer_row(consumer, cells, read_pointer).await
    }

    pub(crate) async fn write_consumer_row(
        &self,
        consumer: &QueueConsumer,
        cells: Vec<(Vec<u8>, Vec<u8>)>,
        read_pointer: &ReadPointer,
    ) -> Result<(), QueueError> {
        let row_key = verified::consumer_meta_row(&self.name, consumer.group_id, consumer.instance_id);
        self.table.put(&row_key, cells, read_pointer.write_version()).await.context(InternalSnafu {
            operation: "write consumer state",
        })
    }
}

fn decode_id(row_key: &[u8], bytes: &[u8]) -> Result<u64, QueueError> {
    verified::decode_u64(bytes).ok_or_else(|| QueueError::CorruptedData {
        key: verified::display_key(row_key),
        reason: format!("entry id is {} bytes, expected 8", bytes.len()),
    })
}
