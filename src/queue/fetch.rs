//! Fetch loop: decide which entry ids this consumer owns next.

use tracing::debug;
use ttqueue_table::ReadPointer;
use ttqueue_table::VersionedTable;

use super::QueueManager;
use super::state::QueueState;
use crate::config::PartitionerKind;
use crate::config::QueueConfig;
use crate::error::QueueError;
use crate::types::QueueConsumer;
use crate::verified;

impl<T: VersionedTable + ?Sized + 'static> QueueManager<T> {
    /// Ascending ids newly owned by `consumer`, or empty if the queue is exhausted.
    ///
    /// Hash partitioning scans windows forward from the consumer read pointer and
    /// keeps the ids whose header hash maps to this instance. Round-robin partitioning
    /// claims one id from the group's shared pointer, or returns the id already
    /// claimed but not yet visible.
    pub(crate) async fn fetch_next_entry_ids(
        &self,
        consumer: &QueueConsumer,
        config: &QueueConfig,
        state: &mut QueueState,
        read_pointer: &ReadPointer,
    ) -> Result<Vec<u64>, QueueError> {
        match config.partitioner {
            PartitionerKind::Hash => self.fetch_hashed(consumer, config, state, read_pointer).await,
            PartitionerKind::RoundRobin => self.fetch_shared(consumer, state).await,
        }
    }

    async fn fetch_hashed(
        &self,
        consumer: &QueueConsumer,
        config: &QueueConfig,
        state: &mut QueueState,
        read_pointer: &ReadPointer,
    ) -> Result<Vec<u64>, QueueError> {
        let batch_size = config.effective_batch_size();
        let partitioning_key = consumer.partitioning_key.as_deref().unwrap_or_default();

        loop {
            let cursor = state.consumer_read_pointer;
            if verified::is_caught_up(cursor, state.queue_write_pointer) {
                state.queue_write_pointer = self.peek_write_pointer().await?;
                if verified::is_caught_up(cursor, state.queue_write_pointer) {
                    return Ok(Vec::new());
                }
            }

            let Some((start, end)) =
                verified::compute_disjoint_window(cursor, batch_size, consumer.group_size, state.queue_write_pointer)
            else {
                return Ok(Vec::new());
            };
            let candidates: Vec<u64> = (start..=end).collect();
            let scan = self.read_partition_headers(&candidates, partitioning_key, read_pointer).await?;

            let owned: Vec<u64> = scan
                .visible
                .iter()
                .filter(|(id, hash)| config.partitioner.should_emit(consumer, *id, *hash))
                .map(|(id, _)| *id)
                .collect();

            debug!(
                queue = %self.name,
                group_id = consumer.group_id,
                instance_id = consumer.instance_id,
                start,
                end,
                visible = scan.visible.len(),
                owned = owned.len(),
                "scanned fetch window"
            );
            if !owned.is_empty() {
                return Ok(owned);
            }

            // Nothing owned up to the visible frontier; the cursor may pass it.
            match scan.first_unseen {
                Some(entry_id) => {
                    state.advance_read_pointer(entry_id - 1);
                    debug!(queue = %self.name, entry_id, "waiting for entry to become visible");
                    return Ok(Vec::new());
                }
                None => state.advance_read_pointer(end),
            }
        }
    }

    async fn fetch_shared(&self, consumer: &QueueConsumer, state: &mut QueueState) -> Result<Vec<u64>, QueueError> {
        if let Some(entry_id) = state.pending_claim {
            return Ok(vec![entry_id]);
        }

        let group_pointer = self.peek_group_pointer(consumer.group_id).await?;
        if !verified::should_claim_shared(group_pointer, state.queue_write_pointer) {
            state.queue_write_pointer = self.peek_write_pointer().await?;
            if !verified::should_claim_shared(group_pointer, state.queue_write_pointer) {
                return Ok(Vec::new());
            }
        }

        let entry_id = self.claim_group_pointer(consumer.group_id).await?;
        state.pending_claim = Some(entry_id);
        Ok(vec![entry_id])
    }
}
