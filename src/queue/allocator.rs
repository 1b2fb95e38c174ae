//! Atomic counters: entry ids, group ids and group read pointers.
//!
//! Every counter lives in its own row and is only ever changed through
//! `increment_atomic`. A delta of zero is the consistent read.

use snafu::ResultExt;
use tracing::debug;
use tracing::info;
use ttqueue_constants::FIRST_QUEUE_ENTRY_ID;
use ttqueue_table::VersionedTable;

use super::QueueManager;
use crate::error::InternalSnafu;
use crate::error::QueueError;
use crate::verified;

impl<T: VersionedTable + ?Sized + 'static> QueueManager<T> {
    /// Allocate the next entry id.
    pub(crate) async fn allocate_entry_id(&self) -> Result<u64, QueueError> {
        let row = verified::entry_id_counter_row(&self.name);
        let raw = self
            .table
            .increment_atomic(&row, &verified::counter_column(), 1)
            .await
            .context(InternalSnafu {
                operation: "allocate entry id",
            })?;
        let entry_id = counter_value(&row, raw)?;
        debug_assert!(entry_id >= FIRST_QUEUE_ENTRY_ID, "ALLOC: allocated id below first entry id");
        Ok(entry_id)
    }

    /// Current global write pointer, the highest id allocated so far.
    pub(crate) async fn peek_write_pointer(&self) -> Result<u64, QueueError> {
        let row = verified::entry_id_counter_row(&self.name);
        let raw = self
            .table
            .increment_atomic(&row, &verified::counter_column(), 0)
            .await
            .context(InternalSnafu {
                operation: "read write pointer",
            })?;
        counter_value(&row, raw)
    }

    /// Allocate a new consumer group id.
    ///
    /// Ids come from a durable counter row, so they keep increasing across process
    /// restarts and are unique across every process sharing the table.
    pub async fn allocate_group_id(&self) -> Result<u64, QueueError> {
        let row = verified::group_id_counter_row(&self.name);
        let raw = self
            .table
            .increment_atomic(&row, &verified::counter_column(), 1)
            .await
            .context(InternalSnafu {
                operation: "allocate group id",
            })?;
        let group_id = counter_value(&row, raw)?;
        info!(queue = %self.name, group_id, "consumer group id allocated");
        Ok(group_id)
    }

    /// Last id claimed by any member of `group_id`.
    pub(crate) async fn peek_group_pointer(&self, group_id: u64) -> Result<u64, QueueError> {
        let row = verified::group_read_pointer_row(&self.name, group_id);
        let raw = self
            .table
            .increment_atomic(&row, &verified::counter_column(), 0)
            .await
            .context(InternalSnafu {
                operation: "read group pointer",
            })?;
        counter_value(&row, raw)
    }

    /// Claim the next id for `group_id`. The caller is its sole owner within the group.
    pub(crate) async fn claim_group_pointer(&self, group_id: u64) -> Result<u64, QueueError> {
        let row = verified::group_read_pointer_row(&self.name, group_id);
        let raw = self
            .table
            .increment_atomic(&row, &verified::counter_column(), 1)
            .await
            .context(InternalSnafu {
                operation: "claim group pointer",
            })?;
        let entry_id = counter_value(&row, raw)?;
        debug!(queue = %self.name, group_id, entry_id, "group pointer claimed");
        Ok(entry_id)
    }
}

fn counter_value(row: &[u8], raw: i64) -> Result<u64, QueueError> {
    u64::try_from(raw).map_err(|_| QueueError::CorruptedData {
        key: verified::display_key(row),
        reason: format!("negative counter value {}", raw),
    })
}
