//! Queue acknowledgment and redelivery operations.

use snafu::ResultExt;
use tracing::debug;
use tracing::warn;
use ttqueue_constants::NO_ENTRY_ID;
use ttqueue_table::ReadPointer;
use ttqueue_table::Row;
use ttqueue_table::VersionedTable;

use super::QueueManager;
use crate::error::InternalSnafu;
use crate::error::QueueError;
use crate::types::ClaimState;
use crate::types::QueueConsumer;
use crate::types::QueueEntryPointer;
use crate::verified;
use crate::verified::AckDecision;

impl<T: VersionedTable + ?Sized + 'static> QueueManager<T> {
    /// Acknowledge an entry served to `consumer`.
    ///
    /// Round-robin queues require the entry to be currently claimed by this consumer;
    /// otherwise [`QueueError::IllegalAck`] is returned. Hash queues write the ack
    /// without checking the claim. The active entry is cleared if it is this entry.
    pub async fn ack(
        &self,
        pointer: &QueueEntryPointer,
        consumer: &QueueConsumer,
        read_pointer: &ReadPointer,
    ) -> Result<(), QueueError> {
        self.check_pointer(pointer)?;
        let entry_id = pointer.entry_id;
        let is_disjoint = self.config_for(consumer).partitioner.is_disjoint();

        let row = self.read_claim(consumer, entry_id, read_pointer).await?;
        let claim = decode_claim(&row, consumer, entry_id, &self.name)?;

        match verified::check_ack(is_disjoint, claim) {
            AckDecision::Allowed => {}
            AckDecision::NeverClaimed => {
                return Err(QueueError::IllegalAck {
                    entry_id,
                    reason: "Entry has never been claimed.".to_string(),
                });
            }
            AckDecision::NotClaimed(state) => {
                return Err(QueueError::IllegalAck {
                    entry_id,
                    reason: format!("Entry is {}", state),
                });
            }
        }

        let mut cells = vec![(verified::entry_claim_column(entry_id), verified::encode_claim_state(ClaimState::Acked))];
        if active_entry(&row) == Some(entry_id) {
            cells.push((verified::active_entry_column(), verified::encode_u64(NO_ENTRY_ID).to_vec()));
        }
        self.write_consumer_row(consumer, cells, read_pointer).await?;

        debug!(
            queue = %self.name,
            group_id = consumer.group_id,
            instance_id = consumer.instance_id,
            entry_id,
            "entry acked"
        );
        Ok(())
    }

    /// Return an entry to `consumer` for redelivery.
    ///
    /// Resets the claim to `Claimed` and makes the entry active again, so the next
    /// dequeue that loads this consumer's state serves it. An entry that is already
    /// acked stays acked.
    pub async fn unack(
        &self,
        pointer: &QueueEntryPointer,
        consumer: &QueueConsumer,
        read_pointer: &ReadPointer,
    ) -> Result<(), QueueError> {
        self.check_pointer(pointer)?;
        let entry_id = pointer.entry_id;

        let row = self.read_claim(consumer, entry_id, read_pointer).await?;
        if decode_claim(&row, consumer, entry_id, &self.name)? == Some(ClaimState::Acked) {
            warn!(queue = %self.name, entry_id, "unack of acked entry ignored");
            return Ok(());
        }

        let cells = vec![
            (verified::entry_claim_column(entry_id), verified::encode_claim_state(ClaimState::Claimed)),
            (verified::active_entry_column(), verified::encode_u64(entry_id).to_vec()),
        ];
        self.write_consumer_row(consumer, cells, read_pointer).await?;

        debug!(
            queue = %self.name,
            group_id = consumer.group_id,
            instance_id = consumer.instance_id,
            entry_id,
            "entry unacked"
        );
        Ok(())
    }

    /// Claim and active columns of the consumer row.
    async fn read_claim(
        &self,
        consumer: &QueueConsumer,
        entry_id: u64,
        read_pointer: &ReadPointer,
    ) -> Result<Row, QueueError> {
        let row_key = verified::consumer_meta_row(&self.name, consumer.group_id, consumer.instance_id);
        self.table
            .get_row(
                &row_key,
                &[verified::entry_claim_column(entry_id), verified::active_entry_column()],
                read_pointer,
            )
            .await
            .context(InternalSnafu {
                operation: "read entry claim",
            })
    }
}

fn decode_claim(row: &Row, consumer: &QueueConsumer, entry_id: u64, name: &str) -> Result<Option<ClaimState>, QueueError> {
    match row.get(&verified::entry_claim_column(entry_id)) {
        None => Ok(None),
        Some(bytes) => verified::decode_claim_state(bytes).map(Some).ok_or_else(|| QueueError::CorruptedData {
            key: verified::display_key(&verified::consumer_meta_row(name, consumer.group_id, consumer.instance_id)),
            reason: format!("unknown claim state {:?} for entry {}", bytes, entry_id),
        }),
    }
}

fn active_entry(row: &Row) -> Option<u64> {
    row.get(&verified::active_entry_column())
        .and_then(|bytes| verified::decode_u64(bytes))
        .filter(|id| *id != NO_ENTRY_ID)
}

#[cfg(test)]
mod tests {
    use ttqueue_table::DeterministicVersionedTable;
    use ttqueue_table::MemoryTimestampOracle;

    use super::*;
    use crate::config::PartitionerKind;
    use crate::config::QueueConfig;

    fn queue(kind: PartitionerKind) -> (QueueManager<DeterministicVersionedTable>, MemoryTimestampOracle) {
        let manager = QueueManager::new(DeterministicVersionedTable::new(), "ack", QueueConfig::new(kind)).unwrap();
        (manager, MemoryTimestampOracle::new())
    }

    #[tokio::test]
    async fn test_fifo_ack_requires_claim() {
        let (manager, oracle) = queue(PartitionerKind::RoundRobin);
        let pointer = manager.enqueue_bytes(b"a".to_vec(), oracle.write_version()).await.unwrap().pointer;
        let consumer = QueueConsumer::new(1, 0, 1);

        let err = manager.ack(&pointer, &consumer, &oracle.read_pointer()).await.unwrap_err();
        match err {
            QueueError::IllegalAck { entry_id, reason } => {
                assert_eq!(entry_id, 1);
                assert_eq!(reason, "Entry has never been claimed.");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_fifo_double_ack_rejected() {
        let (manager, oracle) = queue(PartitionerKind::RoundRobin);
        manager.enqueue_bytes(b"a".to_vec(), oracle.write_version()).await.unwrap();
        let consumer = QueueConsumer::new(1, 0, 1);

        let served = manager.dequeue(&consumer, manager.config(), None, &oracle.read_pointer()).await.unwrap();
        let pointer = served.pointer().cloned().unwrap();
        manager.ack(&pointer, &consumer, &oracle.read_pointer()).await.unwrap();

        let err = manager.ack(&pointer, &consumer, &oracle.read_pointer()).await.unwrap_err();
        match err {
            QueueError::IllegalAck { reason, .. } => assert_eq!(reason, "Entry is ACKED"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_ack_clears_active_so_reload_moves_on() {
        let (manager, oracle) = queue(PartitionerKind::RoundRobin);
        manager.enqueue_bytes(b"a".to_vec(), oracle.write_version()).await.unwrap();
        let consumer = QueueConsumer::new(1, 0, 1);

        let served = manager.dequeue(&consumer, manager.config(), None, &oracle.read_pointer()).await.unwrap();
        manager.ack(served.pointer().unwrap(), &consumer, &oracle.read_pointer()).await.unwrap();

        let next = manager.dequeue(&consumer, manager.config(), None, &oracle.read_pointer()).await.unwrap();
        assert!(next.is_empty());
    }

    #[tokio::test]
    async fn test_disjoint_ack_skips_claim_check() {
        let (manager, oracle) = queue(PartitionerKind::Hash);
        let pointer = manager.enqueue_bytes(b"a".to_vec(), oracle.write_version()).await.unwrap().pointer;
        let consumer = QueueConsumer::new(1, 0, 1).with_partitioning_key("k");

        manager.ack(&pointer, &consumer, &oracle.read_pointer()).await.unwrap();
        manager.ack(&pointer, &consumer, &oracle.read_pointer()).await.unwrap();
    }

    #[tokio::test]
    async fn test_unack_redelivers_after_reload() {
        let (manager, oracle) = queue(PartitionerKind::RoundRobin);
        manager.enqueue_bytes(b"a".to_vec(), oracle.write_version()).await.unwrap();
        manager.enqueue_bytes(b"b".to_vec(), oracle.write_version()).await.unwrap();
        let consumer = QueueConsumer::new(1, 0, 1);
        let mut state = crate::queue::QueueState::new();

        let first = manager.dequeue(&consumer, manager.config(), Some(&mut state), &oracle.read_pointer()).await.unwrap();
        let pointer = first.pointer().cloned().unwrap();
        manager.unack(&pointer, &consumer, &oracle.read_pointer()).await.unwrap();

        state.invalidate();
        let again = manager.dequeue(&consumer, manager.config(), Some(&mut state), &oracle.read_pointer()).await.unwrap();
        assert_eq!(again, first);

        // Acking after redelivery works because the claim was restored.
        manager.ack(&pointer, &consumer, &oracle.read_pointer()).await.unwrap();
    }

    #[tokio::test]
    async fn test_unack_after_ack_keeps_ack() {
        let (manager, oracle) = queue(PartitionerKind::RoundRobin);
        manager.enqueue_bytes(b"a".to_vec(), oracle.write_version()).await.unwrap();
        let consumer = QueueConsumer::new(1, 0, 1);

        let served = manager.dequeue(&consumer, manager.config(), None, &oracle.read_pointer()).await.unwrap();
        let pointer = served.pointer().cloned().unwrap();
        manager.ack(&pointer, &consumer, &oracle.read_pointer()).await.unwrap();
        manager.unack(&pointer, &consumer, &oracle.read_pointer()).await.unwrap();

        let next = manager.dequeue(&consumer, manager.config(), None, &oracle.read_pointer()).await.unwrap();
        assert!(next.is_empty());
    }

    #[tokio::test]
    async fn test_ack_of_older_entry_keeps_newer_active() {
        let (manager, oracle) = queue(PartitionerKind::RoundRobin);
        manager.enqueue_bytes(b"a".to_vec(), oracle.write_version()).await.unwrap();
        manager.enqueue_bytes(b"b".to_vec(), oracle.write_version()).await.unwrap();
        let consumer = QueueConsumer::new(1, 0, 1);
        let mut state = crate::queue::QueueState::new();

        let first = manager.dequeue(&consumer, manager.config(), Some(&mut state), &oracle.read_pointer()).await.unwrap();
        let second = manager.dequeue(&consumer, manager.config(), Some(&mut state), &oracle.read_pointer()).await.unwrap();
        manager.ack(first.pointer().unwrap(), &consumer, &oracle.read_pointer()).await.unwrap();

        // Entry 2 is still unacked and comes back on reload.
        let redelivered = manager.dequeue(&consumer, manager.config(), None, &oracle.read_pointer()).await.unwrap();
        assert_eq!(redelivered, second);
    }
}
