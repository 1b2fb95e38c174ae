//! Versioned columnar table interface consumed by the ttqueue engine.
//!
//! The queue engine never talks to a concrete storage backend. It consumes the
//! narrow [`VersionedTable`] trait defined here:
//!
//! - `get` - batch read of a column set across many rows under an MVCC snapshot
//! - `put` - write several columns of one row at a write version
//! - `delete` - write a delete marker for one column at a write version
//! - `increment_atomic` - linearizable per-cell counter, unversioned
//!
//! Keys and values are opaque byte strings. Row and column keys are produced by the
//! queue's key codec; this crate attaches no meaning to them.
//!
//! [`DeterministicVersionedTable`] is an in-memory implementation with full MVCC read
//! isolation, used by tests and by embedders that do not need durability.

mod error;
mod inmemory;
mod oracle;
mod pointer;

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
pub use error::TableError;
pub use inmemory::DeterministicVersionedTable;
pub use oracle::MemoryTimestampOracle;
pub use pointer::ReadPointer;
pub use pointer::WriteVersion;

/// Columns of a single row, keyed by column key.
pub type Row = BTreeMap<Vec<u8>, Vec<u8>>;

/// Rows returned by a batch read, keyed by row key.
pub type RowMap = BTreeMap<Vec<u8>, Row>;

/// Storage collaborator for the queue engine.
///
/// Implementations must provide snapshot-isolated `get`/`put`/`delete` and an
/// atomic per-cell increment. A read under a [`ReadPointer`] never observes a write
/// whose version the pointer does not include.
#[async_trait]
pub trait VersionedTable: Send + Sync {
    /// Read `columns` of every row in `rows` as of `read_pointer`.
    ///
    /// Rows with no visible column are absent from the result. Columns with no
    /// visible value (never written, or deleted) are absent from their row.
    async fn get(&self, rows: &[Vec<u8>], columns: &[Vec<u8>], read_pointer: &ReadPointer)
    -> Result<RowMap, TableError>;

    /// Write `cells` (column, value) into `row` at `version`.
    async fn put(&self, row: &[u8], cells: Vec<(Vec<u8>, Vec<u8>)>, version: WriteVersion) -> Result<(), TableError>;

    /// Delete `column` of `row` at `version`.
    ///
    /// Readers whose snapshot includes `version` see the column as absent; older
    /// snapshots still see the previous value.
    async fn delete(&self, row: &[u8], column: &[u8], version: WriteVersion) -> Result<(), TableError>;

    /// Atomically add `delta` to the counter at (`row`, `column`) and return the new value.
    ///
    /// Counters start at zero and are not versioned: every caller observes every
    /// increment immediately. A `delta` of zero is a consistent read.
    async fn increment_atomic(&self, row: &[u8], column: &[u8], delta: i64) -> Result<i64, TableError>;

    /// Read `columns` of a single row as of `read_pointer`.
    async fn get_row(&self, row: &[u8], columns: &[Vec<u8>], read_pointer: &ReadPointer) -> Result<Row, TableError> {
        let row_key = row.to_vec();
        let mut rows = self.get(std::slice::from_ref(&row_key), columns, read_pointer).await?;
        Ok(rows.remove(&row_key).unwrap_or_default())
    }
}

// Blanket implementation for Arc<T> where T: VersionedTable
#[async_trait]
impl<T: VersionedTable + ?Sized> VersionedTable for Arc<T> {
    async fn get(
        &self,
        rows: &[Vec<u8>],
        columns: &[Vec<u8>],
        read_pointer: &ReadPointer,
    ) -> Result<RowMap, TableError> {
        (**self).get(rows, columns, read_pointer).await
    }

    async fn put(&self, row: &[u8], cells: Vec<(Vec<u8>, Vec<u8>)>, version: WriteVersion) -> Result<(), TableError> {
        (**self).put(row, cells, version).await
    }

    async fn delete(&self, row: &[u8], column: &[u8], version: WriteVersion) -> Result<(), TableError> {
        (**self).delete(row, column, version).await
    }

    async fn increment_atomic(&self, row: &[u8], column: &[u8], delta: i64) -> Result<i64, TableError> {
        (**self).increment_atomic(row, column, delta).await
    }
}
