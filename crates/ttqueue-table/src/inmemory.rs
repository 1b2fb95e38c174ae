//! In-memory MVCC implementation of [`VersionedTable`] for testing.
//!
//! Provides a deterministic, non-persistent table that mirrors the visibility rules
//! of a production versioned store without network or disk I/O.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::trace;

use crate::ReadPointer;
use crate::RowMap;
use crate::TableError;
use crate::VersionedTable;
use crate::WriteVersion;

/// One version of a cell. `None` is a delete marker.
#[derive(Debug, Clone)]
struct Cell {
    version: u64,
    value: Option<Vec<u8>>,
}

type CellKey = (Vec<u8>, Vec<u8>);

#[derive(Debug, Default)]
struct Inner {
    /// Versioned cells, each list sorted by ascending version.
    cells: HashMap<CellKey, Vec<Cell>>,
    /// Unversioned atomic counters.
    counters: HashMap<CellKey, i64>,
}

/// In-memory deterministic implementation of [`VersionedTable`].
///
/// Every (row, column) keeps its full version history, so reads under an older
/// [`ReadPointer`] keep seeing older values after newer writes land.
///
/// # Limitations
///
/// - No persistence across restarts
/// - No garbage collection of old versions
/// - Counter cells live apart from versioned cells and are only readable through
///   [`VersionedTable::increment_atomic`]
///
/// # Example
///
/// ```ignore
/// let table = DeterministicVersionedTable::new();
/// table.put(b"row", vec![(b"col".to_vec(), b"value".to_vec())], WriteVersion(1)).await?;
/// let row = table.get_row(b"row", &[b"col".to_vec()], &ReadPointer::new(1)).await?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct DeterministicVersionedTable {
    inner: Arc<Mutex<Inner>>,
    fail_increments: Arc<AtomicBool>,
}

impl DeterministicVersionedTable {
    /// Create a new, empty in-memory table.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Make every subsequent `increment_atomic` fail with [`TableError::Failed`].
    ///
    /// Used to exercise storage failure propagation in callers.
    pub fn set_fail_increments(&self, fail: bool) {
        self.fail_increments.store(fail, Ordering::SeqCst);
    }

    /// Number of versions stored for one cell, delete markers included.
    pub async fn version_count(&self, row: &[u8], column: &[u8]) -> usize {
        let inner = self.inner.lock().await;
        inner.cells.get(&(row.to_vec(), column.to_vec())).map(Vec::len).unwrap_or(0)
    }
}

fn validate_key(kind: &str, key: &[u8]) -> Result<(), TableError> {
    if key.is_empty() {
        return Err(TableError::InvalidKey {
            reason: format!("{kind} key must not be empty"),
        });
    }
    Ok(())
}

/// Insert `cell` keeping the history sorted; a write at an existing version replaces it.
fn insert_cell(history: &mut Vec<Cell>, cell: Cell) {
    match history.binary_search_by_key(&cell.version, |c| c.version) {
        Ok(idx) => history[idx] = cell,
        Err(idx) => history.insert(idx, cell),
    }
}

fn visible_value<'a>(history: &'a [Cell], read_pointer: &ReadPointer) -> Option<&'a Vec<u8>> {
    history
        .iter()
        .rev()
        .find(|cell| read_pointer.is_visible(cell.version))
        .and_then(|cell| cell.value.as_ref())
}

#[async_trait]
impl VersionedTable for DeterministicVersionedTable {
    async fn get(
        &self,
        rows: &[Vec<u8>],
        columns: &[Vec<u8>],
        read_pointer: &ReadPointer,
    ) -> Result<RowMap, TableError> {
        let inner = self.inner.lock().await;
        let mut result = RowMap::new();

        for row in rows {
            for column in columns {
                let key = (row.clone(), column.clone());
                if let Some(history) = inner.cells.get(&key)
                    && let Some(value) = visible_value(history, read_pointer)
                {
                    result.entry(row.clone()).or_default().insert(column.clone(), value.clone());
                }
            }
        }

        Ok(result)
    }

    async fn put(&self, row: &[u8], cells: Vec<(Vec<u8>, Vec<u8>)>, version: WriteVersion) -> Result<(), TableError> {
        validate_key("row", row)?;
        for (column, _) in &cells {
            validate_key("column", column)?;
        }

        let mut inner = self.inner.lock().await;
        for (column, value) in cells {
            let history = inner.cells.entry((row.to_vec(), column)).or_default();
            insert_cell(history, Cell {
                version: version.value(),
                value: Some(value),
            });
        }
        Ok(())
    }

    async fn delete(&self, row: &[u8], column: &[u8], version: WriteVersion) -> Result<(), TableError> {
        validate_key("row", row)?;
        validate_key("column", column)?;

        let mut inner = self.inner.lock().await;
        let history = inner.cells.entry((row.to_vec(), column.to_vec())).or_default();
        insert_cell(history, Cell {
            version: version.value(),
            value: None,
        });
        Ok(())
    }

    async fn increment_atomic(&self, row: &[u8], column: &[u8], delta: i64) -> Result<i64, TableError> {
        validate_key("row", row)?;
        validate_key("column", column)?;

        if self.fail_increments.load(Ordering::SeqCst) {
            return Err(TableError::Failed {
                operation: "increment_atomic".to_string(),
                reason: "injected failure".to_string(),
            });
        }

        let mut inner = self.inner.lock().await;
        let counter = inner.counters.entry((row.to_vec(), column.to_vec())).or_insert(0);
        let next = counter.checked_add(delta).ok_or(TableError::CounterOverflow {
            current: *counter,
            delta,
        })?;
        *counter = next;
        trace!(delta, value = next, "counter incremented");
        Ok(next)
    }
}
