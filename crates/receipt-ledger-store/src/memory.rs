//! In-memory implementation of the Store trait.
//!
//! This is primarily for testing. It has the same semantics as SQLite
//! but keeps everything in memory with no persistence.

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use receipt_ledger_core::{DiagnosticEntry, Row};

use crate::error::{Result, StoreError};
use crate::traits::{DiagnosticSink, Store};

/// In-memory store implementation.
///
/// All data is lost when the store is dropped. Thread-safe via RwLock.
pub struct MemoryStore {
    inner: RwLock<MemoryStoreInner>,
}

#[derive(Default)]
struct MemoryStoreInner {
    /// Ledger rows; index 0 is row 1.
    rows: Vec<Row>,

    /// Decision traces.
    diagnostics: Vec<DiagnosticEntry>,
}

impl MemoryStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(MemoryStoreInner::default()),
        }
    }

    /// Create a store pre-populated with rows, e.g. a legacy ledger.
    pub fn with_rows(rows: Vec<Row>) -> Self {
        Self {
            inner: RwLock::new(MemoryStoreInner {
                rows,
                diagnostics: Vec::new(),
            }),
        }
    }

    /// Copy of every stored row.
    pub fn snapshot(&self) -> Result<Vec<Row>> {
        Ok(self.read()?.rows.clone())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, MemoryStoreInner>> {
        self.inner
            .read()
            .map_err(|e| StoreError::Unavailable(format!("lock poisoned: {}", e)))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, MemoryStoreInner>> {
        self.inner
            .write()
            .map_err(|e| StoreError::Unavailable(format!("lock poisoned: {}", e)))
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn row_count(&self) -> Result<u64> {
        Ok(self.read()?.rows.len() as u64)
    }

    async fn read_rows(&self, start: u64, end: u64) -> Result<Vec<Row>> {
        let inner = self.read()?;
        let row_count = inner.rows.len() as u64;

        if start == 0 {
            return Err(StoreError::RowOutOfRange { row: 0, row_count });
        }

        let end = end.min(row_count);
        if start > end {
            return Ok(Vec::new());
        }

        Ok(inner.rows[(start - 1) as usize..end as usize].to_vec())
    }

    async fn append_row(&self, values: &[String]) -> Result<u64> {
        let mut inner = self.write()?;
        inner.rows.push(values.to_vec());
        Ok(inner.rows.len() as u64)
    }

    async fn write_row(&self, row: u64, values: &[String]) -> Result<()> {
        let mut inner = self.write()?;
        let row_count = inner.rows.len() as u64;

        if row == 0 || row > row_count {
            return Err(StoreError::RowOutOfRange { row, row_count });
        }

        inner.rows[(row - 1) as usize] = values.to_vec();
        Ok(())
    }
}

#[async_trait]
impl DiagnosticSink for MemoryStore {
    async fn record_diagnostic(&self, entry: &DiagnosticEntry) -> Result<()> {
        self.write()?.diagnostics.push(entry.clone());
        Ok(())
    }

    async fn diagnostics(&self) -> Result<Vec<DiagnosticEntry>> {
        Ok(self.read()?.diagnostics.clone())
    }
}
