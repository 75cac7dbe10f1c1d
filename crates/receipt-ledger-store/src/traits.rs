//! Store trait: the abstract interface for tabular ledger persistence.
//!
//! This trait keeps the writer storage-agnostic. Implementations include
//! SQLite (primary) and in-memory (for tests).

use std::sync::Arc;

use async_trait::async_trait;
use receipt_ledger_core::{DiagnosticEntry, Row};

use crate::error::Result;

/// The Store trait: async, row-oriented access to one table of text cells.
///
/// Rows are 1-based. Row 1 is the header once one has been written.
///
/// # Design Notes
///
/// - **Contiguous rows**: appends always land at `row_count() + 1`.
/// - **No transactions across calls**: nothing ties a `read_rows` to a later
///   `append_row`.
#[async_trait]
pub trait Store: Send + Sync {
    /// Number of rows currently stored, header included.
    async fn row_count(&self) -> Result<u64>;

    /// Read rows `start..=end`, in row order.
    ///
    /// `end` is clamped to the last stored row. `start` must be at least 1.
    async fn read_rows(&self, start: u64, end: u64) -> Result<Vec<Row>>;

    /// Append one row and return its row number.
    async fn append_row(&self, values: &[String]) -> Result<u64>;

    /// Overwrite an existing row.
    ///
    /// Reserved for the raw-field backfill; ledger writers never call it.
    async fn write_row(&self, row: u64, values: &[String]) -> Result<()>;
}

/// A secondary table recording duplicate-detection decisions.
#[async_trait]
pub trait DiagnosticSink: Send + Sync {
    /// Record one decision.
    async fn record_diagnostic(&self, entry: &DiagnosticEntry) -> Result<()>;

    /// All recorded decisions, oldest first.
    async fn diagnostics(&self) -> Result<Vec<DiagnosticEntry>>;
}

/// Extension trait for common store patterns.
pub trait StoreExt: Store {
    /// Read every stored row, header included.
    fn read_all_rows(&self) -> impl std::future::Future<Output = Result<Vec<Row>>> + Send;
}

impl<S: Store + ?Sized> StoreExt for S {
    async fn read_all_rows(&self) -> Result<Vec<Row>> {
        let count = self.row_count().await?;
        if count == 0 {
            return Ok(Vec::new());
        }
        self.read_rows(1, count).await
    }
}

#[async_trait]
impl<S: Store + ?Sized> Store for Arc<S> {
    async fn row_count(&self) -> Result<u64> {
        (**self).row_count().await
    }

    async fn read_rows(&self, start: u64, end: u64) -> Result<Vec<Row>> {
        (**self).read_rows(start, end).await
    }

    async fn append_row(&self, values: &[String]) -> Result<u64> {
        (**self).append_row(values).await
    }

    async fn write_row(&self, row: u64, values: &[String]) -> Result<()> {
        (**self).write_row(row, values).await
    }
}

#[async_trait]
impl<S: DiagnosticSink + ?Sized> DiagnosticSink for Arc<S> {
    async fn record_diagnostic(&self, entry: &DiagnosticEntry) -> Result<()> {
        (**self).record_diagnostic(entry).await
    }

    async fn diagnostics(&self) -> Result<Vec<DiagnosticEntry>> {
        (**self).diagnostics().await
    }
}
