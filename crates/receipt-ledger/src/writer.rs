//! The ledger writer: duplicate check, then append.
//!
//! The writer owns no state beyond its configuration. Everything it decides
//! is derived from the rows currently in the store.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use receipt_ledger_core::{
    find_duplicate_with, header_row, parse_record, validate_record, Comparison, DecisionOutcome,
    DiagnosticEntry, LedgerRow, Limits, ReceiptRecord, StoredRow, TotalComparison,
};
use receipt_ledger_store::{DiagnosticSink, Store, StoreExt};

use crate::clock::{Clock, SystemClock};
use crate::error::{LedgerError, Result};
use crate::migration::{backfill_raw_fields, MigrationReport};

/// Configuration for the writer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// How totals are compared when looking for duplicates.
    pub total_comparison: TotalComparison,
    /// Whether to record each decision to the diagnostic sink, if one is set.
    pub record_diagnostics: bool,
    /// Size limits applied to incoming records.
    pub limits: Limits,
}

/// The stored values reported back for a duplicate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExistingReceipt {
    pub merchant: String,
    pub date: String,
    pub total: String,
}

impl From<&StoredRow> for ExistingReceipt {
    fn from(row: &StoredRow) -> Self {
        Self {
            merchant: row.merchant.clone(),
            date: row.display_date.clone(),
            total: row.display_total.clone(),
        }
    }
}

/// Result of submitting a receipt.
#[derive(Debug)]
pub enum SubmitResult {
    /// A matching row already exists. Storage untouched.
    Duplicate {
        row_index: u64,
        existing: ExistingReceipt,
    },
    /// Exactly one row was appended.
    Accepted { row_index: u64 },
    /// No data row was appended. On an empty store the header row may
    /// already have been written when a later step failed.
    Failure { error: LedgerError },
}

impl SubmitResult {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted { .. })
    }

    pub fn is_duplicate(&self) -> bool {
        matches!(self, Self::Duplicate { .. })
    }

    /// Row number for accepted and duplicate results.
    pub fn row_index(&self) -> Option<u64> {
        match self {
            Self::Duplicate { row_index, .. } | Self::Accepted { row_index } => Some(*row_index),
            Self::Failure { .. } => None,
        }
    }
}

/// The ledger writer.
///
/// Provides:
/// - Submitting receipts (duplicate check, then append)
/// - The one-shot raw-field backfill
pub struct LedgerWriter<S: Store> {
    /// The tabular store.
    store: S,
    /// Configuration.
    config: LedgerConfig,
    /// Source of row timestamps.
    clock: Arc<dyn Clock>,
    /// Where decision traces go when enabled.
    diagnostics: Option<Arc<dyn DiagnosticSink>>,
}

impl<S: Store> LedgerWriter<S> {
    /// Create a writer over `store`.
    pub fn new(store: S, config: LedgerConfig) -> Self {
        Self {
            store,
            config,
            clock: Arc::new(SystemClock),
            diagnostics: None,
        }
    }

    /// Use a different clock for row timestamps.
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Send decision traces to `sink` when `record_diagnostics` is on.
    pub fn with_diagnostics(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.diagnostics = Some(sink);
        self
    }

    /// Get the store reference.
    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Submit
    // ─────────────────────────────────────────────────────────────────────────

    /// Submit a receipt.
    ///
    /// Never returns an error: failures are reported as
    /// [`SubmitResult::Failure`] and are never retried.
    ///
    /// The duplicate check and the append are not atomic. Concurrent
    /// submissions of the same receipt may both be accepted.
    pub async fn submit(&self, candidate: &ReceiptRecord) -> SubmitResult {
        match self.try_submit(candidate).await {
            Ok(result) => result,
            Err(error) => {
                error!(%error, "receipt submission failed");
                SubmitResult::Failure { error }
            }
        }
    }

    /// Decode a JSON request body and submit it.
    pub async fn submit_json(&self, body: &[u8]) -> SubmitResult {
        match parse_record(body) {
            Ok(record) => self.submit(&record).await,
            Err(e) => {
                let error = LedgerError::from(e);
                warn!(%error, "rejected malformed receipt payload");
                SubmitResult::Failure { error }
            }
        }
    }

    async fn try_submit(&self, candidate: &ReceiptRecord) -> Result<SubmitResult> {
        validate_record(candidate, &self.config.limits)?;

        let row_count = self.store.row_count().await?;
        if row_count == 0 {
            self.store.append_row(&header_row()).await?;
            info!("initialized ledger header");
        }

        let now = self.clock.now();

        if candidate.force {
            debug!("force set, skipping duplicate check");
            self.record(|| DiagnosticEntry::for_candidate(now, DecisionOutcome::Forced, candidate))
                .await;
        } else if row_count <= 1 {
            self.record(|| {
                DiagnosticEntry::for_candidate(now, DecisionOutcome::EmptyLedger, candidate)
            })
            .await;
        } else {
            let rows = self.store.read_all_rows().await?;
            let mut matched: Option<Comparison> = None;

            let duplicate =
                find_duplicate_with(&rows, candidate, self.config.total_comparison, |c| {
                    debug!(
                        row = c.row_index,
                        merchant_match = c.merchant_match,
                        date_match = c.date_match,
                        total_match = c.total_match,
                        "compared stored row"
                    );
                    if c.is_match() {
                        matched = Some(c.clone());
                    }
                });

            if let Some(duplicate) = duplicate {
                if let Some(comparison) = &matched {
                    self.record(|| {
                        DiagnosticEntry::from_comparison(now, DecisionOutcome::Duplicate, comparison)
                    })
                    .await;
                }

                info!(row = duplicate.row_index, "duplicate receipt, nothing appended");
                return Ok(SubmitResult::Duplicate {
                    row_index: duplicate.row_index,
                    existing: ExistingReceipt::from(&duplicate.matched),
                });
            }

            self.record(|| DiagnosticEntry::for_candidate(now, DecisionOutcome::NoMatch, candidate))
                .await;
        }

        let row = LedgerRow::from_record(candidate, now);
        let row_index = self.store.append_row(&row.to_cells()).await?;

        info!(
            row = row_index,
            merchant = %row.merchant,
            items = row.item_count,
            forced = candidate.force,
            "receipt appended"
        );
        Ok(SubmitResult::Accepted { row_index })
    }

    /// Record a decision trace. Failures are logged and otherwise ignored.
    async fn record<F>(&self, entry: F)
    where
        F: FnOnce() -> DiagnosticEntry,
    {
        if !self.config.record_diagnostics {
            return;
        }
        let Some(sink) = &self.diagnostics else {
            return;
        };

        if let Err(error) = sink.record_diagnostic(&entry()).await {
            warn!(%error, "failed to record duplicate-check diagnostic");
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Migration
    // ─────────────────────────────────────────────────────────────────────────

    /// Run the raw-field backfill against this writer's store.
    ///
    /// Not part of the submit path. Safe to run any number of times.
    pub async fn migrate(&self) -> Result<MigrationReport> {
        backfill_raw_fields(&self.store).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use receipt_ledger_core::schema::column;
    use receipt_ledger_core::LineItem;
    use receipt_ledger_store::{MemoryStore, StoreError};

    use crate::clock::FixedClock;

    fn writer() -> LedgerWriter<Arc<MemoryStore>> {
        LedgerWriter::new(Arc::new(MemoryStore::new()), LedgerConfig::default())
    }

    fn acme() -> ReceiptRecord {
        ReceiptRecord::new()
            .merchant("Acme")
            .date("2024-01-01")
            .total("10.00")
    }

    #[tokio::test]
    async fn test_first_submit_creates_header_and_row() {
        let writer = writer();
        let result = writer.submit(&acme()).await;

        assert!(matches!(result, SubmitResult::Accepted { row_index: 2 }));
        let rows = writer.store().snapshot().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], header_row());
    }

    #[tokio::test]
    async fn test_second_submit_is_duplicate() {
        let writer = writer();
        writer.submit(&acme()).await;
        let result = writer.submit(&acme()).await;

        match result {
            SubmitResult::Duplicate { row_index, existing } => {
                assert_eq!(row_index, 2);
                assert_eq!(existing.merchant, "Acme");
                assert_eq!(existing.date, "2024-01-01");
                assert_eq!(existing.total, "10.00");
            }
            other => panic!("expected duplicate, got {:?}", other),
        }
        assert_eq!(writer.store().snapshot().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_header_written_once() {
        let writer = writer();
        writer.submit(&acme().force(true)).await;
        writer.submit(&acme().force(true)).await;

        let rows = writer.store().snapshot().unwrap();
        let headers = rows.iter().filter(|r| **r == header_row()).count();
        assert_eq!(headers, 1);
        assert_eq!(rows.len(), 3);
    }

    #[tokio::test]
    async fn test_row_uses_clock() {
        let at = Utc.with_ymd_and_hms(2024, 5, 6, 7, 8, 9).unwrap();
        let writer = writer().with_clock(FixedClock(at));
        writer
            .submit(&acme().item(LineItem::new("Coffee", "1", "3.50")))
            .await;

        let rows = writer.store().snapshot().unwrap();
        assert_eq!(rows[1][column::TIMESTAMP], "2024-05-06T07:08:09.000Z");
        assert_eq!(rows[1][column::ITEMS], "Coffee x1 @ USD 3.50");
        assert_eq!(rows[1][column::ITEM_COUNT], "1");
    }

    #[tokio::test]
    async fn test_submit_json_parse_failure() {
        let writer = writer();
        let result = writer.submit_json(b"not json").await;

        assert!(matches!(
            result,
            SubmitResult::Failure {
                error: LedgerError::Parse(_)
            }
        ));
        assert_eq!(writer.store().row_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_validation_failure_touches_nothing() {
        let config = LedgerConfig {
            limits: Limits {
                max_items: 0,
                ..Limits::default()
            },
            ..LedgerConfig::default()
        };
        let writer = LedgerWriter::new(MemoryStore::new(), config);
        let result = writer
            .submit(&acme().item(LineItem::new("Coffee", "1", "3.50")))
            .await;

        assert!(matches!(
            result,
            SubmitResult::Failure {
                error: LedgerError::Validation(_)
            }
        ));
        assert_eq!(writer.store().row_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_diagnostics_recorded_when_enabled() {
        let store = Arc::new(MemoryStore::new());
        let config = LedgerConfig {
            record_diagnostics: true,
            ..LedgerConfig::default()
        };
        let writer = LedgerWriter::new(store.clone(), config).with_diagnostics(store.clone());

        writer.submit(&acme()).await;
        writer.submit(&acme().total("11.00")).await;
        writer.submit(&acme()).await;
        writer.submit(&acme().force(true)).await;

        let entries = store.diagnostics().await.unwrap();
        let outcomes: Vec<_> = entries.iter().map(|e| e.outcome).collect();
        assert_eq!(
            outcomes,
            vec![
                DecisionOutcome::EmptyLedger,
                DecisionOutcome::NoMatch,
                DecisionOutcome::Duplicate,
                DecisionOutcome::Forced,
            ]
        );
        assert_eq!(entries[2].row_index, Some(2));
        assert_eq!(entries[2].total.stored, "10.00");
    }

    #[tokio::test]
    async fn test_diagnostics_off_by_default() {
        let store = Arc::new(MemoryStore::new());
        let writer = LedgerWriter::new(store.clone(), LedgerConfig::default())
            .with_diagnostics(store.clone());

        writer.submit(&acme()).await;
        assert!(store.diagnostics().await.unwrap().is_empty());
    }

    struct BrokenSink;

    #[async_trait::async_trait]
    impl DiagnosticSink for BrokenSink {
        async fn record_diagnostic(&self, _: &DiagnosticEntry) -> receipt_ledger_store::Result<()> {
            Err(StoreError::Unavailable("sink offline".into()))
        }

        async fn diagnostics(&self) -> receipt_ledger_store::Result<Vec<DiagnosticEntry>> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn test_diagnostic_failure_does_not_fail_submit() {
        let config = LedgerConfig {
            record_diagnostics: true,
            ..LedgerConfig::default()
        };
        let writer =
            LedgerWriter::new(MemoryStore::new(), config).with_diagnostics(Arc::new(BrokenSink));

        assert!(writer.submit(&acme()).await.is_accepted());
    }
}
