//! One-shot backfill of the raw shadow columns.
//!
//! Ledgers created before `Raw Date` and `Raw Total` existed have a nine
//! column header and nine-cell rows. The backfill upgrades the header and
//! copies each legacy row's display date and total into the raw columns.
//!
//! Running it again changes nothing.

use serde::Serialize;
use tracing::{debug, info};

use receipt_ledger_core::schema::HEADER_ROW;
use receipt_ledger_core::{header_row, SchemaVersion, StoredRow};
use receipt_ledger_store::{Store, StoreExt};

use crate::error::{LedgerError, Result};

/// What a backfill run did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MigrationReport {
    /// The legacy header was rewritten to the current layout.
    pub header_upgraded: bool,
    /// Data rows examined, header excluded.
    pub rows_scanned: u64,
    /// Data rows that gained raw columns.
    pub rows_backfilled: u64,
}

impl MigrationReport {
    /// Whether the run wrote anything.
    pub fn changed(&self) -> bool {
        self.header_upgraded || self.rows_backfilled > 0
    }
}

/// Populate missing raw columns from the display columns.
///
/// An empty store is left empty. Row 1 must be a ledger header of either
/// layout, otherwise nothing is written.
pub async fn backfill_raw_fields<S: Store + ?Sized>(store: &S) -> Result<MigrationReport> {
    let rows = store.read_all_rows().await?;
    let mut report = MigrationReport::default();

    let Some(header) = rows.first() else {
        debug!("ledger is empty, nothing to backfill");
        return Ok(report);
    };

    let version =
        SchemaVersion::detect(header).ok_or_else(|| LedgerError::UnrecognisedHeader(header.clone()))?;

    if version != SchemaVersion::CURRENT {
        store.write_row(HEADER_ROW, &header_row()).await?;
        report.header_upgraded = true;
        info!(from = ?version, to = ?SchemaVersion::CURRENT, "upgraded ledger header");
    }

    for (offset, cells) in rows.iter().enumerate().skip(HEADER_ROW as usize) {
        report.rows_scanned += 1;

        let mut stored = StoredRow::from_cells(cells);
        if stored.has_raw_fields() {
            continue;
        }

        let row_index = offset as u64 + 1;
        stored.raw_date.get_or_insert_with(|| stored.display_date.clone());
        stored.raw_total.get_or_insert_with(|| stored.display_total.clone());

        store.write_row(row_index, &stored.to_cells()).await?;
        report.rows_backfilled += 1;
        debug!(row = row_index, "backfilled raw columns");
    }

    info!(
        header_upgraded = report.header_upgraded,
        rows_scanned = report.rows_scanned,
        rows_backfilled = report.rows_backfilled,
        "raw-field backfill complete"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use receipt_ledger_core::schema::{column, COLUMN_COUNT, HEADER, LEGACY_COLUMN_COUNT};
    use receipt_ledger_core::Row;
    use receipt_ledger_store::MemoryStore;

    fn row(values: &[&str]) -> Row {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn legacy_header() -> Row {
        row(&HEADER[..LEGACY_COLUMN_COUNT])
    }

    fn legacy_row(merchant: &str, date: &str, total: &str) -> Row {
        row(&[
            "2023-06-01T12:00:00.000Z",
            merchant,
            date,
            "",
            total,
            "USD",
            "0.00",
            "0",
            "No items",
        ])
    }

    #[tokio::test]
    async fn test_empty_store_is_noop() {
        let store = MemoryStore::new();
        let report = backfill_raw_fields(&store).await.unwrap();

        assert_eq!(report, MigrationReport::default());
        assert_eq!(store.row_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_legacy_ledger_upgraded() {
        let store = MemoryStore::with_rows(vec![
            legacy_header(),
            legacy_row("Acme", "2024-01-01", "10.00"),
            legacy_row("Bean Co", "1/2/2024", "3.5"),
        ]);

        let report = backfill_raw_fields(&store).await.unwrap();
        assert!(report.header_upgraded);
        assert_eq!(report.rows_scanned, 2);
        assert_eq!(report.rows_backfilled, 2);

        let rows = store.snapshot().unwrap();
        assert_eq!(rows[0], header_row());
        assert_eq!(rows[1].len(), COLUMN_COUNT);
        assert_eq!(rows[1][column::RAW_DATE], "2024-01-01");
        assert_eq!(rows[1][column::RAW_TOTAL], "10.00");
        assert_eq!(rows[2][column::RAW_DATE], "1/2/2024");
        assert_eq!(rows[2][column::RAW_TOTAL], "3.5");
        // Display columns are untouched.
        assert_eq!(rows[2][column::TOTAL], "3.5");
    }

    #[tokio::test]
    async fn test_second_run_changes_nothing() {
        let store = MemoryStore::with_rows(vec![
            legacy_header(),
            legacy_row("Acme", "2024-01-01", "10.00"),
        ]);

        backfill_raw_fields(&store).await.unwrap();
        let after_first = store.snapshot().unwrap();

        let report = backfill_raw_fields(&store).await.unwrap();
        assert!(!report.changed());
        assert_eq!(report.rows_scanned, 1);
        assert_eq!(store.snapshot().unwrap(), after_first);
    }

    #[tokio::test]
    async fn test_present_empty_raw_cells_kept() {
        let mut current = legacy_row("Acme", "", "0.00");
        current.extend([String::new(), String::new()]);
        let store = MemoryStore::with_rows(vec![header_row(), current.clone()]);

        let report = backfill_raw_fields(&store).await.unwrap();
        assert_eq!(report.rows_backfilled, 0);
        assert_eq!(store.snapshot().unwrap()[1], current);
    }

    #[tokio::test]
    async fn test_mixed_rows_only_legacy_rewritten() {
        let mut current = legacy_row("Acme", "2024-01-01", "10.00");
        current.extend(row(&["2024-01-01", "10.00"]));
        let store = MemoryStore::with_rows(vec![
            header_row(),
            legacy_row("Old", "2023-01-01", "1.00"),
            current,
        ]);

        let report = backfill_raw_fields(&store).await.unwrap();
        assert!(!report.header_upgraded);
        assert_eq!(report.rows_scanned, 2);
        assert_eq!(report.rows_backfilled, 1);
    }

    #[tokio::test]
    async fn test_unrecognised_header_rejected() {
        let store = MemoryStore::with_rows(vec![row(&["Name", "Email"]), row(&["a", "b"])]);

        let result = backfill_raw_fields(&store).await;
        assert!(matches!(result, Err(LedgerError::UnrecognisedHeader(_))));
        assert_eq!(store.snapshot().unwrap()[0], row(&["Name", "Email"]));
    }
}
