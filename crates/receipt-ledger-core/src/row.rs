//! Ledger rows: what gets appended for an accepted receipt, and how stored
//! cells are read back for comparison.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::record::{ReceiptRecord, DEFAULT_AMOUNT};
use crate::schema::column;

/// A row of cells as the tabular store holds it.
pub type Row = Vec<String>;

/// Items text for a receipt without items.
pub const NO_ITEMS: &str = "No items";

/// One accepted receipt, ready to append.
///
/// Created only by [`LedgerRow::from_record`]; never mutated once written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerRow {
    /// Server-assigned write time.
    pub timestamp: DateTime<Utc>,
    pub merchant: String,
    /// Display date. Stores may reformat this column.
    pub date: String,
    pub time: String,
    /// Display total. Stores may reformat this column.
    pub total: String,
    pub currency: String,
    pub tax: String,
    pub item_count: usize,
    pub items_text: String,
    /// The date exactly as submitted.
    pub raw_date: String,
    /// The total exactly as submitted.
    pub raw_total: String,
}

impl LedgerRow {
    /// Derive the persisted row for a record written at `timestamp`.
    pub fn from_record(record: &ReceiptRecord, timestamp: DateTime<Utc>) -> Self {
        let currency = record.currency_or_default().to_string();
        let raw_date = record.date.clone().unwrap_or_default();
        let raw_total = record.total.clone().unwrap_or_default();

        Self {
            timestamp,
            merchant: record.merchant_or_default().to_string(),
            date: raw_date.clone(),
            time: record.time.clone().unwrap_or_default(),
            total: display_total(record.total.as_deref()),
            items_text: render_items(record, &currency),
            currency,
            tax: record.tax_or_default().to_string(),
            item_count: record.items.len(),
            raw_date,
            raw_total,
        }
    }

    /// Cells in header order.
    pub fn to_cells(&self) -> Row {
        vec![
            self.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
            self.merchant.clone(),
            self.date.clone(),
            self.time.clone(),
            self.total.clone(),
            self.currency.clone(),
            self.tax.clone(),
            self.item_count.to_string(),
            self.items_text.clone(),
            self.raw_date.clone(),
            self.raw_total.clone(),
        ]
    }
}

/// Render the human-readable items column.
///
/// Each item reads `"{description} x{quantity} @ {currency} {price}"`, joined
/// with `", "`. An empty list renders as `"No items"`.
pub fn render_items(record: &ReceiptRecord, currency: &str) -> String {
    if record.items.is_empty() {
        return NO_ITEMS.to_string();
    }

    record
        .items
        .iter()
        .map(|item| {
            format!(
                "{} x{} @ {} {}",
                item.description_or_default(),
                item.quantity_or_default(),
                currency,
                item.price_or_default()
            )
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Display form of a total: two decimals when it parses, as sent otherwise.
fn display_total(raw: Option<&str>) -> String {
    match raw {
        None => DEFAULT_AMOUNT.to_string(),
        Some(text) => match parse_amount(text) {
            Some(value) => format!("{:.2}", value),
            None => text.to_string(),
        },
    }
}

/// Parse an amount for numeric comparison. Finite values only.
pub(crate) fn parse_amount(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// A persisted row read back from the store.
///
/// Short rows are tolerated: missing display cells read as `""`, and missing
/// raw cells read as `None` so comparison falls back to the display column.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredRow {
    pub timestamp: String,
    pub merchant: String,
    pub display_date: String,
    pub time: String,
    pub display_total: String,
    pub currency: String,
    pub tax: String,
    pub item_count: String,
    pub items_text: String,
    pub raw_date: Option<String>,
    pub raw_total: Option<String>,
}

impl StoredRow {
    pub fn from_cells(cells: &[String]) -> Self {
        let cell = |index: usize| cells.get(index).cloned().unwrap_or_default();

        Self {
            timestamp: cell(column::TIMESTAMP),
            merchant: cell(column::MERCHANT),
            display_date: cell(column::DATE),
            time: cell(column::TIME),
            display_total: cell(column::TOTAL),
            currency: cell(column::CURRENCY),
            tax: cell(column::TAX),
            item_count: cell(column::ITEM_COUNT),
            items_text: cell(column::ITEMS),
            raw_date: cells.get(column::RAW_DATE).cloned(),
            raw_total: cells.get(column::RAW_TOTAL).cloned(),
        }
    }

    /// Whether this row carries the raw shadow columns.
    pub fn has_raw_fields(&self) -> bool {
        self.raw_date.is_some() && self.raw_total.is_some()
    }

    /// Date used for matching: the raw column, else the display column.
    pub fn comparable_date(&self) -> &str {
        self.raw_date
            .as_deref()
            .unwrap_or(&self.display_date)
            .trim()
    }

    /// Total used for matching: the raw column, else the display column.
    pub fn comparable_total(&self) -> &str {
        self.raw_total
            .as_deref()
            .unwrap_or(&self.display_total)
            .trim()
    }

    /// Cells in header order, padded to the current layout.
    pub fn to_cells(&self) -> Row {
        vec![
            self.timestamp.clone(),
            self.merchant.clone(),
            self.display_date.clone(),
            self.time.clone(),
            self.display_total.clone(),
            self.currency.clone(),
            self.tax.clone(),
            self.item_count.clone(),
            self.items_text.clone(),
            self.raw_date.clone().unwrap_or_default(),
            self.raw_total.clone().unwrap_or_default(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::LineItem;
    use crate::schema::COLUMN_COUNT;
    use chrono::TimeZone;

    fn ts() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap()
    }

    #[test]
    fn test_no_items() {
        let row = LedgerRow::from_record(&ReceiptRecord::new(), ts());
        assert_eq!(row.items_text, "No items");
        assert_eq!(row.item_count, 0);
    }

    #[test]
    fn test_single_item_rendering() {
        let record = ReceiptRecord::new()
            .currency("USD")
            .item(LineItem::new("Coffee", "1", "3.50"));
        let row = LedgerRow::from_record(&record, ts());
        assert_eq!(row.items_text, "Coffee x1 @ USD 3.50");
        assert_eq!(row.item_count, 1);
    }

    #[test]
    fn test_multiple_items_and_item_defaults() {
        let record = ReceiptRecord::new()
            .currency("EUR")
            .item(LineItem::new("Bread", "2", "1.20"))
            .item(LineItem::default());
        let row = LedgerRow::from_record(&record, ts());
        assert_eq!(row.items_text, "Bread x2 @ EUR 1.20, Item x1 @ EUR 0.00");
    }

    #[test]
    fn test_defaults_applied() {
        let row = LedgerRow::from_record(&ReceiptRecord::new(), ts());
        assert_eq!(row.merchant, "Unknown");
        assert_eq!(row.currency, "USD");
        assert_eq!(row.total, "0.00");
        assert_eq!(row.tax, "0.00");
        assert_eq!(row.raw_date, "");
        assert_eq!(row.raw_total, "");
    }

    #[test]
    fn test_raw_fields_are_untransformed() {
        let record = ReceiptRecord::new().date(" 01/02/2024").total("10.5 ");
        let row = LedgerRow::from_record(&record, ts());
        assert_eq!(row.raw_date, " 01/02/2024");
        assert_eq!(row.raw_total, "10.5 ");
        assert_eq!(row.total, "10.50");
    }

    #[test]
    fn test_unparseable_total_displays_as_sent() {
        let row = LedgerRow::from_record(&ReceiptRecord::new().total("$12"), ts());
        assert_eq!(row.total, "$12");
        assert_eq!(row.raw_total, "$12");
    }

    #[test]
    fn test_cells_in_header_order() {
        let record = ReceiptRecord::new()
            .merchant("Acme")
            .date("2024-01-01")
            .total("10.00");
        let cells = LedgerRow::from_record(&record, ts()).to_cells();
        assert_eq!(cells.len(), COLUMN_COUNT);
        assert_eq!(cells[column::TIMESTAMP], "2024-01-02T03:04:05.000Z");
        assert_eq!(cells[column::MERCHANT], "Acme");
        assert_eq!(cells[column::RAW_TOTAL], "10.00");
    }

    #[test]
    fn test_stored_row_tolerates_legacy_rows() {
        let cells: Row = ["t", "Acme", "1/1/2024", "", "10", "USD", "0", "0", "No items"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let stored = StoredRow::from_cells(&cells);
        assert!(!stored.has_raw_fields());
        assert_eq!(stored.comparable_date(), "1/1/2024");
        assert_eq!(stored.to_cells().len(), COLUMN_COUNT);
    }

    #[test]
    fn test_stored_row_prefers_raw_date() {
        let record = ReceiptRecord::new().date("2024-01-01");
        let mut cells = LedgerRow::from_record(&record, ts()).to_cells();
        cells[column::DATE] = "Mon Jan 01 2024".to_string();
        let stored = StoredRow::from_cells(&cells);
        assert_eq!(stored.comparable_date(), "2024-01-01");
    }
}
