//! Golden rows for deterministic verification.
//!
//! Each vector is a JSON request body and the exact cells it must persist
//! as when written at [`FIXED_TIME`](crate::fixtures::FIXED_TIME). Any
//! store backend must round-trip these cells unchanged.

use chrono::{SecondsFormat, TimeZone, Utc};

use receipt_ledger_core::schema::column;
use receipt_ledger_core::{parse_record, LedgerRow, Row};

use crate::fixtures::FIXED_TIME;

/// A golden test vector.
#[derive(Debug, Clone)]
pub struct GoldenRow {
    /// Human-readable name for the vector.
    pub name: &'static str,
    /// Request body as a client would send it.
    pub body: &'static str,
    /// Expected merchant cell.
    pub expected_merchant: &'static str,
    /// Expected display total cell.
    pub expected_total: &'static str,
    /// Expected item count cell.
    pub expected_item_count: &'static str,
    /// Expected items cell.
    pub expected_items_text: &'static str,
    /// Expected raw date cell.
    pub expected_raw_date: &'static str,
    /// Expected raw total cell.
    pub expected_raw_total: &'static str,
}

/// Get all golden vectors.
pub fn all_vectors() -> Vec<GoldenRow> {
    vec![
        GoldenRow {
            name: "single coffee",
            body: r#"{"merchantName":"Bean Co","date":"2024-02-14","total":"3.50","currency":"USD","items":[{"description":"Coffee","quantity":1,"price":"3.50"}]}"#,
            expected_merchant: "Bean Co",
            expected_total: "3.50",
            expected_item_count: "1",
            expected_items_text: "Coffee x1 @ USD 3.50",
            expected_raw_date: "2024-02-14",
            expected_raw_total: "3.50",
        },
        GoldenRow {
            name: "no items",
            body: r#"{"merchantName":"Acme","date":"2024-01-01","total":"10.00"}"#,
            expected_merchant: "Acme",
            expected_total: "10.00",
            expected_item_count: "0",
            expected_items_text: "No items",
            expected_raw_date: "2024-01-01",
            expected_raw_total: "10.00",
        },
        GoldenRow {
            name: "numeric total keeps its text",
            body: r#"{"merchantName":"Acme","date":"1/2/2024","total":10.5}"#,
            expected_merchant: "Acme",
            expected_total: "10.50",
            expected_item_count: "0",
            expected_items_text: "No items",
            expected_raw_date: "1/2/2024",
            expected_raw_total: "10.5",
        },
        GoldenRow {
            name: "empty object uses defaults",
            body: "{}",
            expected_merchant: "Unknown",
            expected_total: "0.00",
            expected_item_count: "0",
            expected_items_text: "No items",
            expected_raw_date: "",
            expected_raw_total: "",
        },
        GoldenRow {
            name: "item defaults and euro currency",
            body: r#"{"merchantName":"Café","total":"7","currency":"EUR","items":[{},{"description":"Tea","quantity":"2","price":"2.25"}]}"#,
            expected_merchant: "Café",
            expected_total: "7.00",
            expected_item_count: "2",
            expected_items_text: "Item x1 @ EUR 0.00, Tea x2 @ EUR 2.25",
            expected_raw_date: "",
            expected_raw_total: "7",
        },
    ]
}

/// The cells a vector's body persists as at the fixture time.
pub fn cells_for_vector(vector: &GoldenRow) -> Result<Row, String> {
    let record = parse_record(vector.body.as_bytes()).map_err(|e| format!("{}: {}", vector.name, e))?;
    let timestamp = Utc
        .timestamp_opt(FIXED_TIME, 0)
        .single()
        .ok_or_else(|| format!("{}: invalid fixture time", vector.name))?;
    Ok(LedgerRow::from_record(&record, timestamp).to_cells())
}

/// The timestamp cell every vector is written with.
pub fn expected_timestamp() -> String {
    Utc.timestamp_opt(FIXED_TIME, 0)
        .unwrap()
        .to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Check every vector, returning the first mismatch.
pub fn verify_all_vectors() -> Result<(), String> {
    for vector in all_vectors() {
        let cells = cells_for_vector(&vector)?;
        let expected = [
            (column::TIMESTAMP, expected_timestamp()),
            (column::MERCHANT, vector.expected_merchant.to_string()),
            (column::TOTAL, vector.expected_total.to_string()),
            (column::ITEM_COUNT, vector.expected_item_count.to_string()),
            (column::ITEMS, vector.expected_items_text.to_string()),
            (column::RAW_DATE, vector.expected_raw_date.to_string()),
            (column::RAW_TOTAL, vector.expected_raw_total.to_string()),
        ];

        for (index, want) in expected {
            let got = cells.get(index).cloned().unwrap_or_default();
            if got != want {
                return Err(format!(
                    "{}: column {} is {:?}, expected {:?}",
                    vector.name, index, got, want
                ));
            }
        }
    }
    Ok(())
}
