//! Duplicate matching: does a candidate receipt already exist in the ledger?
//!
//! A stored row matches when all three hold:
//!
//! 1. merchant: trimmed, case-insensitive equality;
//! 2. date: trimmed text equality against the raw date (display date for
//!    rows without raw columns);
//! 3. total: per [`TotalComparison`].
//!
//! Absent candidate fields compare as `""`, never as a wildcard. The scan is
//! linear and returns the lowest-indexed match. There is no index; the ledger
//! is expected to stay in the low thousands of rows.

use serde::{Deserialize, Serialize};

use crate::diagnostics::FieldPair;
use crate::record::ReceiptRecord;
use crate::row::{parse_amount, Row, StoredRow};
use crate::schema::HEADER_ROW;

/// How totals are compared.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TotalComparison {
    /// Trimmed text equality against the raw total. `"10.0"` and `"10.00"`
    /// differ. Rows without a raw total fall back to numeric comparison
    /// against the display total.
    #[default]
    RawText,
    /// Compare parsed amounts rounded to the cent. Values that do not parse
    /// compare as trimmed text.
    Numeric,
}

/// The outcome of comparing a candidate against one stored row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comparison {
    /// 1-based row number of the stored row.
    pub row_index: u64,
    pub merchant: FieldPair,
    pub date: FieldPair,
    pub total: FieldPair,
    pub merchant_match: bool,
    pub date_match: bool,
    pub total_match: bool,
}

impl Comparison {
    pub fn is_match(&self) -> bool {
        self.merchant_match && self.date_match && self.total_match
    }
}

/// The first stored row matching a candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Duplicate {
    /// 1-based row number. Always greater than the header row.
    pub row_index: u64,
    pub matched: StoredRow,
}

/// Find the first row in `rows` matching `candidate`.
///
/// `rows` is the full store contents, header included as row 1.
pub fn find_duplicate(
    rows: &[Row],
    candidate: &ReceiptRecord,
    policy: TotalComparison,
) -> Option<Duplicate> {
    find_duplicate_with(rows, candidate, policy, |_| {})
}

/// Like [`find_duplicate`], reporting every comparison made to `observe`.
///
/// Comparisons are reported in row order up to and including the match.
pub fn find_duplicate_with<F>(
    rows: &[Row],
    candidate: &ReceiptRecord,
    policy: TotalComparison,
    mut observe: F,
) -> Option<Duplicate>
where
    F: FnMut(&Comparison),
{
    if rows.len() as u64 <= HEADER_ROW {
        return None;
    }

    for (offset, cells) in rows.iter().enumerate().skip(HEADER_ROW as usize) {
        let stored = StoredRow::from_cells(cells);
        let comparison = compare(offset as u64 + 1, &stored, candidate, policy);
        observe(&comparison);

        if comparison.is_match() {
            return Some(Duplicate {
                row_index: comparison.row_index,
                matched: stored,
            });
        }
    }

    None
}

/// Compare one stored row against a candidate.
pub fn compare(
    row_index: u64,
    stored: &StoredRow,
    candidate: &ReceiptRecord,
    policy: TotalComparison,
) -> Comparison {
    let stored_merchant = stored.merchant.trim();
    let stored_date = stored.comparable_date();
    let stored_total = stored.comparable_total();

    let merchant_match = stored_merchant.to_lowercase() == candidate.merchant_key().to_lowercase();
    let date_match = stored_date == candidate.date_key();
    let total_match = match (policy, stored.raw_total.is_some()) {
        (TotalComparison::RawText, true) => stored_total == candidate.total_key(),
        _ => amounts_equal(stored_total, candidate.total_key()),
    };

    Comparison {
        row_index,
        merchant: FieldPair::new(stored_merchant, candidate.merchant_key()),
        date: FieldPair::new(stored_date, candidate.date_key()),
        total: FieldPair::new(stored_total, candidate.total_key()),
        merchant_match,
        date_match,
        total_match,
    }
}

fn amounts_equal(stored: &str, candidate: &str) -> bool {
    let cents = |text: &str| parse_amount(text).and_then(to_cents);
    match (cents(stored), cents(candidate)) {
        (Some(a), Some(b)) => a == b,
        _ => stored.trim() == candidate.trim(),
    }
}

/// Whole cents, or `None` when the amount does not fit an `i64`.
fn to_cents(amount: f64) -> Option<i64> {
    let cents = (amount * 100.0).round();
    (cents.abs() < i64::MAX as f64).then_some(cents as i64)
}
