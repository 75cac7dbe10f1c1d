//! The persisted ledger layout.
//!
//! Row 1 of the store is the header. The first nine columns are the legacy
//! layout; the two trailing columns shadow the date and total exactly as the
//! client sent them, so comparisons survive any reformatting the store applies
//! to the display columns.

use serde::{Deserialize, Serialize};

/// Header labels, in column order.
pub const HEADER: [&str; COLUMN_COUNT] = [
    "Timestamp",
    "Merchant",
    "Date",
    "Time",
    "Total",
    "Currency",
    "Tax",
    "Item Count",
    "Items",
    "Raw Date",
    "Raw Total",
];

/// Columns in the current layout.
pub const COLUMN_COUNT: usize = 11;

/// Columns in the layout written before the raw shadow columns existed.
pub const LEGACY_COLUMN_COUNT: usize = 9;

/// Row number of the header. Rows are 1-based.
pub const HEADER_ROW: u64 = 1;

/// Zero-based column positions within a row.
pub mod column {
    pub const TIMESTAMP: usize = 0;
    pub const MERCHANT: usize = 1;
    pub const DATE: usize = 2;
    pub const TIME: usize = 3;
    pub const TOTAL: usize = 4;
    pub const CURRENCY: usize = 5;
    pub const TAX: usize = 6;
    pub const ITEM_COUNT: usize = 7;
    pub const ITEMS: usize = 8;
    pub const RAW_DATE: usize = 9;
    pub const RAW_TOTAL: usize = 10;
}

/// Which header layout a ledger was created with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SchemaVersion {
    /// Nine columns, no raw shadow fields.
    Legacy,
    /// Eleven columns including `Raw Date` and `Raw Total`.
    RawShadow,
}

impl SchemaVersion {
    /// The layout new ledgers are created with.
    pub const CURRENT: Self = Self::RawShadow;

    /// Number of columns in this layout.
    pub fn column_count(self) -> usize {
        match self {
            Self::Legacy => LEGACY_COLUMN_COUNT,
            Self::RawShadow => COLUMN_COUNT,
        }
    }

    /// Header labels for this layout.
    pub fn header(self) -> &'static [&'static str] {
        &HEADER[..self.column_count()]
    }

    /// Recognise a header row. Labels compare trimmed and case-insensitively.
    ///
    /// Returns `None` when the row is not a ledger header at all.
    pub fn detect(header: &[String]) -> Option<Self> {
        let matches = |version: Self| {
            header.len() >= version.column_count()
                && version
                    .header()
                    .iter()
                    .zip(header)
                    .all(|(expected, actual)| actual.trim().eq_ignore_ascii_case(expected))
        };

        if matches(Self::RawShadow) {
            Some(Self::RawShadow)
        } else if matches(Self::Legacy) {
            Some(Self::Legacy)
        } else {
            None
        }
    }
}

/// The header row for newly created ledgers.
pub fn header_row() -> Vec<String> {
    SchemaVersion::CURRENT
        .header()
        .iter()
        .map(|label| label.to_string())
        .collect()
}
