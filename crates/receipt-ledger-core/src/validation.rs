//! Structural limits on incoming records.
//!
//! Every field is optional, so an empty record is valid. The only checks are
//! size limits that keep a single submission from producing an unbounded row.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::record::ReceiptRecord;

/// Default maximum number of items per receipt.
pub const DEFAULT_MAX_ITEMS: usize = 500;

/// Default maximum length of any single text field, in characters.
pub const DEFAULT_MAX_FIELD_LEN: usize = 1024;

/// Size limits applied before a record is considered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    pub max_items: usize,
    pub max_field_len: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_items: DEFAULT_MAX_ITEMS,
            max_field_len: DEFAULT_MAX_FIELD_LEN,
        }
    }
}

/// Check a record against `limits`.
pub fn validate_record(record: &ReceiptRecord, limits: &Limits) -> Result<(), ValidationError> {
    if record.items.len() > limits.max_items {
        return Err(ValidationError::TooManyItems {
            count: record.items.len(),
            max: limits.max_items,
        });
    }

    let fields = [
        ("merchantName", &record.merchant_name),
        ("date", &record.date),
        ("time", &record.time),
        ("total", &record.total),
        ("currency", &record.currency),
        ("tax", &record.tax),
    ];
    for (field, value) in fields {
        check_len(field, value.as_deref(), limits)?;
    }

    for item in &record.items {
        check_len("items.description", item.description.as_deref(), limits)?;
        check_len("items.quantity", item.quantity.as_deref(), limits)?;
        check_len("items.price", item.price.as_deref(), limits)?;
    }

    Ok(())
}

fn check_len(field: &'static str, value: Option<&str>, limits: &Limits) -> Result<(), ValidationError> {
    let len = value.map(|v| v.chars().count()).unwrap_or(0);
    if len > limits.max_field_len {
        return Err(ValidationError::FieldTooLong {
            field,
            len,
            max: limits.max_field_len,
        });
    }
    Ok(())
}
