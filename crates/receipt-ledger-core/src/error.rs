//! Error types for the receipt ledger core.

use thiserror::Error;

/// Errors raised while decoding an incoming receipt payload.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("malformed receipt payload: {0}")]
    Json(#[from] serde_json::Error),

    #[error("receipt payload must be a JSON object, got {0}")]
    NotAnObject(&'static str),
}

/// Structural limits violated by an otherwise well-formed record.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("too many items: {count} exceeds the maximum of {max}")]
    TooManyItems { count: usize, max: usize },

    #[error("field {field} is {len} characters, maximum is {max}")]
    FieldTooLong {
        field: &'static str,
        len: usize,
        max: usize,
    },
}
