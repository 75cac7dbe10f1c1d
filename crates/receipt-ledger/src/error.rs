//! Error types for the ledger.

use receipt_ledger_core::{ParseError, ValidationError};
use receipt_ledger_store::StoreError;
use thiserror::Error;

/// Errors that can occur while submitting or migrating.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// The request payload could not be decoded.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// The record exceeds configured limits.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Storage error.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    /// Row 1 of the store is not a ledger header.
    #[error("row 1 is not a recognised ledger header: {0:?}")]
    UnrecognisedHeader(Vec<String>),
}

/// Coarse classification, for callers that map errors to transport codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The caller sent something unusable.
    Input,
    /// The backing store failed or holds unexpected data.
    Storage,
}

impl LedgerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Parse(_) | Self::Validation(_) => ErrorKind::Input,
            Self::Store(_) | Self::UnrecognisedHeader(_) => ErrorKind::Storage,
        }
    }
}

/// Result type for ledger operations.
pub type Result<T> = std::result::Result<T, LedgerError>;
