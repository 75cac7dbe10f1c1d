//! # Receipt Ledger Core
//!
//! Pure primitives for the receipt ledger: incoming receipt records, the
//! persisted row layout, and the duplicate matching rule.
//!
//! This crate contains no I/O, no storage, no networking. Everything here
//! operates on plain values so the matcher can be tested without a store.
//!
//! ## Key Types
//!
//! - [`ReceiptRecord`] - An untrusted receipt as submitted by a client
//! - [`LedgerRow`] - One persisted ledger row derived from a record
//! - [`StoredRow`] - A tolerant read view over persisted cells
//! - [`Duplicate`] - The first stored row matching a candidate
//!
//! ## Matching
//!
//! A candidate matches a stored row when merchant, date and total all agree.
//! See the [`matcher`] module for the exact rule.

pub mod diagnostics;
pub mod error;
pub mod matcher;
pub mod record;
pub mod row;
pub mod schema;
pub mod validation;

pub use diagnostics::{DecisionOutcome, DiagnosticEntry, FieldPair};
pub use error::{ParseError, ValidationError};
pub use matcher::{find_duplicate, find_duplicate_with, Comparison, Duplicate, TotalComparison};
pub use record::{parse_record, LineItem, ReceiptRecord};
pub use row::{render_items, LedgerRow, Row, StoredRow};
pub use schema::{header_row, SchemaVersion, COLUMN_COUNT, HEADER, LEGACY_COLUMN_COUNT};
pub use validation::{validate_record, Limits};
