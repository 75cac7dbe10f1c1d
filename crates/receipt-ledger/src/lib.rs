//! # Receipt Ledger
//!
//! An append-only ledger of receipts with duplicate detection, written over
//! a row-oriented tabular store.
//!
//! ## Overview
//!
//! The [`LedgerWriter`] accepts a [`ReceiptRecord`] and either:
//!
//! - **Reports a duplicate**: a stored row has the same merchant, date and
//!   total. Nothing is written.
//! - **Appends**: exactly one new row is written and its row number returned.
//! - **Fails**: any parse, validation or storage error. Nothing is written.
//!
//! The ledger header is created lazily on the first write. Rows are never
//! updated or deleted, except by the one-shot raw-field backfill in
//! [`migration`].
//!
//! ## Usage
//!
//! ```rust,no_run
//! use receipt_ledger::{LedgerConfig, LedgerWriter, ReceiptRecord, SubmitResult};
//! use receipt_ledger::store::SqliteStore;
//!
//! async fn example() {
//!     let store = SqliteStore::open("ledger.db").unwrap();
//!     let writer = LedgerWriter::new(store, LedgerConfig::default());
//!
//!     let receipt = ReceiptRecord::new()
//!         .merchant("Acme")
//!         .date("2024-01-01")
//!         .total("10.00");
//!
//!     match writer.submit(&receipt).await {
//!         SubmitResult::Accepted { row_index } => println!("stored at row {row_index}"),
//!         SubmitResult::Duplicate { row_index, .. } => println!("already at row {row_index}"),
//!         SubmitResult::Failure { error } => eprintln!("failed: {error}"),
//!     }
//! }
//! ```
//!
//! ## Concurrency
//!
//! The duplicate check and the append are separate store calls. Two
//! concurrent submissions of the same receipt can both pass the check and
//! both be appended. Callers that need stronger guarantees must serialize
//! submissions themselves.
//!
//! ## Re-exports
//!
//! - `receipt_ledger::core` - Records, rows, matcher
//! - `receipt_ledger::store` - Store trait, SQLite and in-memory stores

pub mod clock;
pub mod error;
pub mod migration;
pub mod writer;

pub use receipt_ledger_core as core;
pub use receipt_ledger_store as store;

pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{ErrorKind, LedgerError, Result};
pub use migration::{backfill_raw_fields, MigrationReport};
pub use writer::{ExistingReceipt, LedgerConfig, LedgerWriter, SubmitResult};

pub use receipt_ledger_core::{
    DecisionOutcome, DiagnosticEntry, LineItem, ReceiptRecord, TotalComparison,
};
