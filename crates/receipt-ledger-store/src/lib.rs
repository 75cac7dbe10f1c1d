//! # Receipt Ledger Store
//!
//! Storage abstraction for the receipt ledger. The ledger is a single table
//! of text cells addressed by 1-based row number, with the header in row 1,
//! the way a spreadsheet holds it.
//!
//! ## Key Types
//!
//! - [`Store`] - Row-oriented async interface: read rows, append, count
//! - [`DiagnosticSink`] - Secondary table for decision traces
//! - [`SqliteStore`] - SQLite-based persistent storage
//! - [`MemoryStore`] - In-memory storage for tests and ephemeral runs
//!
//! ## Usage
//!
//! ```rust,no_run
//! use receipt_ledger_store::{SqliteStore, Store, StoreExt};
//!
//! async fn example() {
//!     let store = SqliteStore::open("ledger.db").unwrap();
//!
//!     let row = store.append_row(&["Timestamp".to_string()]).await.unwrap();
//!     assert_eq!(row, 1);
//!
//!     let rows = store.read_all_rows().await.unwrap();
//!     assert_eq!(rows.len(), 1);
//! }
//! ```
//!
//! ## Design Notes
//!
//! - **Append-only for writers**: `write_row` exists for the raw-field
//!   backfill migration only.
//! - **No locking across calls**: a read followed by an append is two
//!   independent operations. Callers that check-then-append can race.

pub mod error;
pub mod memory;
pub mod migration;
pub mod sqlite;
pub mod traits;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use traits::{DiagnosticSink, Store, StoreExt};
