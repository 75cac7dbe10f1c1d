//! # Receipt Ledger Server
//!
//! HTTP front end for the receipt ledger.
//!
//! ## Routes
//!
//! - `GET /` - liveness probe, returns fixed text
//! - `POST /` and `POST /receipts` - submit a receipt as JSON
//!
//! Submissions answer 200 for both accepted and duplicate receipts. Failures
//! answer 400 when the payload is unusable and 500 when storage fails.

pub mod app;
pub mod handlers;
pub mod response;
pub mod settings;

pub use app::{build_writer, open_store, AppWriter, SharedStore};
pub use handlers::{configure, LIVENESS_TEXT};
pub use settings::{ServerSettings, StorageBackend};
