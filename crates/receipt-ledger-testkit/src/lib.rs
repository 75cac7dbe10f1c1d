//! # Receipt Ledger Testkit
//!
//! Testing utilities for the receipt ledger.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Golden rows**: Known receipts with the exact cells they must persist as
//! - **Generators**: Proptest strategies for property-based testing
//! - **Fixtures**: A ready-made writer over an in-memory store, and a store
//!   that fails on demand
//!
//! ## Golden Rows
//!
//! ```rust
//! use receipt_ledger_testkit::vectors::{all_vectors, verify_all_vectors};
//!
//! assert!(verify_all_vectors().is_ok());
//! for vector in all_vectors() {
//!     println!("{}: {}", vector.name, vector.expected_items_text);
//! }
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use receipt_ledger_testkit::generators::receipt;
//!
//! proptest! {
//!     #[test]
//!     fn merchant_is_never_empty(r in receipt()) {
//!         prop_assert!(!r.merchant_key().is_empty());
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! ```rust
//! use receipt_ledger_testkit::fixtures::{acme, LedgerFixture};
//!
//! let fixture = LedgerFixture::new();
//! let receipt = acme();
//! assert_eq!(receipt.merchant_key(), "Acme");
//! assert!(fixture.rows().is_empty());
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::{acme, FailingStore, LedgerFixture, FIXED_TIME};
pub use generators::{receipt, ReceiptParams};
pub use vectors::{all_vectors, verify_all_vectors, GoldenRow};
