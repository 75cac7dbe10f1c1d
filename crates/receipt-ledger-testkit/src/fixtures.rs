//! Test fixtures and helpers.
//!
//! Common setup code for integration tests.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};

use receipt_ledger::{FixedClock, LedgerConfig, LedgerWriter};
use receipt_ledger_core::{LineItem, ReceiptRecord, Row};
use receipt_ledger_store::{MemoryStore, Store, StoreError};

/// The time every fixture writer stamps rows with: 2024-03-01T09:30:00Z.
pub const FIXED_TIME: i64 = 1_709_285_400;

/// A writer over an in-memory store with a fixed clock.
pub struct LedgerFixture {
    pub store: Arc<MemoryStore>,
    pub writer: LedgerWriter<Arc<MemoryStore>>,
}

impl LedgerFixture {
    /// Create a fixture over an empty store with default configuration.
    pub fn new() -> Self {
        Self::with_config(LedgerConfig::default())
    }

    /// Create a fixture with a custom configuration.
    ///
    /// The store doubles as the diagnostic sink.
    pub fn with_config(config: LedgerConfig) -> Self {
        Self::from_store(MemoryStore::new(), config)
    }

    /// Create a fixture over pre-populated rows, e.g. a legacy ledger.
    pub fn with_rows(rows: Vec<Row>) -> Self {
        Self::from_store(MemoryStore::with_rows(rows), LedgerConfig::default())
    }

    fn from_store(store: MemoryStore, config: LedgerConfig) -> Self {
        let store = Arc::new(store);
        let writer = LedgerWriter::new(store.clone(), config)
            .with_clock(FixedClock(fixed_time()))
            .with_diagnostics(store.clone());
        Self { store, writer }
    }

    /// Every stored row, header included.
    pub fn rows(&self) -> Vec<Row> {
        self.store.snapshot().unwrap()
    }

    /// Data rows only.
    pub fn data_rows(&self) -> Vec<Row> {
        self.rows().into_iter().skip(1).collect()
    }
}

impl Default for LedgerFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// The fixture clock's instant.
pub fn fixed_time() -> DateTime<Utc> {
    Utc.timestamp_opt(FIXED_TIME, 0).unwrap()
}

/// `{merchant: "Acme", date: "2024-01-01", total: "10.00"}`.
pub fn acme() -> ReceiptRecord {
    ReceiptRecord::new()
        .merchant("Acme")
        .date("2024-01-01")
        .total("10.00")
}

/// A single-item coffee receipt in USD.
pub fn coffee() -> ReceiptRecord {
    ReceiptRecord::new()
        .merchant("Bean Co")
        .date("2024-02-14")
        .time("08:15")
        .total("3.50")
        .currency("USD")
        .item(LineItem::new("Coffee", "1", "3.50"))
}

/// A store that can be switched into failing on every call.
///
/// Wraps a [`MemoryStore`] so rows written before the switch stay visible
/// once it is switched back.
#[derive(Default)]
pub struct FailingStore {
    inner: MemoryStore,
    fail_reads: AtomicBool,
    fail_appends: AtomicBool,
    append_budget: Mutex<Option<u64>>,
}

impl FailingStore {
    /// A store that works until told otherwise.
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose every call fails.
    pub fn broken() -> Self {
        let store = Self::new();
        store.fail_reads(true);
        store.fail_appends(true);
        store
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_appends(&self, fail: bool) {
        self.fail_appends.store(fail, Ordering::SeqCst);
    }

    /// Let the next `count` appends through, then fail every later one.
    pub fn fail_appends_after(&self, count: u64) {
        *self.append_budget.lock().unwrap() = Some(count);
    }

    /// Drop any append budget and clear the append failure flag.
    pub fn clear_append_failures(&self) {
        *self.append_budget.lock().unwrap() = None;
        self.fail_appends(false);
    }

    /// Copy of every stored row.
    pub fn snapshot(&self) -> Vec<Row> {
        self.inner.snapshot().unwrap()
    }

    fn check(&self, flag: &AtomicBool, op: &str) -> receipt_ledger_store::Result<()> {
        if flag.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(format!("{} rejected by test store", op)));
        }
        Ok(())
    }

    fn spend_append(&self) -> receipt_ledger_store::Result<()> {
        let mut budget = self
            .append_budget
            .lock()
            .map_err(|_| StoreError::Unavailable("append budget poisoned".into()))?;
        match budget.as_mut() {
            Some(0) => Err(StoreError::Unavailable(
                "append budget exhausted in test store".into(),
            )),
            Some(left) => {
                *left -= 1;
                Ok(())
            }
            None => Ok(()),
        }
    }
}

#[async_trait]
impl Store for FailingStore {
    async fn row_count(&self) -> receipt_ledger_store::Result<u64> {
        self.check(&self.fail_reads, "row_count")?;
        self.inner.row_count().await
    }

    async fn read_rows(&self, start: u64, end: u64) -> receipt_ledger_store::Result<Vec<Row>> {
        self.check(&self.fail_reads, "read_rows")?;
        self.inner.read_rows(start, end).await
    }

    async fn append_row(&self, values: &[String]) -> receipt_ledger_store::Result<u64> {
        self.check(&self.fail_appends, "append_row")?;
        self.spend_append()?;
        self.inner.append_row(values).await
    }

    async fn write_row(&self, row: u64, values: &[String]) -> receipt_ledger_store::Result<()> {
        self.check(&self.fail_appends, "write_row")?;
        self.inner.write_row(row, values).await
    }
}
