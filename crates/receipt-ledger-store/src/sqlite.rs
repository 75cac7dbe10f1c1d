//! SQLite implementation of the Store trait.
//!
//! This is the primary storage backend for the receipt ledger. It uses
//! rusqlite with bundled SQLite, wrapped in async via tokio::spawn_blocking.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};

use receipt_ledger_core::{DecisionOutcome, DiagnosticEntry, FieldPair, Row};

use crate::error::{Result, StoreError};
use crate::migration;
use crate::traits::{DiagnosticSink, Store};

/// SQLite-based store implementation.
///
/// Thread-safe via internal Mutex. All operations use spawn_blocking
/// to avoid blocking the async runtime.
pub struct SqliteStore {
    /// The SQLite connection, protected by a mutex.
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open a SQLite database at the given path.
    ///
    /// Creates the file and runs migrations if it doesn't exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let mut conn = Connection::open(path)?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open an in-memory SQLite database.
    ///
    /// Useful for testing.
    pub fn open_memory() -> Result<Self> {
        let mut conn = Connection::open_in_memory()?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run a blocking operation on the connection off the async runtime.
    async fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);

        tokio::task::spawn_blocking(move || {
            let mut conn = conn
                .lock()
                .map_err(|e| StoreError::Unavailable(format!("mutex poisoned: {}", e)))?;
            f(&mut conn)
        })
        .await
        .map_err(|e| StoreError::Unavailable(format!("spawn_blocking failed: {}", e)))?
    }
}

fn encode_cells(values: &[String]) -> Result<String> {
    serde_json::to_string(values).map_err(|e| StoreError::Serialization(e.to_string()))
}

fn decode_cells(cells: &str) -> Result<Row> {
    serde_json::from_str(cells).map_err(|e| StoreError::Serialization(e.to_string()))
}

fn count_rows(conn: &Connection) -> Result<u64> {
    let count: i64 = conn.query_row(
        "SELECT COALESCE(MAX(row_index), 0) FROM ledger_rows",
        [],
        |row| row.get(0),
    )?;
    Ok(count as u64)
}

// Columns of decision_log as read back, before decoding.
type RawDiagnostic = (String, String, Option<i64>, [String; 6]);

fn decode_diagnostic(raw: RawDiagnostic) -> Result<DiagnosticEntry> {
    let (recorded_at, outcome, row_index, fields) = raw;
    let [stored_merchant, candidate_merchant, stored_date, candidate_date, stored_total, candidate_total] =
        fields;

    let recorded_at = DateTime::parse_from_rfc3339(&recorded_at)
        .map_err(|e| StoreError::InvalidData(format!("recorded_at {}: {}", recorded_at, e)))?
        .with_timezone(&Utc);
    let outcome = DecisionOutcome::parse(&outcome)
        .ok_or_else(|| StoreError::InvalidData(format!("unknown outcome: {}", outcome)))?;

    Ok(DiagnosticEntry {
        recorded_at,
        outcome,
        row_index: row_index.map(|r| r as u64),
        merchant: FieldPair::new(stored_merchant, candidate_merchant),
        date: FieldPair::new(stored_date, candidate_date),
        total: FieldPair::new(stored_total, candidate_total),
    })
}

#[async_trait]
impl Store for SqliteStore {
    async fn row_count(&self) -> Result<u64> {
        self.with_conn(|conn| count_rows(conn)).await
    }

    async fn read_rows(&self, start: u64, end: u64) -> Result<Vec<Row>> {
        self.with_conn(move |conn| {
            if start == 0 {
                return Err(StoreError::RowOutOfRange {
                    row: 0,
                    row_count: count_rows(conn)?,
                });
            }

            let mut stmt = conn.prepare(
                "SELECT cells FROM ledger_rows
                 WHERE row_index BETWEEN ?1 AND ?2
                 ORDER BY row_index",
            )?;

            let encoded: Vec<String> = stmt
                .query_map(
                    params![start as i64, end.min(i64::MAX as u64) as i64],
                    |row| row.get(0),
                )?
                .collect::<rusqlite::Result<Vec<_>>>()?;

            encoded.iter().map(|cells| decode_cells(cells)).collect()
        })
        .await
    }

    async fn append_row(&self, values: &[String]) -> Result<u64> {
        let cells = encode_cells(values)?;

        self.with_conn(move |conn| {
            let tx = conn.transaction()?;
            let row = count_rows(&tx)? + 1;

            tx.execute(
                "INSERT INTO ledger_rows (row_index, cells, written_at) VALUES (?1, ?2, ?3)",
                params![row as i64, cells, Utc::now().timestamp_millis()],
            )?;
            tx.commit()?;

            Ok(row)
        })
        .await
    }

    async fn write_row(&self, row: u64, values: &[String]) -> Result<()> {
        let cells = encode_cells(values)?;

        self.with_conn(move |conn| {
            let changed = conn.execute(
                "UPDATE ledger_rows SET cells = ?2, updated_at = ?3 WHERE row_index = ?1",
                params![row as i64, cells, Utc::now().timestamp_millis()],
            )?;

            if changed == 0 {
                return Err(StoreError::RowOutOfRange {
                    row,
                    row_count: count_rows(conn)?,
                });
            }
            Ok(())
        })
        .await
    }
}

#[async_trait]
impl DiagnosticSink for SqliteStore {
    async fn record_diagnostic(&self, entry: &DiagnosticEntry) -> Result<()> {
        let entry = entry.clone();

        self.with_conn(move |conn| {
            conn.execute(
                "INSERT INTO decision_log (
                    recorded_at, outcome, row_index,
                    stored_merchant, candidate_merchant,
                    stored_date, candidate_date,
                    stored_total, candidate_total
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    entry.recorded_at.to_rfc3339(),
                    entry.outcome.as_str(),
                    entry.row_index.map(|r| r as i64),
                    entry.merchant.stored,
                    entry.merchant.candidate,
                    entry.date.stored,
                    entry.date.candidate,
                    entry.total.stored,
                    entry.total.candidate,
                ],
            )?;
            Ok(())
        })
        .await
    }

    async fn diagnostics(&self) -> Result<Vec<DiagnosticEntry>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT recorded_at, outcome, row_index,
                        stored_merchant, candidate_merchant,
                        stored_date, candidate_date,
                        stored_total, candidate_total
                 FROM decision_log ORDER BY id",
            )?;

            let raw: Vec<RawDiagnostic> = stmt
                .query_map([], |row| {
                    Ok((
                        row.get(0)?,
                        row.get(1)?,
                        row.get(2)?,
                        [
                            row.get(3)?,
                            row.get(4)?,
                            row.get(5)?,
                            row.get(6)?,
                            row.get(7)?,
                            row.get(8)?,
                        ],
                    ))
                })?
                .collect::<rusqlite::Result<Vec<_>>>()?;

            raw.into_iter().map(decode_diagnostic).collect()
        })
        .await
    }
}
