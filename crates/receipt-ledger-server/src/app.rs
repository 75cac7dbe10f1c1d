//! Wiring settings to a ledger writer.

use std::sync::Arc;

use receipt_ledger::store::{DiagnosticSink, MemoryStore, SqliteStore, Store, StoreError};
use receipt_ledger::LedgerWriter;
use tracing::info;

use crate::settings::{ServerSettings, StorageBackend};

/// The store type the server runs over, whichever backend is configured.
pub type SharedStore = Arc<dyn Store>;

/// The writer shared by every request.
pub type AppWriter = LedgerWriter<SharedStore>;

/// Open the configured backend.
///
/// The same store also serves as the diagnostic sink.
pub fn open_store(
    settings: &ServerSettings,
) -> Result<(SharedStore, Arc<dyn DiagnosticSink>), StoreError> {
    match settings.storage.backend {
        StorageBackend::Memory => {
            info!("using in-memory ledger; rows are lost on exit");
            let store = Arc::new(MemoryStore::new());
            let sink: Arc<dyn DiagnosticSink> = store.clone();
            Ok((store as SharedStore, sink))
        }
        StorageBackend::Sqlite => {
            let path = &settings.storage.path;
            info!(path = %path.display(), "opening sqlite ledger");
            let store = Arc::new(SqliteStore::open(path)?);
            let sink: Arc<dyn DiagnosticSink> = store.clone();
            Ok((store as SharedStore, sink))
        }
    }
}

/// Build the writer described by `settings`.
pub fn build_writer(settings: &ServerSettings) -> Result<AppWriter, StoreError> {
    let (store, diagnostics) = open_store(settings)?;
    Ok(LedgerWriter::new(store, settings.ledger.clone()).with_diagnostics(diagnostics))
}
