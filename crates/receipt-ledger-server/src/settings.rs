//! Server settings: an optional TOML file overlaid with environment variables.
//!
//! ```toml
//! [server]
//! host = "127.0.0.1"
//! port = 8080
//!
//! [storage]
//! backend = "sqlite"
//! path = "receipt-ledger.db"
//!
//! [ledger]
//! total_comparison = "raw_text"
//! record_diagnostics = false
//!
//! [log]
//! filter = "info"
//! ```
//!
//! Environment variables use the `RECEIPT_LEDGER__` prefix with `__` between
//! sections, e.g. `RECEIPT_LEDGER__SERVER__PORT=9000`.

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment, File};
use receipt_ledger::LedgerConfig;
use serde::{Deserialize, Serialize};

/// Settings file read when no `--config` path is given. Optional.
pub const DEFAULT_CONFIG_FILE: &str = "receipt-ledger.toml";

/// Prefix for environment overrides.
pub const ENV_PREFIX: &str = "RECEIPT_LEDGER";

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerSettings {
    pub server: HttpSettings,
    pub storage: StorageSettings,
    pub ledger: LedgerConfig,
    pub log: LogSettings,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct HttpSettings {
    pub host: String,
    pub port: u16,
    /// Largest accepted request body.
    pub max_body_bytes: usize,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            max_body_bytes: 256 * 1024,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Rows are lost on exit.
    Memory,
    #[default]
    Sqlite,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageSettings {
    pub backend: StorageBackend,
    /// SQLite database file. Ignored by the memory backend.
    pub path: PathBuf,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            path: PathBuf::from("receipt-ledger.db"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LogSettings {
    /// `EnvFilter` directives, used when `RUST_LOG` is unset.
    pub filter: String,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}

impl ServerSettings {
    /// Load settings.
    ///
    /// An explicit `path` must exist. Without one, [`DEFAULT_CONFIG_FILE`] is
    /// read if present. Environment variables override both.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let file = match path {
            Some(path) => File::from(path).required(true),
            None => File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        Config::builder()
            .add_source(file)
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use receipt_ledger::TotalComparison;

    #[test]
    fn test_defaults() {
        let settings = ServerSettings::default();
        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.server.max_body_bytes, 262_144);
        assert_eq!(settings.storage.backend, StorageBackend::Sqlite);
        assert_eq!(settings.ledger.total_comparison, TotalComparison::RawText);
        assert!(!settings.ledger.record_diagnostics);
        assert_eq!(settings.log.filter, "info");
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.toml");
        std::fs::write(
            &path,
            r#"
[server]
port = 9090

[storage]
backend = "memory"

[ledger]
total_comparison = "numeric"
record_diagnostics = true

[ledger.limits]
max_items = 10
"#,
        )
        .unwrap();

        let settings = ServerSettings::load(Some(&path)).unwrap();
        assert_eq!(settings.server.port, 9090);
        assert_eq!(settings.server.host, "127.0.0.1");
        assert_eq!(settings.storage.backend, StorageBackend::Memory);
        assert_eq!(settings.ledger.total_comparison, TotalComparison::Numeric);
        assert!(settings.ledger.record_diagnostics);
        assert_eq!(settings.ledger.limits.max_items, 10);
        assert_eq!(settings.ledger.limits.max_field_len, 1024);
    }

    #[test]
    fn test_explicit_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(ServerSettings::load(Some(&dir.path().join("absent.toml"))).is_err());
    }
}
