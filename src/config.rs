//! Connection settings loadable from JSON.
//!
//! ```json
//! { "type": "sqlite", "db_path": "app.db" }
//! { "type": "postgres", "host": "localhost", "port": 5432, "dbname": "app",
//!   "user": "app", "password": "secret" }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::SqlOneLineError;
use crate::types::DatabaseType;

#[cfg(feature = "postgres")]
use crate::postgres::PostgresOptions;
#[cfg(feature = "sqlite")]
use crate::sqlite::SqliteOptions;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ConnectionConfig {
    #[cfg(feature = "sqlite")]
    Sqlite(SqliteOptions),
    #[cfg(feature = "postgres")]
    Postgres(PostgresOptions),
}

impl ConnectionConfig {
    /// # Errors
    /// Returns `SqlOneLineError::ConfigError` if the JSON does not describe a
    /// known backend.
    pub fn from_json_str(json: &str) -> Result<Self, SqlOneLineError> {
        Ok(serde_json::from_str(json)?)
    }

    /// # Errors
    /// Returns `SqlOneLineError::ConfigError` if the file cannot be read or parsed.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, SqlOneLineError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            SqlOneLineError::ConfigError(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_json_str(&json)
    }

    #[must_use]
    pub fn database_type(&self) -> DatabaseType {
        match self {
            #[cfg(feature = "sqlite")]
            ConnectionConfig::Sqlite(_) => DatabaseType::Sqlite,
            #[cfg(feature = "postgres")]
            ConnectionConfig::Postgres(_) => DatabaseType::Postgres,
        }
    }
}

#[cfg(all(test, feature = "sqlite", feature = "postgres"))]
mod tests {
    use super::*;

    #[test]
    fn parses_sqlite_with_defaults() {
        let cfg = ConnectionConfig::from_json_str(r#"{"type":"sqlite","db_path":"app.db"}"#).unwrap();
        assert_eq!(cfg.database_type(), DatabaseType::Sqlite);
        match cfg {
            ConnectionConfig::Sqlite(opts) => {
                assert_eq!(opts.db_path, "app.db");
                assert_eq!(opts.busy_timeout_ms, 5_000);
            }
            ConnectionConfig::Postgres(_) => panic!("expected sqlite"),
        }
    }

    #[test]
    fn parses_postgres_and_keeps_translation_on() {
        let cfg = ConnectionConfig::from_json_str(
            r#"{"type":"postgres","host":"db","port":5432,"dbname":"app","user":"u","password":"p"}"#,
        )
        .unwrap();
        match cfg {
            ConnectionConfig::Postgres(opts) => {
                assert!(opts.translate_placeholders);
                assert_eq!(opts.port, Some(5432));
            }
            ConnectionConfig::Sqlite(_) => panic!("expected postgres"),
        }
    }

    #[test]
    fn unknown_backend_is_config_error() {
        let err = ConnectionConfig::from_json_str(r#"{"type":"oracle"}"#).unwrap_err();
        assert!(matches!(err, SqlOneLineError::ConfigError(_)));
    }
}
