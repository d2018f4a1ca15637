use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::SqlOneLineError;

use super::connection::SqliteConnection;

fn default_busy_timeout_ms() -> u64 {
    5_000
}

fn default_translation() -> bool {
    true
}

/// Options for opening a `SQLite` connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SqliteOptions {
    pub db_path: String,
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// Script run once right after opening (pragmas, schema).
    #[serde(default)]
    pub init_sql: Option<String>,
    /// Rewrite `$N` placeholders to `?N` before preparing.
    #[serde(default = "default_translation")]
    pub translate_placeholders: bool,
}

impl SqliteOptions {
    #[must_use]
    pub fn new(db_path: impl Into<String>) -> Self {
        Self {
            db_path: db_path.into(),
            busy_timeout_ms: default_busy_timeout_ms(),
            init_sql: None,
            translate_placeholders: default_translation(),
        }
    }

    #[must_use]
    pub fn builder(db_path: impl Into<String>) -> SqliteOptionsBuilder {
        SqliteOptionsBuilder::new(db_path)
    }

    /// Open the connection described by these options.
    ///
    /// # Errors
    ///
    /// Returns `SqlOneLineError::SqliteError` if the database cannot be opened
    /// or the init script fails.
    pub fn open(&self) -> Result<SqliteConnection, SqlOneLineError> {
        let conn = if self.db_path == ":memory:" {
            rusqlite::Connection::open_in_memory()?
        } else {
            rusqlite::Connection::open(&self.db_path)?
        };
        conn.busy_timeout(Duration::from_millis(self.busy_timeout_ms))?;
        if let Some(init) = &self.init_sql {
            conn.execute_batch(init)?;
        }
        tracing::debug!(db_path = %self.db_path, "opened sqlite connection");
        Ok(SqliteConnection::new(conn).with_translation(self.translate_placeholders))
    }
}

/// Fluent builder for `SQLite` options.
#[derive(Debug, Clone)]
pub struct SqliteOptionsBuilder {
    opts: SqliteOptions,
}

impl SqliteOptionsBuilder {
    #[must_use]
    pub fn new(db_path: impl Into<String>) -> Self {
        Self {
            opts: SqliteOptions::new(db_path),
        }
    }

    #[must_use]
    pub fn busy_timeout(mut self, timeout: Duration) -> Self {
        self.opts.busy_timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    #[must_use]
    pub fn init_sql(mut self, sql: impl Into<String>) -> Self {
        self.opts.init_sql = Some(sql.into());
        self
    }

    #[must_use]
    pub fn translation(mut self, translate_placeholders: bool) -> Self {
        self.opts.translate_placeholders = translate_placeholders;
        self
    }

    #[must_use]
    pub fn finish(self) -> SqliteOptions {
        self.opts
    }

    /// Build the options and open the connection.
    ///
    /// # Errors
    ///
    /// Returns `SqlOneLineError` if opening fails.
    pub fn open(self) -> Result<SqliteConnection, SqlOneLineError> {
        self.finish().open()
    }
}
