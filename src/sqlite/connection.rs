use std::fmt;
use std::path::Path;

use crate::driver::{Connection, Statement};
use crate::error::SqlOneLineError;
use crate::translation::{PlaceholderStyle, translate_placeholders};
use crate::types::{KeyRetrieval, SqlParam, SqlValue};

use super::params::bind_sqlite_param;
use super::query::SqliteCursor;

/// A `SQLite` connection the one-line operations can run against.
///
/// `$N` placeholders are rewritten to `?N` before preparing unless translation
/// is turned off, so Postgres-style text runs unchanged.
pub struct SqliteConnection {
    conn: rusqlite::Connection,
    translate_placeholders: bool,
}

impl SqliteConnection {
    #[must_use]
    pub fn new(conn: rusqlite::Connection) -> Self {
        Self {
            conn,
            translate_placeholders: true,
        }
    }

    /// Open (or create) a database file.
    ///
    /// # Errors
    ///
    /// Returns `SqlOneLineError::SqliteError` if the file cannot be opened.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SqlOneLineError> {
        Ok(Self::new(rusqlite::Connection::open(path)?))
    }

    /// # Errors
    ///
    /// Returns `SqlOneLineError::SqliteError` if `SQLite` cannot allocate the database.
    pub fn open_in_memory() -> Result<Self, SqlOneLineError> {
        Ok(Self::new(rusqlite::Connection::open_in_memory()?))
    }

    #[must_use]
    pub fn with_translation(mut self, translate_placeholders: bool) -> Self {
        self.translate_placeholders = translate_placeholders;
        self
    }

    /// Run a multi-statement script (DDL, seed data) without parameters.
    ///
    /// # Errors
    ///
    /// Returns `SqlOneLineError::SqliteError` if any statement fails.
    pub fn execute_batch(&mut self, sql: &str) -> Result<(), SqlOneLineError> {
        self.conn.execute_batch(sql).map_err(SqlOneLineError::SqliteError)
    }

    #[must_use]
    pub fn raw(&self) -> &rusqlite::Connection {
        &self.conn
    }

    #[must_use]
    pub fn into_inner(self) -> rusqlite::Connection {
        self.conn
    }
}

impl fmt::Debug for SqliteConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqliteConnection")
            .field("path", &self.conn.path())
            .field("translate_placeholders", &self.translate_placeholders)
            .finish()
    }
}

impl From<rusqlite::Connection> for SqliteConnection {
    fn from(conn: rusqlite::Connection) -> Self {
        Self::new(conn)
    }
}

impl Connection for SqliteConnection {
    type Statement<'c> = SqliteStatement<'c>;

    fn prepare(
        &mut self,
        sql: &str,
        keys: KeyRetrieval,
    ) -> Result<SqliteStatement<'_>, SqlOneLineError> {
        let text =
            translate_placeholders(sql, PlaceholderStyle::Sqlite, self.translate_placeholders);
        tracing::trace!(sql = %text, ?keys, "preparing sqlite statement");
        let conn = &self.conn;
        let stmt = conn.prepare(&text)?;
        Ok(SqliteStatement {
            conn,
            stmt,
            keys,
            generated_key: None,
            executed: false,
        })
    }
}

/// A prepared `SQLite` statement borrowed from a [`SqliteConnection`].
pub struct SqliteStatement<'c> {
    conn: &'c rusqlite::Connection,
    stmt: rusqlite::Statement<'c>,
    keys: KeyRetrieval,
    generated_key: Option<i64>,
    executed: bool,
}

impl Statement for SqliteStatement<'_> {
    type Cursor<'s>
        = SqliteCursor<'s>
    where
        Self: 's;

    fn placeholder_count(&self) -> Option<usize> {
        Some(self.stmt.parameter_count())
    }

    fn bind(&mut self, index: usize, value: &SqlParam) -> Result<(), SqlOneLineError> {
        bind_sqlite_param(&mut self.stmt, index, value)
    }

    fn query(&mut self) -> Result<SqliteCursor<'_>, SqlOneLineError> {
        let column_count = self.stmt.column_count();
        Ok(SqliteCursor::streaming(self.stmt.raw_query(), column_count))
    }

    fn execute_update(&mut self) -> Result<u64, SqlOneLineError> {
        let changed = self.stmt.raw_execute()?;
        self.executed = true;
        if self.keys == KeyRetrieval::Generated && changed > 0 {
            self.generated_key = Some(self.conn.last_insert_rowid());
        }
        u64::try_from(changed)
            .map_err(|_| SqlOneLineError::ExecutionError(format!("row count {changed} overflows u64")))
    }

    fn generated_keys(&mut self) -> Result<SqliteCursor<'_>, SqlOneLineError> {
        if self.keys != KeyRetrieval::Generated {
            return Err(SqlOneLineError::ExecutionError(
                "statement was not prepared for generated keys".to_string(),
            ));
        }
        if !self.executed {
            return Err(SqlOneLineError::ExecutionError(
                "generated keys requested before the statement ran".to_string(),
            ));
        }
        let rows = self
            .generated_key
            .map(|key| vec![vec![SqlValue::Integer(key)]])
            .unwrap_or_default();
        Ok(SqliteCursor::buffered(rows))
    }

    fn close(self) -> Result<(), SqlOneLineError> {
        self.stmt.finalize().map_err(SqlOneLineError::SqliteError)
    }
}
