//! One call per query pattern.
//!
//! Each operation comes twice. The `try_*` form returns
//! `Result<_, SqlOneLineError>` and tells "no row" (`Ok(None)`) apart from a
//! failure. The plain form never fails: it reports the error with the query
//! text to the handle's [`Diagnostics`] and returns a fixed default instead.
//!
//! ```rust,no_run
//! # #[cfg(feature = "sqlite")] {
//! use sql_oneline::prelude::*;
//!
//! let mut conn = SqliteConnection::open_in_memory()?;
//! let age = get_int(&mut conn, "SELECT age FROM users WHERE user_id=?", &params![1234]);
//! let names = get_array_string(&mut conn, "SELECT name FROM users WHERE age=?", &params![21]);
//! # let _ = (age, names);
//! # }
//! # Ok::<(), sql_oneline::SqlOneLineError>(())
//! ```

use crate::diagnostics::{Diagnostics, TracingDiagnostics};
use crate::driver::Connection;
use crate::error::SqlOneLineError;
use crate::executor::{execute_dml, execute_insert_key, select_column, select_first};
use crate::query_builder::{ColumnValues, render_insert, render_update};
use crate::types::SqlParam;

/// Runs one-line operations, reporting absorbed failures to `D`.
#[derive(Debug, Clone, Default)]
pub struct OneLine<D = TracingDiagnostics> {
    diagnostics: D,
}

impl OneLine<TracingDiagnostics> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            diagnostics: TracingDiagnostics,
        }
    }
}

impl<D: Diagnostics> OneLine<D> {
    #[must_use]
    pub fn with_diagnostics(diagnostics: D) -> Self {
        Self { diagnostics }
    }

    #[must_use]
    pub fn diagnostics(&self) -> &D {
        &self.diagnostics
    }

    fn settle<T>(&self, query: &str, outcome: Result<T, SqlOneLineError>, default: T) -> T {
        outcome.unwrap_or_else(|err| {
            self.diagnostics.report(&err, Some(query));
            default
        })
    }

    /// # Errors
    /// Returns `SqlOneLineError` if the query fails.
    pub fn try_get_boolean<C: Connection>(
        &self,
        conn: &mut C,
        query: &str,
        params: &[SqlParam],
    ) -> Result<Option<bool>, SqlOneLineError> {
        select_first(conn, query, params, &self.diagnostics)
    }

    /// # Errors
    /// Returns `SqlOneLineError` if the query fails or column 1 is not an `i32`.
    pub fn try_get_int<C: Connection>(
        &self,
        conn: &mut C,
        query: &str,
        params: &[SqlParam],
    ) -> Result<Option<i32>, SqlOneLineError> {
        select_first(conn, query, params, &self.diagnostics)
    }

    /// Same reading as [`try_get_int`](Self::try_get_int); kept for parity with
    /// [`get_integer`](Self::get_integer).
    ///
    /// # Errors
    /// Returns `SqlOneLineError` if the query fails or column 1 is not an `i32`.
    pub fn try_get_integer<C: Connection>(
        &self,
        conn: &mut C,
        query: &str,
        params: &[SqlParam],
    ) -> Result<Option<i32>, SqlOneLineError> {
        self.try_get_int(conn, query, params)
    }

    /// # Errors
    /// Returns `SqlOneLineError` if the query fails or column 1 is not an `i64`.
    pub fn try_get_long<C: Connection>(
        &self,
        conn: &mut C,
        query: &str,
        params: &[SqlParam],
    ) -> Result<Option<i64>, SqlOneLineError> {
        select_first(conn, query, params, &self.diagnostics)
    }

    /// A NULL in column 1 reads as `None`, same as no row.
    ///
    /// # Errors
    /// Returns `SqlOneLineError` if the query fails.
    pub fn try_get_string<C: Connection>(
        &self,
        conn: &mut C,
        query: &str,
        params: &[SqlParam],
    ) -> Result<Option<String>, SqlOneLineError> {
        select_first::<C, Option<String>>(conn, query, params, &self.diagnostics)
            .map(Option::flatten)
    }

    /// # Errors
    /// Returns `SqlOneLineError` if the query fails or any value is not an `i32`.
    pub fn try_get_array_int<C: Connection>(
        &self,
        conn: &mut C,
        query: &str,
        params: &[SqlParam],
    ) -> Result<Vec<i32>, SqlOneLineError> {
        select_column(conn, query, params, &self.diagnostics)
    }

    /// # Errors
    /// Returns `SqlOneLineError` if the query fails.
    pub fn try_get_array_string<C: Connection>(
        &self,
        conn: &mut C,
        query: &str,
        params: &[SqlParam],
    ) -> Result<Vec<Option<String>>, SqlOneLineError> {
        select_column(conn, query, params, &self.diagnostics)
    }

    /// # Errors
    /// Returns `SqlOneLineError` if the statement fails.
    pub fn try_execute<C: Connection>(
        &self,
        conn: &mut C,
        query: &str,
        params: &[SqlParam],
    ) -> Result<u64, SqlOneLineError> {
        execute_dml(conn, query, params, &self.diagnostics)
    }

    /// # Errors
    /// Returns `SqlOneLineError` if the insert or key retrieval fails.
    pub fn try_insert_auto_increment<C: Connection>(
        &self,
        conn: &mut C,
        query: &str,
        params: &[SqlParam],
    ) -> Result<Option<i64>, SqlOneLineError> {
        execute_insert_key(conn, query, params, &self.diagnostics)
    }

    /// Insert one row built from `columns`; `true` if a row was inserted.
    ///
    /// # Errors
    /// Returns `SqlOneLineError` if `columns` is empty or the insert fails.
    pub fn try_insert<C: Connection>(
        &self,
        conn: &mut C,
        table: &str,
        columns: &ColumnValues,
    ) -> Result<bool, SqlOneLineError> {
        let rendered = render_insert(table, columns)?;
        self.try_execute(conn, &rendered.query, &rendered.params)
            .map(|affected| affected > 0)
    }

    /// Update rows where `where_key = where_value`; returns the affected count.
    ///
    /// # Errors
    /// Returns `SqlOneLineError` if `columns` is empty or the update fails.
    pub fn try_update<C: Connection>(
        &self,
        conn: &mut C,
        table: &str,
        columns: &ColumnValues,
        where_key: &str,
        where_value: impl Into<SqlParam>,
    ) -> Result<u64, SqlOneLineError> {
        let rendered = render_update(table, columns, where_key, where_value)?;
        self.try_execute(conn, &rendered.query, &rendered.params)
    }

    /// `true` only if the first row's column 1 reads as true.
    pub fn get_boolean<C: Connection>(&self, conn: &mut C, query: &str, params: &[SqlParam]) -> bool {
        let outcome = self.try_get_boolean(conn, query, params);
        self.settle(query, outcome, None).unwrap_or(false)
    }

    /// Column 1 of the first row, `0` otherwise.
    pub fn get_int<C: Connection>(&self, conn: &mut C, query: &str, params: &[SqlParam]) -> i32 {
        let outcome = self.try_get_int(conn, query, params);
        self.settle(query, outcome, None).unwrap_or(0)
    }

    /// Column 1 of the first row, `None` otherwise.
    ///
    /// The value is read through the integer getter, so a NULL column gives
    /// `Some(0)`.
    pub fn get_integer<C: Connection>(
        &self,
        conn: &mut C,
        query: &str,
        params: &[SqlParam],
    ) -> Option<i32> {
        let outcome = self.try_get_integer(conn, query, params);
        self.settle(query, outcome, None)
    }

    /// 64-bit twin of [`get_integer`](Self::get_integer).
    pub fn get_long<C: Connection>(
        &self,
        conn: &mut C,
        query: &str,
        params: &[SqlParam],
    ) -> Option<i64> {
        let outcome = self.try_get_long(conn, query, params);
        self.settle(query, outcome, None)
    }

    pub fn get_string<C: Connection>(
        &self,
        conn: &mut C,
        query: &str,
        params: &[SqlParam],
    ) -> Option<String> {
        let outcome = self.try_get_string(conn, query, params);
        self.settle(query, outcome, None)
    }

    /// Column 1 of every row in order; empty on failure.
    pub fn get_array_int<C: Connection>(
        &self,
        conn: &mut C,
        query: &str,
        params: &[SqlParam],
    ) -> Vec<i32> {
        let outcome = self.try_get_array_int(conn, query, params);
        self.settle(query, outcome, Vec::new())
    }

    /// Column 1 of every row in order, NULLs kept as `None`; empty on failure.
    pub fn get_array_string<C: Connection>(
        &self,
        conn: &mut C,
        query: &str,
        params: &[SqlParam],
    ) -> Vec<Option<String>> {
        let outcome = self.try_get_array_string(conn, query, params);
        self.settle(query, outcome, Vec::new())
    }

    /// Affected row count, `-1` on failure.
    pub fn execute<C: Connection>(&self, conn: &mut C, query: &str, params: &[SqlParam]) -> i64 {
        let outcome = self
            .try_execute(conn, query, params)
            .and_then(|affected| {
                i64::try_from(affected).map_err(|_| {
                    SqlOneLineError::ExecutionError(format!("row count {affected} overflows i64"))
                })
            });
        self.settle(query, outcome, -1)
    }

    /// Generated key of the inserted row, `0` if none was generated or the
    /// insert failed.
    pub fn insert_auto_increment<C: Connection>(
        &self,
        conn: &mut C,
        query: &str,
        params: &[SqlParam],
    ) -> i64 {
        let outcome = self.try_insert_auto_increment(conn, query, params);
        self.settle(query, outcome, None).unwrap_or(0)
    }

    /// `true` if the rendered INSERT affected at least one row.
    pub fn insert<C: Connection>(&self, conn: &mut C, table: &str, columns: &ColumnValues) -> bool {
        match render_insert(table, columns) {
            Ok(rendered) => self.execute(conn, &rendered.query, &rendered.params) > 0,
            Err(err) => {
                self.diagnostics.report(&err, None);
                false
            }
        }
    }

    /// Affected row count of the rendered UPDATE, `-1` on failure.
    pub fn update<C: Connection>(
        &self,
        conn: &mut C,
        table: &str,
        columns: &ColumnValues,
        where_key: &str,
        where_value: impl Into<SqlParam>,
    ) -> i64 {
        match render_update(table, columns, where_key, where_value) {
            Ok(rendered) => self.execute(conn, &rendered.query, &rendered.params),
            Err(err) => {
                self.diagnostics.report(&err, None);
                -1
            }
        }
    }
}

macro_rules! with_tracing_diagnostics {
    ($($(#[$doc:meta])* $name:ident -> $ret:ty;)+) => {
        $(
            $(#[$doc])*
            pub fn $name<C: Connection>(conn: &mut C, query: &str, params: &[SqlParam]) -> $ret {
                OneLine::new().$name(conn, query, params)
            }
        )+
    };
}

with_tracing_diagnostics! {
    /// See [`OneLine::get_boolean`].
    get_boolean -> bool;
    /// See [`OneLine::get_int`].
    get_int -> i32;
    /// See [`OneLine::get_integer`].
    get_integer -> Option<i32>;
    /// See [`OneLine::get_long`].
    get_long -> Option<i64>;
    /// See [`OneLine::get_string`].
    get_string -> Option<String>;
    /// See [`OneLine::get_array_int`].
    get_array_int -> Vec<i32>;
    /// See [`OneLine::get_array_string`].
    get_array_string -> Vec<Option<String>>;
    /// See [`OneLine::execute`].
    execute -> i64;
    /// See [`OneLine::insert_auto_increment`].
    insert_auto_increment -> i64;
    /// See [`OneLine::try_get_boolean`].
    ///
    /// # Errors
    /// Returns `SqlOneLineError` if the query fails.
    try_get_boolean -> Result<Option<bool>, SqlOneLineError>;
    /// See [`OneLine::try_get_int`].
    ///
    /// # Errors
    /// Returns `SqlOneLineError` if the query fails.
    try_get_int -> Result<Option<i32>, SqlOneLineError>;
    /// See [`OneLine::try_get_long`].
    ///
    /// # Errors
    /// Returns `SqlOneLineError` if the query fails.
    try_get_long -> Result<Option<i64>, SqlOneLineError>;
    /// See [`OneLine::try_get_string`].
    ///
    /// # Errors
    /// Returns `SqlOneLineError` if the query fails.
    try_get_string -> Result<Option<String>, SqlOneLineError>;
    /// See [`OneLine::try_get_array_int`].
    ///
    /// # Errors
    /// Returns `SqlOneLineError` if the query fails.
    try_get_array_int -> Result<Vec<i32>, SqlOneLineError>;
    /// See [`OneLine::try_get_array_string`].
    ///
    /// # Errors
    /// Returns `SqlOneLineError` if the query fails.
    try_get_array_string -> Result<Vec<Option<String>>, SqlOneLineError>;
    /// See [`OneLine::try_execute`].
    ///
    /// # Errors
    /// Returns `SqlOneLineError` if the statement fails.
    try_execute -> Result<u64, SqlOneLineError>;
    /// See [`OneLine::try_insert_auto_increment`].
    ///
    /// # Errors
    /// Returns `SqlOneLineError` if the insert fails.
    try_insert_auto_increment -> Result<Option<i64>, SqlOneLineError>;
}

/// See [`OneLine::insert`].
pub fn insert<C: Connection>(conn: &mut C, table: &str, columns: &ColumnValues) -> bool {
    OneLine::new().insert(conn, table, columns)
}

/// See [`OneLine::update`].
pub fn update<C: Connection>(
    conn: &mut C,
    table: &str,
    columns: &ColumnValues,
    where_key: &str,
    where_value: impl Into<SqlParam>,
) -> i64 {
    OneLine::new().update(conn, table, columns, where_key, where_value)
}
