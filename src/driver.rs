//! The driver surface the one-line operations are written against.
//!
//! A backend supplies three pieces: a [`Connection`] that prepares statements,
//! the [`Statement`] it hands out (positional binding, execution, generated-key
//! retrieval) and the [`Cursor`] a query produces. Nothing here owns the
//! connection; callers lend it for the duration of one operation.

use crate::error::SqlOneLineError;
use crate::types::{KeyRetrieval, SqlParam, SqlValue};

/// A database connection able to prepare parameterized statements.
pub trait Connection {
    type Statement<'c>: Statement
    where
        Self: 'c;

    /// Prepare `sql`, optionally arranging for generated keys to be readable
    /// after execution.
    ///
    /// # Errors
    /// Returns `SqlOneLineError` if the driver rejects the statement.
    fn prepare(
        &mut self,
        sql: &str,
        keys: KeyRetrieval,
    ) -> Result<Self::Statement<'_>, SqlOneLineError>;
}

/// A prepared statement with 1-based positional placeholders.
pub trait Statement {
    type Cursor<'s>: Cursor
    where
        Self: 's;

    /// Number of placeholders the driver parsed, when it can tell.
    fn placeholder_count(&self) -> Option<usize>;

    /// Bind `value` at the 1-based `index`.
    ///
    /// # Errors
    /// Returns `SqlOneLineError` if the index is out of range or the driver
    /// refuses the value.
    fn bind(&mut self, index: usize, value: &SqlParam) -> Result<(), SqlOneLineError>;

    /// Run the statement as a query.
    ///
    /// # Errors
    /// Returns `SqlOneLineError` if execution fails.
    fn query(&mut self) -> Result<Self::Cursor<'_>, SqlOneLineError>;

    /// Run the statement as DML and return the affected row count.
    ///
    /// # Errors
    /// Returns `SqlOneLineError` if execution fails.
    fn execute_update(&mut self) -> Result<u64, SqlOneLineError>;

    /// Cursor over the keys generated by the last `execute_update`.
    ///
    /// # Errors
    /// Returns `SqlOneLineError` if the statement was not prepared with
    /// [`KeyRetrieval::Generated`] or has not been executed.
    fn generated_keys(&mut self) -> Result<Self::Cursor<'_>, SqlOneLineError>;

    /// Release the statement.
    ///
    /// # Errors
    /// Returns `SqlOneLineError` if the driver reports a failure while
    /// finalizing.
    fn close(self) -> Result<(), SqlOneLineError>
    where
        Self: Sized;
}

/// A row cursor. Positioned before the first row when created.
pub trait Cursor {
    /// Move back before the first row.
    ///
    /// Forward-only cursors accept this only while nothing has been read.
    ///
    /// # Errors
    /// Returns `SqlOneLineError` if the cursor cannot be repositioned.
    fn rewind(&mut self) -> Result<(), SqlOneLineError>;

    /// Advance to the next row; `false` once the rows are exhausted.
    ///
    /// # Errors
    /// Returns `SqlOneLineError` if fetching the row fails.
    fn advance(&mut self) -> Result<bool, SqlOneLineError>;

    /// Value of the 1-based `index` column of the current row.
    ///
    /// # Errors
    /// Returns `SqlOneLineError` if there is no current row or no such column.
    fn column(&self, index: usize) -> Result<SqlValue, SqlOneLineError>;

    /// Release the cursor.
    ///
    /// # Errors
    /// Returns `SqlOneLineError` if the driver fails while releasing it.
    fn close(self) -> Result<(), SqlOneLineError>
    where
        Self: Sized;
}
