use rusqlite::Statement;
use rusqlite::types::Null;

use crate::error::SqlOneLineError;
use crate::types::SqlParam;

/// Bind one parameter at a 1-based index on a raw rusqlite statement.
///
/// SQLite has no boolean storage class; booleans go in as `0` / `1`.
///
/// # Errors
///
/// Returns `SqlOneLineError::SqliteError` if the index is out of range.
pub fn bind_sqlite_param(
    stmt: &mut Statement<'_>,
    index: usize,
    value: &SqlParam,
) -> Result<(), SqlOneLineError> {
    match value {
        SqlParam::Int(i) => stmt.raw_bind_parameter(index, *i),
        SqlParam::Long(l) => stmt.raw_bind_parameter(index, *l),
        SqlParam::Text(s) => stmt.raw_bind_parameter(index, s.as_str()),
        SqlParam::Bool(b) => stmt.raw_bind_parameter(index, *b),
        SqlParam::Null => stmt.raw_bind_parameter(index, Null),
    }
    .map_err(SqlOneLineError::SqliteError)
}
