use rusqlite::Rows;
use rusqlite::types::ValueRef;

use crate::driver::Cursor;
use crate::error::SqlOneLineError;
use crate::types::SqlValue;

/// Extract a `SqlValue` from a `SQLite` row (0-based `idx`).
///
/// # Errors
///
/// Returns `SqlOneLineError` if the column cannot be read.
pub fn sqlite_extract_value(row: &rusqlite::Row, idx: usize) -> Result<SqlValue, SqlOneLineError> {
    let value = row.get_ref(idx).map_err(SqlOneLineError::SqliteError)?;
    Ok(match value {
        ValueRef::Null => SqlValue::Null,
        ValueRef::Integer(i) => SqlValue::Integer(i),
        ValueRef::Real(f) => SqlValue::Real(f),
        ValueRef::Text(t) => SqlValue::Text(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(b) => SqlValue::Blob(b.to_vec()),
    })
}

enum Source<'s> {
    /// Rows stepped straight off the statement; forward-only.
    Streaming(Rows<'s>),
    /// Rows already in memory, e.g. a generated key.
    Buffered(Vec<Vec<SqlValue>>),
}

/// Cursor over a `SQLite` statement's rows.
///
/// The current row is copied out when the cursor advances, so column reads
/// need no borrow of the statement.
pub struct SqliteCursor<'s> {
    source: Source<'s>,
    column_count: usize,
    current: Option<Vec<SqlValue>>,
    /// Rows stepped past so far.
    read: usize,
}

impl<'s> SqliteCursor<'s> {
    pub(crate) fn streaming(rows: Rows<'s>, column_count: usize) -> Self {
        Self {
            source: Source::Streaming(rows),
            column_count,
            current: None,
            read: 0,
        }
    }

    pub(crate) fn buffered(rows: Vec<Vec<SqlValue>>) -> Self {
        let column_count = rows.first().map_or(0, Vec::len);
        Self {
            source: Source::Buffered(rows),
            column_count,
            current: None,
            read: 0,
        }
    }
}

impl Cursor for SqliteCursor<'_> {
    fn rewind(&mut self) -> Result<(), SqlOneLineError> {
        match self.source {
            Source::Buffered(_) => {}
            Source::Streaming(_) if self.read == 0 => {}
            Source::Streaming(_) => {
                return Err(SqlOneLineError::ExecutionError(
                    "SQLite cursors are forward-only; cannot rewind after reading rows".to_string(),
                ));
            }
        }
        self.current = None;
        self.read = 0;
        Ok(())
    }

    fn advance(&mut self) -> Result<bool, SqlOneLineError> {
        let next = match &mut self.source {
            Source::Streaming(rows) => match rows.next()? {
                Some(row) => {
                    let mut values = Vec::with_capacity(self.column_count);
                    for i in 0..self.column_count {
                        values.push(sqlite_extract_value(row, i)?);
                    }
                    Some(values)
                }
                None => None,
            },
            Source::Buffered(rows) => rows.get(self.read).cloned(),
        };
        let found = next.is_some();
        if found {
            self.read += 1;
        }
        self.current = next;
        Ok(found)
    }

    fn column(&self, index: usize) -> Result<SqlValue, SqlOneLineError> {
        let row = self.current.as_ref().ok_or_else(|| {
            SqlOneLineError::ExecutionError("cursor is not positioned on a row".to_string())
        })?;
        index
            .checked_sub(1)
            .and_then(|i| row.get(i))
            .cloned()
            .ok_or_else(|| {
                SqlOneLineError::ExecutionError(format!(
                    "column {index} out of range (row has {} columns)",
                    row.len()
                ))
            })
    }

    fn close(self) -> Result<(), SqlOneLineError> {
        // Dropping `Rows` resets the underlying statement.
        drop(self);
        Ok(())
    }
}
