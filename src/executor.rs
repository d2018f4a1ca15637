//! Statement execution and first-column projection.
//!
//! Every function here prepares one statement, binds the parameters, runs it
//! and projects column 1. The statement and any cursor it opens are closed on
//! every exit path; a failure while closing goes to `diagnostics` and never
//! replaces the primary outcome.

use crate::binding::bind_params;
use crate::diagnostics::Diagnostics;
use crate::driver::{Connection, Cursor, Statement};
use crate::error::SqlOneLineError;
use crate::results::FromColumn;
use crate::types::{KeyRetrieval, SqlParam};

/// Column 1 of the first row, or `None` when the query yields no rows.
///
/// # Errors
///
/// Returns `SqlOneLineError` if prepare, bind, execution, fetch or conversion fails.
pub fn select_first<C, T>(
    conn: &mut C,
    query: &str,
    params: &[SqlParam],
    diagnostics: &dyn Diagnostics,
) -> Result<Option<T>, SqlOneLineError>
where
    C: Connection,
    T: FromColumn,
{
    let stmt = conn.prepare(query, KeyRetrieval::None)?;
    with_statement(stmt, params, diagnostics, |stmt| {
        let cursor = stmt.query()?;
        with_cursor(cursor, diagnostics, first_row)
    })
}

/// Column 1 of every row, in row order.
///
/// # Errors
///
/// Returns `SqlOneLineError` if prepare, bind, execution, fetch or conversion fails.
pub fn select_column<C, T>(
    conn: &mut C,
    query: &str,
    params: &[SqlParam],
    diagnostics: &dyn Diagnostics,
) -> Result<Vec<T>, SqlOneLineError>
where
    C: Connection,
    T: FromColumn,
{
    let stmt = conn.prepare(query, KeyRetrieval::None)?;
    with_statement(stmt, params, diagnostics, |stmt| {
        let cursor = stmt.query()?;
        with_cursor(cursor, diagnostics, all_rows)
    })
}

/// Run a DML statement and return the affected row count.
///
/// # Errors
///
/// Returns `SqlOneLineError` if prepare, bind or execution fails.
pub fn execute_dml<C: Connection>(
    conn: &mut C,
    query: &str,
    params: &[SqlParam],
    diagnostics: &dyn Diagnostics,
) -> Result<u64, SqlOneLineError> {
    let stmt = conn.prepare(query, KeyRetrieval::None)?;
    with_statement(stmt, params, diagnostics, Statement::execute_update)
}

/// Run an INSERT and return the first generated key, `None` if the driver
/// produced none.
///
/// # Errors
///
/// Returns `SqlOneLineError` if prepare, bind, execution or key retrieval fails.
pub fn execute_insert_key<C: Connection>(
    conn: &mut C,
    query: &str,
    params: &[SqlParam],
    diagnostics: &dyn Diagnostics,
) -> Result<Option<i64>, SqlOneLineError> {
    let stmt = conn.prepare(query, KeyRetrieval::Generated)?;
    with_statement(stmt, params, diagnostics, |stmt| {
        stmt.execute_update()?;
        let keys = stmt.generated_keys()?;
        with_cursor(keys, diagnostics, first_row)
    })
}

fn with_statement<S, T, F>(
    mut stmt: S,
    params: &[SqlParam],
    diagnostics: &dyn Diagnostics,
    body: F,
) -> Result<T, SqlOneLineError>
where
    S: Statement,
    F: FnOnce(&mut S) -> Result<T, SqlOneLineError>,
{
    let outcome = bind_params(&mut stmt, params).and_then(|()| body(&mut stmt));
    if let Err(err) = stmt.close() {
        diagnostics.report(&err, None);
    }
    outcome
}

fn with_cursor<K, T, F>(
    mut cursor: K,
    diagnostics: &dyn Diagnostics,
    body: F,
) -> Result<T, SqlOneLineError>
where
    K: Cursor,
    F: FnOnce(&mut K) -> Result<T, SqlOneLineError>,
{
    let outcome = body(&mut cursor);
    if let Err(err) = cursor.close() {
        diagnostics.report(&err, None);
    }
    outcome
}

fn first_row<K: Cursor, T: FromColumn>(cursor: &mut K) -> Result<Option<T>, SqlOneLineError> {
    cursor.rewind()?;
    if !cursor.advance()? {
        return Ok(None);
    }
    T::from_column(cursor.column(1)?).map(Some)
}

fn all_rows<K: Cursor, T: FromColumn>(cursor: &mut K) -> Result<Vec<T>, SqlOneLineError> {
    cursor.rewind()?;
    let mut values = Vec::new();
    while cursor.advance()? {
        values.push(T::from_column(cursor.column(1)?)?);
    }
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::MemoryDiagnostics;
    use crate::test_utils::{FailStage, ScriptedConnection};
    use crate::types::SqlValue;

    #[test]
    fn select_first_reads_only_the_first_row() {
        let mut conn = ScriptedConnection::new().with_rows(vec![
            vec![SqlValue::Integer(21), SqlValue::Text("ignored".into())],
            vec![SqlValue::Integer(33)],
        ]);
        let sink = MemoryDiagnostics::new();
        let age: Option<i32> = select_first(
            &mut conn,
            "SELECT age FROM users WHERE user_id=?",
            &crate::params![1234],
            &sink,
        )
        .unwrap();
        assert_eq!(age, Some(21));
        assert!(sink.is_empty());
        assert_eq!(conn.open_statements(), 0);
        assert_eq!(conn.open_cursors(), 0);
    }

    #[test]
    fn close_failure_is_reported_without_masking_result() {
        let mut conn = ScriptedConnection::new()
            .with_rows(vec![vec![SqlValue::Text("Alex".into())]])
            .failing_at(FailStage::Close);
        let sink = MemoryDiagnostics::new();
        let name: Option<Option<String>> =
            select_first(&mut conn, "SELECT name FROM users", &[], &sink).unwrap();
        assert_eq!(name, Some(Some("Alex".to_string())));
        // cursor and statement each fail to close
        assert_eq!(sink.len(), 2);
        assert!(sink.reports().iter().all(|r| r.query.is_none()));
        assert_eq!(conn.open_statements(), 0);
    }

    #[test]
    fn insert_key_reads_generated_cursor() {
        let mut conn = ScriptedConnection::new().with_affected(1).with_generated_key(Some(77));
        let sink = MemoryDiagnostics::new();
        let key = execute_insert_key(
            &mut conn,
            "INSERT INTO users(name,age) VALUES (?,?)",
            &crate::params!["Alex", 21],
            &sink,
        )
        .unwrap();
        assert_eq!(key, Some(77));
        assert_eq!(conn.prepared_with(), vec![KeyRetrieval::Generated]);
    }
}
