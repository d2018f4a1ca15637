#![cfg(feature = "sqlite")]

use sql_oneline::prelude::*;

fn users() -> Result<SqliteConnection, SqlOneLineError> {
    let mut conn = SqliteConnection::open_in_memory()?;
    conn.execute_batch(
        "CREATE TABLE users (
            user_id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT,
            age INTEGER,
            active BOOLEAN,
            score BIGINT
        );
        INSERT INTO users (user_id, name, age, active, score) VALUES
            (1234, 'Alex', 21, 1, 9000000000),
            (1235, 'Sam', 33, 0, NULL),
            (1236, NULL, NULL, NULL, 5);",
    )?;
    Ok(conn)
}

#[test]
fn single_row_values_come_back_typed() -> Result<(), SqlOneLineError> {
    let mut conn = users()?;
    let by_id = "WHERE user_id=?";
    let id = params![1234];

    assert_eq!(get_int(&mut conn, &format!("SELECT age FROM users {by_id}"), &id), 21);
    assert_eq!(
        get_integer(&mut conn, &format!("SELECT age FROM users {by_id}"), &id),
        Some(21)
    );
    assert_eq!(
        get_long(&mut conn, &format!("SELECT score FROM users {by_id}"), &id),
        Some(9_000_000_000)
    );
    assert_eq!(
        get_string(&mut conn, &format!("SELECT name FROM users {by_id}"), &id).as_deref(),
        Some("Alex")
    );
    assert!(get_boolean(&mut conn, &format!("SELECT active FROM users {by_id}"), &id));
    assert!(!get_boolean(
        &mut conn,
        "SELECT active FROM users WHERE user_id=?",
        &params![1235]
    ));
    Ok(())
}

#[test]
fn zero_rows_give_defaults() -> Result<(), SqlOneLineError> {
    let mut conn = users()?;
    let missing = params![-1];

    assert!(!get_boolean(&mut conn, "SELECT active FROM users WHERE user_id=?", &missing));
    assert_eq!(get_int(&mut conn, "SELECT age FROM users WHERE user_id=?", &missing), 0);
    assert_eq!(get_integer(&mut conn, "SELECT age FROM users WHERE user_id=?", &missing), None);
    assert_eq!(get_long(&mut conn, "SELECT score FROM users WHERE user_id=?", &missing), None);
    assert_eq!(get_string(&mut conn, "SELECT name FROM users WHERE user_id=?", &missing), None);
    Ok(())
}

#[test]
fn null_column_reads_through_the_typed_getter() -> Result<(), SqlOneLineError> {
    let mut conn = users()?;
    let id = params![1236];

    assert_eq!(get_int(&mut conn, "SELECT age FROM users WHERE user_id=?", &id), 0);
    assert_eq!(get_integer(&mut conn, "SELECT age FROM users WHERE user_id=?", &id), Some(0));
    assert_eq!(get_string(&mut conn, "SELECT name FROM users WHERE user_id=?", &id), None);
    assert!(!get_boolean(&mut conn, "SELECT active FROM users WHERE user_id=?", &id));
    Ok(())
}

#[test]
fn only_the_first_row_is_read() -> Result<(), SqlOneLineError> {
    let mut conn = users()?;
    let age = get_int(
        &mut conn,
        "SELECT age FROM users WHERE age IS NOT NULL ORDER BY age DESC",
        &[],
    );
    assert_eq!(age, 33);
    Ok(())
}

#[test]
fn strict_layer_tells_no_row_from_failure() -> Result<(), SqlOneLineError> {
    let mut conn = users()?;

    assert_eq!(try_get_int(&mut conn, "SELECT age FROM users WHERE user_id=?", &params![1234])?, Some(21));
    assert_eq!(try_get_int(&mut conn, "SELECT age FROM users WHERE user_id=?", &params![-1])?, None);

    let err = try_get_int(&mut conn, "SELECT age FROM no_such_table", &[]).unwrap_err();
    assert!(matches!(err, SqlOneLineError::SqliteError(_)));

    let err = try_get_int(&mut conn, "SELECT name FROM users WHERE user_id=?", &params![1234])
        .unwrap_err();
    assert!(matches!(err, SqlOneLineError::ConversionError(_)));
    Ok(())
}

#[test]
fn failures_are_reported_with_the_query() -> Result<(), SqlOneLineError> {
    let mut conn = users()?;
    let sink = MemoryDiagnostics::new();
    let one = OneLine::with_diagnostics(&sink);

    let broken = "SELECT age FROM no_such_table WHERE user_id=?";
    assert_eq!(one.get_int(&mut conn, broken, &params![1234]), 0);
    assert_eq!(one.get_string(&mut conn, broken, &params![1234]), None);

    let reports = sink.reports();
    assert_eq!(reports.len(), 2);
    assert!(reports.iter().all(|r| r.query.as_deref() == Some(broken)));
    assert!(reports[0].message.contains("no_such_table"));

    // the connection is still usable afterwards
    assert_eq!(one.get_int(&mut conn, "SELECT age FROM users WHERE user_id=?", &params![1234]), 21);
    assert_eq!(sink.len(), 2);
    Ok(())
}
