#![cfg(feature = "sqlite")]

use sql_oneline::prelude::*;

fn users() -> Result<SqliteConnection, SqlOneLineError> {
    let mut conn = SqliteConnection::open_in_memory()?;
    conn.execute_batch(
        "CREATE TABLE users (user_id INTEGER PRIMARY KEY AUTOINCREMENT, name TEXT, age INTEGER);",
    )?;
    Ok(conn)
}

#[test]
fn insert_renders_columns_in_order() {
    let columns = ColumnValues::new().set("name", "Alex").set("age", 21);
    let q = render_insert("users", &columns).unwrap();
    assert_eq!(q.query, "INSERT INTO users(name,age) VALUES (?,?)");
    assert_eq!(q.params, params!["Alex", 21]);
}

#[test]
fn update_renders_where_value_last() {
    let columns = ColumnValues::new().set("age", 22);
    let q = render_update("users", &columns, "user_id", 1234).unwrap();
    assert_eq!(q.query, "UPDATE users SET age=? WHERE user_id=?");
    assert_eq!(q.params, params![22, 1234]);
}

#[test]
fn insert_and_update_round_through_sqlite() -> Result<(), SqlOneLineError> {
    let mut conn = users()?;

    let alex = ColumnValues::from([("user_id", SqlParam::Int(1234)), ("name", "Alex".into()), ("age", 21.into())]);
    assert!(insert(&mut conn, "users", &alex));
    assert_eq!(get_int(&mut conn, "SELECT age FROM users WHERE user_id=?", &params![1234]), 21);

    let older = ColumnValues::new().set("age", 22);
    assert_eq!(update(&mut conn, "users", &older, "user_id", 1234), 1);
    assert_eq!(get_int(&mut conn, "SELECT age FROM users WHERE user_id=?", &params![1234]), 22);

    assert_eq!(update(&mut conn, "users", &older, "user_id", 9999), 0);
    Ok(())
}

#[test]
fn builder_failures_are_reported() -> Result<(), SqlOneLineError> {
    let mut conn = users()?;
    let sink = MemoryDiagnostics::new();
    let one = OneLine::with_diagnostics(&sink);

    assert!(!one.insert(&mut conn, "users", &ColumnValues::new()));
    assert!(!one.insert(&mut conn, "users", &ColumnValues::new().set("missing_col", 1)));
    assert_eq!(one.update(&mut conn, "users", &ColumnValues::new(), "user_id", 1), -1);

    let reports = sink.reports();
    assert_eq!(reports.len(), 3);
    // empty column lists never reach the database, so there is no query text
    assert!(reports[0].query.is_none());
    assert_eq!(
        reports[1].query.as_deref(),
        Some("INSERT INTO users(missing_col) VALUES (?)")
    );

    let strict = OneLine::with_diagnostics(MemoryDiagnostics::new());
    assert!(matches!(
        strict.try_update(&mut conn, "users", &ColumnValues::new(), "user_id", 1),
        Err(SqlOneLineError::BuilderError(_))
    ));
    Ok(())
}
