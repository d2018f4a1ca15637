#![cfg(feature = "postgres")]

//! Runs against a live server only when `SQL_ONELINE_PG_URL` is set, e.g.
//! `SQL_ONELINE_PG_URL="host=localhost user=testuser dbname=testing"`.

use std::env;

use sql_oneline::prelude::*;

fn connect(table: &str) -> Result<Option<PostgresConnection>, SqlOneLineError> {
    let Ok(url) = env::var("SQL_ONELINE_PG_URL") else {
        eprintln!("SQL_ONELINE_PG_URL not set; skipping");
        return Ok(None);
    };
    let mut conn = PostgresConnection::connect(&url)?;
    conn.execute_batch(&format!(
        "DROP TABLE IF EXISTS {table};
         CREATE TABLE {table} (user_id BIGSERIAL PRIMARY KEY, name TEXT, age INT, active BOOLEAN);"
    ))?;
    Ok(Some(conn))
}

#[test]
fn scalars_sequences_and_dml() -> Result<(), SqlOneLineError> {
    let table = "oneline_users_scalars";
    let Some(mut conn) = connect(table)? else {
        return Ok(());
    };

    let insert_q = format!("INSERT INTO {table}(name,age,active) VALUES (?,?,?)");
    assert_eq!(execute(&mut conn, &insert_q, &params!["Alex", 21, true]), 1);
    assert_eq!(execute(&mut conn, &insert_q, &params!["Sam", 21, false]), 1);
    let missing: Option<&str> = None;
    assert_eq!(execute(&mut conn, &insert_q, &params![missing, 40, missing]), 1);

    assert_eq!(
        get_int(&mut conn, &format!("SELECT age FROM {table} WHERE name=?"), &params!["Alex"]),
        21
    );
    assert!(get_boolean(
        &mut conn,
        &format!("SELECT active FROM {table} WHERE name=?"),
        &params!["Alex"]
    ));
    assert_eq!(
        get_array_string(
            &mut conn,
            &format!("SELECT name FROM {table} ORDER BY user_id"),
            &[]
        ),
        vec![Some("Alex".to_string()), Some("Sam".to_string()), None]
    );
    assert_eq!(
        get_long(&mut conn, &format!("SELECT COUNT(*) FROM {table}"), &[]),
        Some(3)
    );
    assert_eq!(
        execute(&mut conn, &format!("UPDATE {table} SET age=? WHERE age=?"), &params![22, 21]),
        2
    );

    conn.execute_batch(&format!("DROP TABLE IF EXISTS {table};"))?;
    Ok(())
}

#[test]
fn generated_keys_and_builder() -> Result<(), SqlOneLineError> {
    let table = "oneline_users_keys";
    let Some(mut conn) = connect(table)? else {
        return Ok(());
    };

    let q = format!("INSERT INTO {table}(name,age) VALUES (?,?)");
    let first = insert_auto_increment(&mut conn, &q, &params!["Alex", 21]);
    let second = insert_auto_increment(&mut conn, &q, &params!["Sam", 33]);
    assert!(first > 0);
    assert_eq!(second, first + 1);

    let older = ColumnValues::new().set("age", 22);
    assert_eq!(update(&mut conn, table, &older, "user_id", first), 1);
    assert_eq!(
        get_integer(&mut conn, &format!("SELECT age FROM {table} WHERE user_id=?"), &params![first]),
        Some(22)
    );

    let sink = MemoryDiagnostics::new();
    let one = OneLine::with_diagnostics(&sink);
    assert_eq!(one.insert_auto_increment(&mut conn, "INSERT INTO no_such_table(a) VALUES (?)", &params![1]), 0);
    assert_eq!(sink.len(), 1);

    conn.execute_batch(&format!("DROP TABLE IF EXISTS {table};"))?;
    Ok(())
}

#[test]
fn numeric_and_timestamp_columns_are_read() -> Result<(), SqlOneLineError> {
    let table = "oneline_users_numeric";
    let Some(mut conn) = connect(table)? else {
        return Ok(());
    };

    let insert_q = format!("INSERT INTO {table}(name,age) VALUES (?,?)");
    assert_eq!(execute(&mut conn, &insert_q, &params!["Alex", 21]), 1);
    assert_eq!(execute(&mut conn, &insert_q, &params!["Sam", 22]), 1);

    // avg over INT is numeric: 21.5000000000000000
    assert_eq!(get_int(&mut conn, &format!("SELECT avg(age) FROM {table}"), &[]), 21);
    assert_eq!(
        get_string(&mut conn, "SELECT 12.50::numeric", &[]).as_deref(),
        Some("12.50")
    );
    assert_eq!(
        get_string(&mut conn, "SELECT -0.05::numeric(6,3)", &[]).as_deref(),
        Some("-0.050")
    );
    assert_eq!(
        get_string(&mut conn, "SELECT TIMESTAMP '2024-01-02 03:04:05'", &[]).as_deref(),
        Some("2024-01-02 03:04:05")
    );
    assert_eq!(
        get_string(&mut conn, "SELECT DATE '2024-02-29'", &[]).as_deref(),
        Some("2024-02-29")
    );

    let err = OneLine::new()
        .try_get_string(&mut conn, "SELECT point(1,2)", &[])
        .unwrap_err();
    assert!(matches!(err, SqlOneLineError::ConversionError(ref m) if m.contains("point")));

    conn.execute_batch(&format!("DROP TABLE IF EXISTS {table};"))?;
    Ok(())
}
