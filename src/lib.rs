//! One-line query helpers over `rusqlite` and `postgres`.
//!
//! Bind an ordered parameter list onto a prepared statement, run it, and read
//! back column 1 as a scalar, a column of values, an affected row count or a
//! generated key, in one call:
//!
//! ```rust
//! # #[cfg(feature = "sqlite")] {
//! use sql_oneline::prelude::*;
//!
//! let mut conn = SqliteConnection::open_in_memory()?;
//! conn.execute_batch(
//!     "CREATE TABLE users (user_id INTEGER PRIMARY KEY AUTOINCREMENT, name TEXT, age INTEGER);",
//! )?;
//!
//! let id = insert_auto_increment(
//!     &mut conn,
//!     "INSERT INTO users(name,age) VALUES (?,?)",
//!     &params!["Alex", 21],
//! );
//! assert_eq!(get_int(&mut conn, "SELECT age FROM users WHERE user_id=?", &params![id]), 21);
//!
//! let changed = update(&mut conn, "users", &ColumnValues::new().set("age", 22), "user_id", id);
//! assert_eq!(changed, 1);
//! # }
//! # Ok::<(), sql_oneline::SqlOneLineError>(())
//! ```
//!
//! The plain functions never fail: errors are reported through
//! [`Diagnostics`](diagnostics::Diagnostics) and a default comes back. The
//! `try_*` functions return `Result` instead.

pub mod binding;
#[cfg(any(feature = "sqlite", feature = "postgres"))]
pub mod config;
pub mod diagnostics;
pub mod driver;
pub mod error;
pub mod executor;
pub mod oneline;
pub mod prelude;
pub mod query_builder;
pub mod results;
pub mod translation;
pub mod types;

#[cfg(feature = "postgres")]
pub mod postgres;
#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use error::SqlOneLineError;
pub use oneline::{
    OneLine, execute, get_array_int, get_array_string, get_boolean, get_int, get_integer,
    get_long, get_string, insert, insert_auto_increment, try_execute, try_get_array_int,
    try_get_array_string, try_get_boolean, try_get_int, try_get_long, try_get_string,
    try_insert_auto_increment, update,
};
pub use types::{DatabaseType, KeyRetrieval, QueryAndParams, SqlParam, SqlValue};
