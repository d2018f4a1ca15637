// SQLite backend over rusqlite:
// - config: connection options and opening
// - params: binding `SqlParam` values onto raw statements
// - query: value extraction and the row cursor
// - connection: the `Connection` / `Statement` implementations

pub mod config;
pub mod connection;
pub mod params;
pub mod query;

pub use config::{SqliteOptions, SqliteOptionsBuilder};
pub use connection::{SqliteConnection, SqliteStatement};
pub use query::SqliteCursor;
