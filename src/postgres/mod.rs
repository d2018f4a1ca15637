// PostgreSQL backend over the blocking `postgres` client:
// - config: connection options and connecting
// - params: `ToSql` for `SqlParam`
// - query: value extraction and the row cursor
// - connection: the `Connection` / `Statement` implementations

pub mod config;
pub mod connection;
pub mod params;
pub mod query;

pub use config::{PostgresOptions, PostgresOptionsBuilder};
pub use connection::{PostgresConnection, PostgresStatement};
pub use query::PostgresCursor;
