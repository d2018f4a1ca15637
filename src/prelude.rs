//! Convenient imports for common functionality.
//!
//! This module re-exports the most commonly used types and functions
//! to make it easier to get started with the library.

#[cfg(any(feature = "sqlite", feature = "postgres"))]
pub use crate::config::ConnectionConfig;
pub use crate::diagnostics::{Diagnostics, MemoryDiagnostics, TracingDiagnostics};
pub use crate::driver::{Connection, Cursor, Statement};
pub use crate::oneline::{
    OneLine, execute, get_array_int, get_array_string, get_boolean, get_int, get_integer,
    get_long, get_string, insert, insert_auto_increment, try_execute, try_get_array_int,
    try_get_array_string, try_get_boolean, try_get_int, try_get_long, try_get_string,
    try_insert_auto_increment, update,
};
pub use crate::params;
pub use crate::query_builder::{ColumnValues, render_insert, render_update};
pub use crate::translation::{PlaceholderStyle, translate_placeholders};
pub use crate::{DatabaseType, KeyRetrieval, QueryAndParams, SqlOneLineError, SqlParam, SqlValue};

#[cfg(feature = "postgres")]
pub use crate::postgres::{PostgresConnection, PostgresOptions};
#[cfg(feature = "sqlite")]
pub use crate::sqlite::{SqliteConnection, SqliteOptions};
