use thiserror::Error;

/// The one error kind at the operation boundary: a failed database operation.
///
/// The strict `try_*` layer hands it back to the caller; the default-returning
/// layer reports it through [`Diagnostics`](crate::diagnostics::Diagnostics)
/// and substitutes the documented default.
#[derive(Debug, Error)]
pub enum SqlOneLineError {
    #[cfg(feature = "sqlite")]
    #[error(transparent)]
    SqliteError(#[from] rusqlite::Error),

    #[cfg(feature = "postgres")]
    #[error(transparent)]
    PostgresError(#[from] ::postgres::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Parameter binding error: {0}")]
    ParameterError(String),

    #[error("SQL execution error: {0}")]
    ExecutionError(String),

    #[error("Column conversion error: {0}")]
    ConversionError(String),

    #[error("Statement builder error: {0}")]
    BuilderError(String),

    #[error("Other database error: {0}")]
    Other(String),
}

impl From<serde_json::Error> for SqlOneLineError {
    fn from(err: serde_json::Error) -> Self {
        SqlOneLineError::ConfigError(format!("invalid connection config: {err}"))
    }
}
