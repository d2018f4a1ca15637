use ::postgres::{Config as PgConfig, NoTls};
use serde::{Deserialize, Serialize};

use crate::error::SqlOneLineError;

use super::connection::PostgresConnection;

fn default_translation() -> bool {
    true
}

/// Options for opening a `PostgreSQL` connection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostgresOptions {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub dbname: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
    /// Rewrite `?` placeholders to `$N` before preparing.
    #[serde(default = "default_translation")]
    pub translate_placeholders: bool,
}

impl PostgresOptions {
    #[must_use]
    pub fn builder() -> PostgresOptionsBuilder {
        PostgresOptionsBuilder::default()
    }

    /// Check the required fields and turn them into a driver config.
    ///
    /// # Errors
    /// Returns `SqlOneLineError::ConfigError` if a required field is missing.
    pub fn to_pg_config(&self) -> Result<PgConfig, SqlOneLineError> {
        let host = required(self.host.as_ref(), "host")?;
        let port = self
            .port
            .ok_or_else(|| SqlOneLineError::ConfigError("port is required".to_string()))?;
        let dbname = required(self.dbname.as_ref(), "dbname")?;
        let user = required(self.user.as_ref(), "user")?;
        let password = required(self.password.as_ref(), "password")?;

        let mut config = PgConfig::new();
        config
            .host(host)
            .port(port)
            .dbname(dbname)
            .user(user)
            .password(password);
        Ok(config)
    }

    /// Connect without TLS.
    ///
    /// # Errors
    /// Returns `SqlOneLineError::ConfigError` if a required field is missing or
    /// `SqlOneLineError::ConnectionError` if the server cannot be reached.
    pub fn connect(&self) -> Result<PostgresConnection, SqlOneLineError> {
        let config = self.to_pg_config()?;
        let client = config.connect(NoTls).map_err(|e| {
            SqlOneLineError::ConnectionError(format!("Failed to connect to Postgres: {e}"))
        })?;
        tracing::debug!(host = ?self.host, dbname = ?self.dbname, "opened postgres connection");
        Ok(PostgresConnection::new(client).with_translation(self.translate_placeholders))
    }
}

fn required<'a>(value: Option<&'a String>, name: &str) -> Result<&'a str, SqlOneLineError> {
    value
        .map(String::as_str)
        .ok_or_else(|| SqlOneLineError::ConfigError(format!("{name} is required")))
}

/// Fluent builder for `PostgreSQL` options.
#[derive(Debug, Clone)]
pub struct PostgresOptionsBuilder {
    opts: PostgresOptions,
}

impl Default for PostgresOptionsBuilder {
    fn default() -> Self {
        Self {
            opts: PostgresOptions {
                translate_placeholders: true,
                ..PostgresOptions::default()
            },
        }
    }
}

impl PostgresOptionsBuilder {
    #[must_use]
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.opts.host = Some(host.into());
        self
    }

    #[must_use]
    pub fn port(mut self, port: u16) -> Self {
        self.opts.port = Some(port);
        self
    }

    #[must_use]
    pub fn dbname(mut self, dbname: impl Into<String>) -> Self {
        self.opts.dbname = Some(dbname.into());
        self
    }

    #[must_use]
    pub fn user(mut self, user: impl Into<String>) -> Self {
        self.opts.user = Some(user.into());
        self
    }

    #[must_use]
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.opts.password = Some(password.into());
        self
    }

    #[must_use]
    pub fn translation(mut self, translate_placeholders: bool) -> Self {
        self.opts.translate_placeholders = translate_placeholders;
        self
    }

    #[must_use]
    pub fn finish(self) -> PostgresOptions {
        self.opts
    }

    /// # Errors
    /// See [`PostgresOptions::connect`].
    pub fn connect(self) -> Result<PostgresConnection, SqlOneLineError> {
        self.finish().connect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_are_config_errors() {
        let opts = PostgresOptions::builder().host("localhost").port(5432).finish();
        match opts.to_pg_config() {
            Err(SqlOneLineError::ConfigError(msg)) => assert_eq!(msg, "dbname is required"),
            other => panic!("expected config error, got {other:?}"),
        }
    }

    #[test]
    fn builder_defaults_to_translation() {
        let opts = PostgresOptions::builder()
            .host("localhost")
            .port(5432)
            .dbname("app")
            .user("app")
            .password("secret")
            .finish();
        assert!(opts.translate_placeholders);
        assert!(opts.to_pg_config().is_ok());
    }
}
