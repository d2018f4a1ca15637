use std::fmt;

use ::postgres::types::ToSql;
use ::postgres::{Client, NoTls};

use crate::driver::{Connection, Statement};
use crate::error::SqlOneLineError;
use crate::translation::{
    PlaceholderStyle, contains_keyword, translate_placeholders, trim_statement_end,
};
use crate::types::{KeyRetrieval, SqlParam};

use super::query::PostgresCursor;

/// A `PostgreSQL` connection the one-line operations can run against.
///
/// `?` placeholders are rewritten to `$N` before preparing unless translation
/// is turned off.
pub struct PostgresConnection {
    client: Client,
    translate_placeholders: bool,
}

impl PostgresConnection {
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self {
            client,
            translate_placeholders: true,
        }
    }

    /// Connect with a libpq-style string or `postgres://` URL, without TLS.
    ///
    /// # Errors
    ///
    /// Returns `SqlOneLineError::PostgresError` if the connection fails.
    pub fn connect(params: &str) -> Result<Self, SqlOneLineError> {
        Ok(Self::new(Client::connect(params, NoTls)?))
    }

    #[must_use]
    pub fn with_translation(mut self, translate_placeholders: bool) -> Self {
        self.translate_placeholders = translate_placeholders;
        self
    }

    /// Run a multi-statement script without parameters.
    ///
    /// # Errors
    ///
    /// Returns `SqlOneLineError::PostgresError` if any statement fails.
    pub fn execute_batch(&mut self, sql: &str) -> Result<(), SqlOneLineError> {
        self.client
            .batch_execute(sql)
            .map_err(SqlOneLineError::PostgresError)
    }

    #[must_use]
    pub fn raw(&mut self) -> &mut Client {
        &mut self.client
    }

    #[must_use]
    pub fn into_inner(self) -> Client {
        self.client
    }
}

impl fmt::Debug for PostgresConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PostgresConnection")
            .field("closed", &self.client.is_closed())
            .field("translate_placeholders", &self.translate_placeholders)
            .finish_non_exhaustive()
    }
}

/// Statement text that returns the inserted rows: `sql` as is when it already
/// has a `RETURNING` clause, otherwise with ` RETURNING *` after its last token.
fn with_returning(sql: &str) -> String {
    if contains_keyword(sql, "returning") {
        sql.to_string()
    } else {
        format!("{} RETURNING *", trim_statement_end(sql))
    }
}

impl Connection for PostgresConnection {
    type Statement<'c> = PostgresStatement<'c>;

    fn prepare(
        &mut self,
        sql: &str,
        keys: KeyRetrieval,
    ) -> Result<PostgresStatement<'_>, SqlOneLineError> {
        let translated =
            translate_placeholders(sql, PlaceholderStyle::Postgres, self.translate_placeholders);
        let text = if keys == KeyRetrieval::Generated {
            with_returning(&translated)
        } else {
            translated.into_owned()
        };
        tracing::trace!(sql = %text, ?keys, "preparing postgres statement");
        let stmt = self.client.prepare(&text)?;
        let bindings = vec![None; stmt.params().len()];
        Ok(PostgresStatement {
            client: &mut self.client,
            stmt,
            bindings,
            keys,
            returned: None,
        })
    }
}

/// A prepared `PostgreSQL` statement. Bindings are collected and sent with the
/// execute message.
pub struct PostgresStatement<'c> {
    client: &'c mut Client,
    stmt: ::postgres::Statement,
    bindings: Vec<Option<SqlParam>>,
    keys: KeyRetrieval,
    returned: Option<Vec<::postgres::Row>>,
}

fn bound(bindings: &[Option<SqlParam>]) -> Result<Vec<&(dyn ToSql + Sync)>, SqlOneLineError> {
    bindings
        .iter()
        .enumerate()
        .map(|(i, slot)| {
            slot.as_ref()
                .map(|p| p as &(dyn ToSql + Sync))
                .ok_or_else(|| {
                    SqlOneLineError::ParameterError(format!("parameter ${} was not bound", i + 1))
                })
        })
        .collect()
}

impl Statement for PostgresStatement<'_> {
    type Cursor<'s>
        = PostgresCursor
    where
        Self: 's;

    fn placeholder_count(&self) -> Option<usize> {
        Some(self.bindings.len())
    }

    fn bind(&mut self, index: usize, value: &SqlParam) -> Result<(), SqlOneLineError> {
        let count = self.bindings.len();
        let slot = index
            .checked_sub(1)
            .and_then(|i| self.bindings.get_mut(i))
            .ok_or_else(|| {
                SqlOneLineError::ParameterError(format!(
                    "parameter index {index} out of range (statement takes {count})"
                ))
            })?;
        *slot = Some(value.clone());
        Ok(())
    }

    fn query(&mut self) -> Result<PostgresCursor, SqlOneLineError> {
        let params = bound(&self.bindings)?;
        let rows = self.client.query(&self.stmt, &params)?;
        Ok(PostgresCursor::new(rows))
    }

    fn execute_update(&mut self) -> Result<u64, SqlOneLineError> {
        let params = bound(&self.bindings)?;
        if self.keys == KeyRetrieval::Generated {
            let rows = self.client.query(&self.stmt, &params)?;
            let affected = rows.len() as u64;
            self.returned = Some(rows);
            Ok(affected)
        } else {
            Ok(self.client.execute(&self.stmt, &params)?)
        }
    }

    fn generated_keys(&mut self) -> Result<PostgresCursor, SqlOneLineError> {
        if self.keys != KeyRetrieval::Generated {
            return Err(SqlOneLineError::ExecutionError(
                "statement was not prepared for generated keys".to_string(),
            ));
        }
        self.returned.take().map(PostgresCursor::new).ok_or_else(|| {
            SqlOneLineError::ExecutionError(
                "generated keys requested before the statement ran".to_string(),
            )
        })
    }

    fn close(self) -> Result<(), SqlOneLineError> {
        // the client sends Close for the statement when the last handle drops
        drop(self.stmt);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn existing_returning_clause_is_kept() {
        let sql = "INSERT INTO t(a) VALUES ($1) RETURNING id";
        assert_eq!(with_returning(sql), sql);
        let sql = "insert into t(a) values ($1)\nreturning\tid";
        assert_eq!(with_returning(sql), sql);
    }

    #[test]
    fn returning_inside_literals_or_names_does_not_count() {
        assert_eq!(
            with_returning("INSERT INTO t(note) VALUES ('no returning here')"),
            "INSERT INTO t(note) VALUES ('no returning here') RETURNING *"
        );
        assert_eq!(
            with_returning("INSERT INTO returning_log(a) VALUES ($1)"),
            "INSERT INTO returning_log(a) VALUES ($1) RETURNING *"
        );
    }

    #[test]
    fn clause_lands_before_trailing_comment_and_semicolon() {
        assert_eq!(
            with_returning("INSERT INTO t(a) VALUES ($1) -- returning"),
            "INSERT INTO t(a) VALUES ($1) RETURNING *"
        );
        assert_eq!(
            with_returning("INSERT INTO t(a) VALUES ($1);\n"),
            "INSERT INTO t(a) VALUES ($1) RETURNING *"
        );
    }
}
