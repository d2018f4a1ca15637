use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::SqlOneLineError;

/// A value bound to one positional placeholder.
///
/// The set is closed: anything a statement can be bound with has a variant here,
/// so a parameter list can never carry a value the binder does not know how to
/// place.
/// ```rust
/// use sql_oneline::prelude::*;
///
/// let params = vec![
///     SqlParam::Text("Alex".into()),
///     SqlParam::Int(21),
///     SqlParam::Bool(true),
/// ];
/// assert_eq!(params, sql_oneline::params!["Alex", 21, true]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SqlParam {
    /// 32-bit integer
    Int(i32),
    /// 64-bit integer
    Long(i64),
    /// Text/string value
    Text(String),
    /// Boolean value
    Bool(bool),
    /// SQL NULL
    Null,
}

impl SqlParam {
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Short tag used in diagnostics and the CLI.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            SqlParam::Int(_) => "int",
            SqlParam::Long(_) => "long",
            SqlParam::Text(_) => "text",
            SqlParam::Bool(_) => "bool",
            SqlParam::Null => "null",
        }
    }
}

/// Parses `kind:value` as used on the command line: `int:21`, `long:1234`,
/// `text:Alex`, `bool:true`, or a bare `null`.
impl FromStr for SqlParam {
    type Err = SqlOneLineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("null") {
            return Ok(SqlParam::Null);
        }
        let (kind, raw) = s.split_once(':').ok_or_else(|| {
            SqlOneLineError::ParameterError(format!("expected kind:value, got {s:?}"))
        })?;
        let invalid = |e: &dyn std::fmt::Display| {
            SqlOneLineError::ParameterError(format!("invalid {kind} parameter {raw:?}: {e}"))
        };
        match kind {
            "int" => raw.parse().map(SqlParam::Int).map_err(|e| invalid(&e)),
            "long" => raw.parse().map(SqlParam::Long).map_err(|e| invalid(&e)),
            "bool" => raw.parse().map(SqlParam::Bool).map_err(|e| invalid(&e)),
            "text" => Ok(SqlParam::Text(raw.to_string())),
            other => Err(SqlOneLineError::ParameterError(format!(
                "unknown parameter kind {other:?} (expected int, long, text, bool or null)"
            ))),
        }
    }
}

impl From<i32> for SqlParam {
    fn from(value: i32) -> Self {
        SqlParam::Int(value)
    }
}

impl From<i64> for SqlParam {
    fn from(value: i64) -> Self {
        SqlParam::Long(value)
    }
}

impl From<bool> for SqlParam {
    fn from(value: bool) -> Self {
        SqlParam::Bool(value)
    }
}

impl From<&str> for SqlParam {
    fn from(value: &str) -> Self {
        SqlParam::Text(value.to_string())
    }
}

impl From<String> for SqlParam {
    fn from(value: String) -> Self {
        SqlParam::Text(value)
    }
}

impl<T: Into<SqlParam>> From<Option<T>> for SqlParam {
    fn from(value: Option<T>) -> Self {
        value.map_or(SqlParam::Null, Into::into)
    }
}

/// Build a `Vec<SqlParam>` from heterogeneous values.
///
/// ```rust
/// use sql_oneline::{params, SqlParam};
///
/// let p = params!["Alex", 21_i64];
/// assert_eq!(p, vec![SqlParam::Text("Alex".into()), SqlParam::Long(21)]);
/// let empty: Vec<SqlParam> = params![];
/// assert!(empty.is_empty());
/// ```
#[macro_export]
macro_rules! params {
    () => {
        ::std::vec::Vec::<$crate::SqlParam>::new()
    };
    ($($value:expr),+ $(,)?) => {
        ::std::vec![$($crate::SqlParam::from($value)),+]
    };
}

/// An owned column value read from the current row of a cursor.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Integer(i64),
    Real(f64),
    /// Exact decimal kept as its text form, e.g. `-12.500`.
    Decimal(String),
    Text(String),
    Bool(bool),
    Blob(Vec<u8>),
}

impl SqlValue {
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

/// Whether a statement is prepared so its generated keys can be read back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyRetrieval {
    #[default]
    None,
    Generated,
}

/// An immutable query text with its ordered parameter list.
///
/// The text carries one `?` per parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryAndParams {
    pub query: String,
    pub params: Vec<SqlParam>,
}

impl QueryAndParams {
    #[must_use]
    pub fn new(query: impl Into<String>, params: Vec<SqlParam>) -> Self {
        Self {
            query: query.into(),
            params,
        }
    }

    /// Number of `?` markers in the SQL itself; a `?` inside a literal,
    /// quoted name or comment is not a placeholder.
    #[must_use]
    pub fn placeholder_count(&self) -> usize {
        crate::translation::count_placeholders(&self.query)
    }
}

/// The database engines this crate ships a backend for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseType {
    /// `SQLite` database
    Sqlite,
    /// `PostgreSQL` database
    Postgres,
}
