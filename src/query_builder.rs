//! INSERT / UPDATE text rendered from an ordered column list.

use crate::error::SqlOneLineError;
use crate::types::{QueryAndParams, SqlParam};

/// Ordered `(column, value)` pairs.
///
/// Rendering walks the pairs in insertion order, so the column list in the SQL
/// text and the bound values always line up.
/// ```rust
/// use sql_oneline::query_builder::{ColumnValues, render_insert};
///
/// let columns = ColumnValues::new().set("name", "Alex").set("age", 21);
/// let q = render_insert("users", &columns).unwrap();
/// assert_eq!(q.query, "INSERT INTO users(name,age) VALUES (?,?)");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnValues {
    entries: Vec<(String, SqlParam)>,
}

impl ColumnValues {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Append a pair, builder style.
    #[must_use]
    pub fn set(mut self, column: impl Into<String>, value: impl Into<SqlParam>) -> Self {
        self.push(column, value);
        self
    }

    pub fn push(&mut self, column: impl Into<String>, value: impl Into<SqlParam>) {
        self.entries.push((column.into(), value.into()));
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SqlParam)> {
        self.entries.iter().map(|(c, v)| (c.as_str(), v))
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(c, _)| c.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &SqlParam> {
        self.entries.iter().map(|(_, v)| v)
    }
}

impl<K, V> FromIterator<(K, V)> for ColumnValues
where
    K: Into<String>,
    V: Into<SqlParam>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut columns = ColumnValues::new();
        for (k, v) in iter {
            columns.push(k, v);
        }
        columns
    }
}

impl<K, V, const N: usize> From<[(K, V); N]> for ColumnValues
where
    K: Into<String>,
    V: Into<SqlParam>,
{
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}

fn require_columns(columns: &ColumnValues, table: &str) -> Result<(), SqlOneLineError> {
    if columns.is_empty() {
        return Err(SqlOneLineError::BuilderError(format!(
            "no columns given for table {table}"
        )));
    }
    Ok(())
}

/// `INSERT INTO <table>(<c1>,<c2>,...) VALUES (?,?,...)`
///
/// # Errors
///
/// Returns `SqlOneLineError::BuilderError` if `columns` is empty.
pub fn render_insert(table: &str, columns: &ColumnValues) -> Result<QueryAndParams, SqlOneLineError> {
    require_columns(columns, table)?;
    let names = columns.columns().collect::<Vec<_>>().join(",");
    let marks = vec!["?"; columns.len()].join(",");
    Ok(QueryAndParams {
        query: format!("INSERT INTO {table}({names}) VALUES ({marks})"),
        params: columns.values().cloned().collect(),
    })
}

/// `UPDATE <table> SET <c1>=?,<c2>=?,... WHERE <where_key>=?`
///
/// The values are the column values in order followed by `where_value`.
///
/// # Errors
///
/// Returns `SqlOneLineError::BuilderError` if `columns` is empty.
pub fn render_update(
    table: &str,
    columns: &ColumnValues,
    where_key: &str,
    where_value: impl Into<SqlParam>,
) -> Result<QueryAndParams, SqlOneLineError> {
    require_columns(columns, table)?;
    let assignments = columns
        .columns()
        .map(|c| format!("{c}=?"))
        .collect::<Vec<_>>()
        .join(",");
    let mut params: Vec<SqlParam> = Vec::with_capacity(columns.len() + 1);
    params.extend(columns.values().cloned());
    params.push(where_value.into());
    Ok(QueryAndParams {
        query: format!("UPDATE {table} SET {assignments} WHERE {where_key}=?"),
        params,
    })
}
