//! An in-memory driver for exercising the executor without a database.
//!
//! [`ScriptedConnection`] serves canned rows, affected counts and generated
//! keys, can fail at a chosen stage, and caps how many statements and cursors
//! may be open at once. Handles are released only by an explicit `close`, so
//! a code path that forgets to close shows up as a leak in
//! [`ScriptedConnection::open_statements`] / [`ScriptedConnection::open_cursors`]
//! and eventually as exhaustion.

use std::cell::{Cell, RefCell};

use crate::driver::{Connection, Cursor, Statement};
use crate::error::SqlOneLineError;
use crate::translation::count_placeholders;
use crate::types::{KeyRetrieval, SqlParam, SqlValue};

/// Where a [`ScriptedConnection`] should fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailStage {
    Prepare,
    Bind,
    Execute,
    Fetch,
    Close,
}

/// Message used when the open-handle cap is hit.
pub const EXHAUSTED: &str = "scripted driver exhausted its open handles";

#[derive(Debug)]
pub struct ScriptedConnection {
    rows: Vec<Vec<SqlValue>>,
    affected: u64,
    generated_key: Option<i64>,
    fail_at: Option<FailStage>,
    max_open: usize,
    open_statements: Cell<usize>,
    open_cursors: Cell<usize>,
    bound: RefCell<Vec<(usize, SqlParam)>>,
    prepared: RefCell<Vec<(String, KeyRetrieval)>>,
}

impl Default for ScriptedConnection {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedConnection {
    #[must_use]
    pub fn new() -> Self {
        Self {
            rows: Vec::new(),
            affected: 0,
            generated_key: None,
            fail_at: None,
            max_open: 4,
            open_statements: Cell::new(0),
            open_cursors: Cell::new(0),
            bound: RefCell::new(Vec::new()),
            prepared: RefCell::new(Vec::new()),
        }
    }

    #[must_use]
    pub fn with_rows(mut self, rows: Vec<Vec<SqlValue>>) -> Self {
        self.rows = rows;
        self
    }

    #[must_use]
    pub fn with_affected(mut self, affected: u64) -> Self {
        self.affected = affected;
        self
    }

    #[must_use]
    pub fn with_generated_key(mut self, key: Option<i64>) -> Self {
        self.generated_key = key;
        self
    }

    #[must_use]
    pub fn failing_at(mut self, stage: FailStage) -> Self {
        self.fail_at = Some(stage);
        self
    }

    #[must_use]
    pub fn with_max_open(mut self, max_open: usize) -> Self {
        self.max_open = max_open;
        self
    }

    #[must_use]
    pub fn open_statements(&self) -> usize {
        self.open_statements.get()
    }

    #[must_use]
    pub fn open_cursors(&self) -> usize {
        self.open_cursors.get()
    }

    /// Every `(index, value)` bound so far, across statements.
    #[must_use]
    pub fn bound(&self) -> Vec<(usize, SqlParam)> {
        self.bound.borrow().clone()
    }

    /// SQL text of every prepared statement, in order.
    #[must_use]
    pub fn prepared(&self) -> Vec<String> {
        self.prepared.borrow().iter().map(|(sql, _)| sql.clone()).collect()
    }

    #[must_use]
    pub fn prepared_with(&self) -> Vec<KeyRetrieval> {
        self.prepared.borrow().iter().map(|(_, keys)| *keys).collect()
    }

    fn fails_at(&self, stage: FailStage) -> Result<(), SqlOneLineError> {
        if self.fail_at == Some(stage) {
            Err(SqlOneLineError::ExecutionError(format!(
                "scripted failure at {stage:?}"
            )))
        } else {
            Ok(())
        }
    }

    fn acquire(&self, counter: &Cell<usize>) -> Result<(), SqlOneLineError> {
        if counter.get() >= self.max_open {
            return Err(SqlOneLineError::Other(EXHAUSTED.to_string()));
        }
        counter.set(counter.get() + 1);
        Ok(())
    }

    fn cursor(&self, rows: Vec<Vec<SqlValue>>) -> Result<ScriptedCursor<'_>, SqlOneLineError> {
        self.acquire(&self.open_cursors)?;
        Ok(ScriptedCursor {
            conn: self,
            rows,
            position: None,
        })
    }
}

impl Connection for ScriptedConnection {
    type Statement<'c> = ScriptedStatement<'c>;

    fn prepare(
        &mut self,
        sql: &str,
        keys: KeyRetrieval,
    ) -> Result<ScriptedStatement<'_>, SqlOneLineError> {
        self.fails_at(FailStage::Prepare)?;
        self.acquire(&self.open_statements)?;
        self.prepared.borrow_mut().push((sql.to_string(), keys));
        Ok(ScriptedStatement {
            conn: self,
            placeholders: count_placeholders(sql),
            keys,
            executed: false,
        })
    }
}

#[derive(Debug)]
pub struct ScriptedStatement<'c> {
    conn: &'c ScriptedConnection,
    placeholders: usize,
    keys: KeyRetrieval,
    executed: bool,
}

impl Statement for ScriptedStatement<'_> {
    type Cursor<'s>
        = ScriptedCursor<'s>
    where
        Self: 's;

    fn placeholder_count(&self) -> Option<usize> {
        Some(self.placeholders)
    }

    fn bind(&mut self, index: usize, value: &SqlParam) -> Result<(), SqlOneLineError> {
        self.conn.fails_at(FailStage::Bind)?;
        self.conn.bound.borrow_mut().push((index, value.clone()));
        Ok(())
    }

    fn query(&mut self) -> Result<ScriptedCursor<'_>, SqlOneLineError> {
        self.conn.fails_at(FailStage::Execute)?;
        self.conn.cursor(self.conn.rows.clone())
    }

    fn execute_update(&mut self) -> Result<u64, SqlOneLineError> {
        self.conn.fails_at(FailStage::Execute)?;
        self.executed = true;
        Ok(self.conn.affected)
    }

    fn generated_keys(&mut self) -> Result<ScriptedCursor<'_>, SqlOneLineError> {
        if self.keys != KeyRetrieval::Generated || !self.executed {
            return Err(SqlOneLineError::ExecutionError(
                "no generated keys available".to_string(),
            ));
        }
        self.conn.fails_at(FailStage::Fetch)?;
        let rows = self
            .conn
            .generated_key
            .map(|key| vec![vec![SqlValue::Integer(key)]])
            .unwrap_or_default();
        self.conn.cursor(rows)
    }

    fn close(self) -> Result<(), SqlOneLineError> {
        let open = &self.conn.open_statements;
        open.set(open.get().saturating_sub(1));
        self.conn.fails_at(FailStage::Close)
    }
}

#[derive(Debug)]
pub struct ScriptedCursor<'c> {
    conn: &'c ScriptedConnection,
    rows: Vec<Vec<SqlValue>>,
    position: Option<usize>,
}

impl Cursor for ScriptedCursor<'_> {
    fn rewind(&mut self) -> Result<(), SqlOneLineError> {
        self.position = None;
        Ok(())
    }

    fn advance(&mut self) -> Result<bool, SqlOneLineError> {
        self.conn.fails_at(FailStage::Fetch)?;
        let next = self.position.map_or(0, |p| p + 1);
        self.position = Some(next.min(self.rows.len()));
        Ok(next < self.rows.len())
    }

    fn column(&self, index: usize) -> Result<SqlValue, SqlOneLineError> {
        let row = self
            .position
            .and_then(|p| self.rows.get(p))
            .ok_or_else(|| SqlOneLineError::ExecutionError("no current row".to_string()))?;
        index
            .checked_sub(1)
            .and_then(|i| row.get(i))
            .cloned()
            .ok_or_else(|| {
                SqlOneLineError::ExecutionError(format!("column {index} out of range"))
            })
    }

    fn close(self) -> Result<(), SqlOneLineError> {
        let open = &self.conn.open_cursors;
        open.set(open.get().saturating_sub(1));
        self.conn.fails_at(FailStage::Close)
    }
}

fn gcd(mut a: usize, mut b: usize) -> usize {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

/// Ids `1..=row_count`, each exactly once, in a fixed non-sequential order.
///
/// Steps through the ids with the first stride from 7919 up that is coprime
/// to `row_count`.
#[must_use]
pub fn scattered_ids(row_count: usize) -> Vec<i64> {
    if row_count == 0 {
        return Vec::new();
    }
    let stride = (7919..)
        .find(|s| gcd(*s, row_count) == 1)
        .unwrap_or(1);
    (0..row_count)
        .map(|i| {
            let id = i.wrapping_mul(stride % row_count) % row_count + 1;
            i64::try_from(id).unwrap_or(i64::MAX)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_permutation(ids: &[i64], row_count: usize) -> bool {
        let mut sorted = ids.to_vec();
        sorted.sort_unstable();
        sorted.into_iter().eq((1..=row_count).map(|n| i64::try_from(n).unwrap()))
    }

    #[test]
    fn scattered_ids_visit_each_row_once() {
        for row_count in [1, 2, 1000, 7919, 2 * 7919, 7920] {
            let ids = scattered_ids(row_count);
            assert!(is_permutation(&ids, row_count), "row_count {row_count}");
        }
        assert!(scattered_ids(0).is_empty());
    }

    #[test]
    fn scattered_ids_are_not_sequential() {
        assert_ne!(scattered_ids(1000)[..3], [1, 2, 3]);
    }
}
