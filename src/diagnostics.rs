//! Where swallowed failures go.
//!
//! The default-returning operations never hand an error back, so every failure
//! they absorb is reported here along with the query text that triggered it.
//! Release-time failures are reported without a query.

use std::sync::{Arc, Mutex};

use crate::error::SqlOneLineError;

/// Receives every failure an operation absorbs.
pub trait Diagnostics {
    fn report(&self, error: &SqlOneLineError, query: Option<&str>);
}

impl<D: Diagnostics + ?Sized> Diagnostics for &D {
    fn report(&self, error: &SqlOneLineError, query: Option<&str>) {
        (**self).report(error, query);
    }
}

impl<D: Diagnostics + ?Sized> Diagnostics for Arc<D> {
    fn report(&self, error: &SqlOneLineError, query: Option<&str>) {
        (**self).report(error, query);
    }
}

/// Emits each report as a `tracing` error event.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingDiagnostics;

impl Diagnostics for TracingDiagnostics {
    fn report(&self, error: &SqlOneLineError, query: Option<&str>) {
        match query {
            Some(query) => tracing::error!(error = %error, query, "database operation failed"),
            None => tracing::error!(error = %error, "database resource release failed"),
        }
    }
}

/// One captured report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub message: String,
    pub query: Option<String>,
}

/// Keeps reports in memory so callers can inspect them.
#[derive(Debug, Default)]
pub struct MemoryDiagnostics {
    reports: Mutex<Vec<Report>>,
}

impl MemoryDiagnostics {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything reported so far.
    #[must_use]
    pub fn reports(&self) -> Vec<Report> {
        self.lock().clone()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Report>> {
        match self.reports.lock() {
            Ok(guard) => guard,
            // Clear the poison and continue with the recovered data
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl Diagnostics for MemoryDiagnostics {
    fn report(&self, error: &SqlOneLineError, query: Option<&str>) {
        self.lock().push(Report {
            message: error.to_string(),
            query: query.map(str::to_string),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_diagnostics_keeps_query_text() {
        let sink = MemoryDiagnostics::new();
        let shared: &dyn Diagnostics = &sink;
        shared.report(
            &SqlOneLineError::ExecutionError("boom".into()),
            Some("SELECT 1"),
        );
        shared.report(&SqlOneLineError::Other("close".into()), None);

        let reports = sink.reports();
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].query.as_deref(), Some("SELECT 1"));
        assert!(reports[0].message.contains("boom"));
        assert_eq!(reports[1].query, None);
    }
}
