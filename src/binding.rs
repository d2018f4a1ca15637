//! Positional parameter binding.

use crate::driver::Statement;
use crate::error::SqlOneLineError;
use crate::types::SqlParam;

/// Bind `params` onto `stmt`, the first parameter at index 1.
///
/// When the driver reports how many placeholders it parsed, the counts must
/// agree; a short or long list is rejected before anything is bound rather
/// than leaving positions silently unbound.
///
/// # Errors
///
/// Returns `SqlOneLineError::ParameterError` on a count mismatch, or whatever
/// the driver returns from [`Statement::bind`].
pub fn bind_params<S: Statement>(stmt: &mut S, params: &[SqlParam]) -> Result<(), SqlOneLineError> {
    if let Some(expected) = stmt.placeholder_count() {
        if expected != params.len() {
            return Err(SqlOneLineError::ParameterError(format!(
                "statement has {expected} placeholder(s) but {} parameter(s) were supplied",
                params.len()
            )));
        }
    }

    for (offset, param) in params.iter().enumerate() {
        stmt.bind(offset + 1, param)?;
    }
    Ok(())
}
