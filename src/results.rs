//! Converting a cursor's column value into the requested Rust type.
//!
//! The rules mirror the lenient typed getters of row-cursor APIs: numbers read
//! from text are parsed, booleans read from integers compare against zero, and
//! a NULL read through a numeric or boolean getter yields zero / `false`.

use crate::error::SqlOneLineError;
use crate::types::SqlValue;

/// A type a column value can be projected into.
pub trait FromColumn: Sized {
    /// Convert one column value.
    ///
    /// # Errors
    ///
    /// Returns `SqlOneLineError::ConversionError` when the value has no
    /// sensible reading as `Self`.
    fn from_column(value: SqlValue) -> Result<Self, SqlOneLineError>;
}

fn conversion_error(value: &SqlValue, target: &str) -> SqlOneLineError {
    SqlOneLineError::ConversionError(format!("cannot read {value:?} as {target}"))
}

/// Integer part of a decimal string, dropping the fraction like a cast toward zero.
fn truncate_decimal(decimal: &str) -> Option<i64> {
    let whole = decimal.split('.').next()?;
    match whole {
        "" | "-" | "+" => Some(0),
        _ => whole.parse().ok(),
    }
}

impl FromColumn for bool {
    fn from_column(value: SqlValue) -> Result<Self, SqlOneLineError> {
        match value {
            SqlValue::Null => Ok(false),
            SqlValue::Bool(b) => Ok(b),
            SqlValue::Integer(i) => Ok(i != 0),
            SqlValue::Real(f) => Ok(f != 0.0),
            SqlValue::Decimal(ref d) => d
                .parse::<f64>()
                .map(|f| f != 0.0)
                .map_err(|_| conversion_error(&value, "bool")),
            SqlValue::Text(ref s) => {
                let trimmed = s.trim();
                if trimmed == "1" || trimmed.eq_ignore_ascii_case("true") {
                    Ok(true)
                } else if trimmed == "0" || trimmed.eq_ignore_ascii_case("false") {
                    Ok(false)
                } else {
                    Err(conversion_error(&value, "bool"))
                }
            }
            SqlValue::Blob(_) => Err(conversion_error(&value, "bool")),
        }
    }
}

impl FromColumn for i64 {
    fn from_column(value: SqlValue) -> Result<Self, SqlOneLineError> {
        match value {
            SqlValue::Null => Ok(0),
            SqlValue::Integer(i) => Ok(i),
            SqlValue::Bool(b) => Ok(i64::from(b)),
            #[allow(clippy::cast_possible_truncation)]
            SqlValue::Real(f) if f.is_finite() => Ok(f.trunc() as i64),
            SqlValue::Decimal(ref d) => truncate_decimal(d).ok_or_else(|| conversion_error(&value, "i64")),
            SqlValue::Text(ref s) => s
                .trim()
                .parse::<i64>()
                .map_err(|_| conversion_error(&value, "i64")),
            _ => Err(conversion_error(&value, "i64")),
        }
    }
}

impl FromColumn for i32 {
    fn from_column(value: SqlValue) -> Result<Self, SqlOneLineError> {
        let described = format!("{value:?}");
        let wide = i64::from_column(value)?;
        i32::try_from(wide).map_err(|_| {
            SqlOneLineError::ConversionError(format!("{described} is out of range for i32"))
        })
    }
}

impl FromColumn for Option<String> {
    fn from_column(value: SqlValue) -> Result<Self, SqlOneLineError> {
        Ok(match value {
            SqlValue::Null => None,
            SqlValue::Text(s) => Some(s),
            SqlValue::Integer(i) => Some(i.to_string()),
            SqlValue::Real(f) => Some(f.to_string()),
            SqlValue::Decimal(d) => Some(d),
            SqlValue::Bool(b) => Some(b.to_string()),
            SqlValue::Blob(bytes) => Some(String::from_utf8_lossy(&bytes).into_owned()),
        })
    }
}

impl FromColumn for SqlValue {
    fn from_column(value: SqlValue) -> Result<Self, SqlOneLineError> {
        Ok(value)
    }
}
