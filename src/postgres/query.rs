use std::error::Error;

use ::postgres::Row;
use ::postgres::types::{FromSql, Type};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde_json::Value;

use crate::driver::Cursor;
use crate::error::SqlOneLineError;
use crate::types::SqlValue;

/// `numeric` read from its binary wire form into decimal text.
struct NumericText(String);

impl<'a> FromSql<'a> for NumericText {
    fn from_sql(_ty: &Type, raw: &'a [u8]) -> Result<Self, Box<dyn Error + Sync + Send>> {
        decode_numeric(raw).map(NumericText)
    }

    fn accepts(ty: &Type) -> bool {
        *ty == Type::NUMERIC
    }
}

fn be_u16(raw: &[u8], at: usize) -> Result<u16, Box<dyn Error + Sync + Send>> {
    raw.get(at..at + 2)
        .map(|b| u16::from_be_bytes([b[0], b[1]]))
        .ok_or_else(|| "truncated numeric value".into())
}

/// Header is ndigits, weight, sign, dscale (all 16-bit), then `ndigits`
/// base-10000 digits; the first digit is worth `10000^weight`.
fn decode_numeric(raw: &[u8]) -> Result<String, Box<dyn Error + Sync + Send>> {
    const NEGATIVE: u16 = 0x4000;
    const NAN: u16 = 0xC000;
    const POS_INFINITY: u16 = 0xD000;
    const NEG_INFINITY: u16 = 0xF000;

    let ndigits = usize::from(be_u16(raw, 0)?);
    let weight = i32::from(i16::from_be_bytes(be_u16(raw, 2)?.to_be_bytes()));
    let sign = be_u16(raw, 4)?;
    let dscale = usize::from(be_u16(raw, 6)?);
    match sign {
        NAN => return Ok("NaN".to_string()),
        POS_INFINITY => return Ok("Infinity".to_string()),
        NEG_INFINITY => return Ok("-Infinity".to_string()),
        _ => {}
    }
    let digits = (0..ndigits)
        .map(|i| be_u16(raw, 8 + 2 * i))
        .collect::<Result<Vec<_>, _>>()?;
    let digit_at = |pos: i32| {
        usize::try_from(pos)
            .ok()
            .and_then(|p| digits.get(p))
            .copied()
            .unwrap_or(0)
    };

    let mut text = String::new();
    if sign == NEGATIVE {
        text.push('-');
    }
    if weight < 0 {
        text.push('0');
    } else {
        text.push_str(&digit_at(0).to_string());
        for pos in 1..=weight {
            text.push_str(&format!("{:04}", digit_at(pos)));
        }
    }
    if dscale > 0 {
        let mut fraction = String::with_capacity(dscale + 4);
        let mut pos = weight + 1;
        while fraction.len() < dscale {
            fraction.push_str(&format!("{:04}", digit_at(pos)));
            pos += 1;
        }
        fraction.truncate(dscale);
        text.push('.');
        text.push_str(&fraction);
    }
    Ok(text)
}

/// Extracts a `SqlValue` from a `postgres` row at the 0-based `idx`.
///
/// Date/time, json and uuid columns come back as their text form; `numeric`
/// keeps full precision as [`SqlValue::Decimal`].
///
/// # Errors
/// Returns `SqlOneLineError::ConversionError` naming the column type when it
/// has no supported reading, or the driver error if decoding fails.
pub fn postgres_extract_value(row: &Row, idx: usize) -> Result<SqlValue, SqlOneLineError> {
    let type_info = row
        .columns()
        .get(idx)
        .ok_or_else(|| {
            SqlOneLineError::ExecutionError(format!("column index {idx} out of range"))
        })?
        .type_();

    let value = match type_info.name() {
        "int2" => row
            .try_get::<_, Option<i16>>(idx)?
            .map(|v| SqlValue::Integer(i64::from(v))),
        "int4" => row
            .try_get::<_, Option<i32>>(idx)?
            .map(|v| SqlValue::Integer(i64::from(v))),
        "int8" => row.try_get::<_, Option<i64>>(idx)?.map(SqlValue::Integer),
        "oid" => row
            .try_get::<_, Option<u32>>(idx)?
            .map(|v| SqlValue::Integer(i64::from(v))),
        "float4" => row
            .try_get::<_, Option<f32>>(idx)?
            .map(|v| SqlValue::Real(f64::from(v))),
        "float8" => row.try_get::<_, Option<f64>>(idx)?.map(SqlValue::Real),
        "numeric" => row
            .try_get::<_, Option<NumericText>>(idx)?
            .map(|n| SqlValue::Decimal(n.0)),
        "bool" => row.try_get::<_, Option<bool>>(idx)?.map(SqlValue::Bool),
        "bytea" => row.try_get::<_, Option<Vec<u8>>>(idx)?.map(SqlValue::Blob),
        "timestamp" => row
            .try_get::<_, Option<NaiveDateTime>>(idx)?
            .map(|v| SqlValue::Text(v.to_string())),
        "timestamptz" => row
            .try_get::<_, Option<DateTime<Utc>>>(idx)?
            .map(|v| SqlValue::Text(v.to_rfc3339())),
        "date" => row
            .try_get::<_, Option<NaiveDate>>(idx)?
            .map(|v| SqlValue::Text(v.to_string())),
        "time" => row
            .try_get::<_, Option<NaiveTime>>(idx)?
            .map(|v| SqlValue::Text(v.to_string())),
        "json" | "jsonb" => row
            .try_get::<_, Option<Value>>(idx)?
            .map(|v| SqlValue::Text(v.to_string())),
        "uuid" => row
            .try_get::<_, Option<uuid::Uuid>>(idx)?
            .map(|v| SqlValue::Text(v.to_string())),
        // text, varchar, bpchar, name, citext and other text-like types
        _ if <String as FromSql>::accepts(type_info) => {
            row.try_get::<_, Option<String>>(idx)?.map(SqlValue::Text)
        }
        other => {
            return Err(SqlOneLineError::ConversionError(format!(
                "column {} has unsupported type {other}; cast it in SQL, e.g. ::text",
                idx + 1
            )));
        }
    };
    Ok(value.unwrap_or(SqlValue::Null))
}

/// Cursor over rows the server already returned; scrollable.
pub struct PostgresCursor {
    rows: Vec<Row>,
    /// Index of the current row; `None` before the first.
    position: Option<usize>,
}

impl PostgresCursor {
    pub(crate) fn new(rows: Vec<Row>) -> Self {
        Self {
            rows,
            position: None,
        }
    }
}

impl Cursor for PostgresCursor {
    fn rewind(&mut self) -> Result<(), SqlOneLineError> {
        self.position = None;
        Ok(())
    }

    fn advance(&mut self) -> Result<bool, SqlOneLineError> {
        let next = self.position.map_or(0, |p| p + 1);
        self.position = Some(next.min(self.rows.len()));
        Ok(next < self.rows.len())
    }

    fn column(&self, index: usize) -> Result<SqlValue, SqlOneLineError> {
        let row = self
            .position
            .and_then(|p| self.rows.get(p))
            .ok_or_else(|| {
                SqlOneLineError::ExecutionError("cursor is not positioned on a row".to_string())
            })?;
        let idx = index.checked_sub(1).ok_or_else(|| {
            SqlOneLineError::ExecutionError("column indexes start at 1".to_string())
        })?;
        postgres_extract_value(row, idx)
    }

    fn close(self) -> Result<(), SqlOneLineError> {
        Ok(())
    }
}
