use std::error::Error;

use bytes::BytesMut;
use ::postgres::types::{IsNull, ToSql, Type, WrongType, to_sql_checked};

use crate::types::SqlParam;

type EncodeResult = Result<IsNull, Box<dyn Error + Sync + Send>>;

/// Server types a value is sent to as text.
fn is_text(ty: &Type) -> bool {
    matches!(
        *ty,
        Type::TEXT | Type::VARCHAR | Type::BPCHAR | Type::NAME | Type::UNKNOWN
    )
}

fn wrong_type<T>(ty: &Type) -> Box<dyn Error + Sync + Send> {
    Box::new(WrongType::new::<T>(ty.clone()))
}

/// Encode an integer at the width the server asked for, or as its decimal
/// text for text parameters.
fn int_to_sql(value: i64, ty: &Type, out: &mut BytesMut) -> EncodeResult {
    match *ty {
        Type::INT2 => i16::try_from(value)?.to_sql(ty, out),
        Type::INT4 => i32::try_from(value)?.to_sql(ty, out),
        Type::INT8 => value.to_sql(ty, out),
        _ if is_text(ty) => value.to_string().as_str().to_sql(ty, out),
        _ => Err(wrong_type::<i64>(ty)),
    }
}

/// Text goes in verbatim for text parameters; integer and boolean parameters
/// get it parsed the way the server would coerce a literal.
fn text_to_sql(value: &str, ty: &Type, out: &mut BytesMut) -> EncodeResult {
    match *ty {
        Type::INT2 | Type::INT4 | Type::INT8 => int_to_sql(value.trim().parse::<i64>()?, ty, out),
        Type::BOOL => match value.trim().to_ascii_lowercase().as_str() {
            "t" | "true" | "y" | "yes" | "on" | "1" => true.to_sql(ty, out),
            "f" | "false" | "n" | "no" | "off" | "0" => false.to_sql(ty, out),
            _ => Err(format!("invalid boolean text {value:?}").into()),
        },
        _ if is_text(ty) => value.to_sql(ty, out),
        _ => Err(wrong_type::<String>(ty)),
    }
}

fn bool_to_sql(value: bool, ty: &Type, out: &mut BytesMut) -> EncodeResult {
    match *ty {
        Type::BOOL => value.to_sql(ty, out),
        _ if is_text(ty) => (if value { "true" } else { "false" }).to_sql(ty, out),
        _ => Err(wrong_type::<bool>(ty)),
    }
}

impl ToSql for SqlParam {
    fn to_sql(&self, ty: &Type, out: &mut BytesMut) -> EncodeResult {
        match self {
            SqlParam::Int(i) => int_to_sql(i64::from(*i), ty, out),
            SqlParam::Long(l) => int_to_sql(*l, ty, out),
            SqlParam::Text(s) => text_to_sql(s, ty, out),
            SqlParam::Bool(b) => bool_to_sql(*b, ty, out),
            SqlParam::Null => Ok(IsNull::Yes),
        }
    }

    fn accepts(ty: &Type) -> bool {
        matches!(*ty, Type::INT2 | Type::INT4 | Type::INT8 | Type::BOOL) || is_text(ty)
    }

    to_sql_checked!();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(param: SqlParam, ty: &Type) -> Result<Vec<u8>, Box<dyn Error + Sync + Send>> {
        let mut out = BytesMut::new();
        param.to_sql_checked(ty, &mut out)?;
        Ok(out.to_vec())
    }

    #[test]
    fn int_narrows_to_int4() {
        assert_eq!(encode(SqlParam::Long(7), &Type::INT4).unwrap(), 7_i32.to_be_bytes());
    }

    #[test]
    fn int_widens_to_int8() {
        assert_eq!(encode(SqlParam::Int(-2), &Type::INT8).unwrap(), (-2_i64).to_be_bytes());
    }

    #[test]
    fn out_of_range_narrowing_fails() {
        assert!(encode(SqlParam::Long(i64::MAX), &Type::INT2).is_err());
    }

    #[test]
    fn null_writes_nothing() {
        let mut out = BytesMut::new();
        let is_null = SqlParam::Null.to_sql(&Type::TEXT, &mut out).unwrap();
        assert!(matches!(is_null, IsNull::Yes));
        assert!(out.is_empty());
    }

    #[test]
    fn numeric_text_is_encoded_as_an_integer() {
        assert_eq!(
            encode(SqlParam::Text("1234".into()), &Type::INT4).unwrap(),
            1234_i32.to_be_bytes()
        );
        assert!(encode(SqlParam::Text("Alex".into()), &Type::INT4).is_err());
    }

    #[test]
    fn integers_become_text_for_text_columns() {
        assert_eq!(encode(SqlParam::Int(21), &Type::TEXT).unwrap(), b"21");
        assert_eq!(encode(SqlParam::Long(-9), &Type::VARCHAR).unwrap(), b"-9");
    }

    #[test]
    fn booleans_only_go_to_bool_or_text() {
        assert_eq!(encode(SqlParam::Bool(true), &Type::BOOL).unwrap(), [1]);
        assert_eq!(encode(SqlParam::Bool(false), &Type::TEXT).unwrap(), b"false");
        assert!(encode(SqlParam::Bool(true), &Type::INT4).is_err());
        assert!(encode(SqlParam::Int(1), &Type::BOOL).is_err());
        assert_eq!(encode(SqlParam::Text("yes".into()), &Type::BOOL).unwrap(), [1]);
    }

    #[test]
    fn unsupported_server_types_are_refused() {
        assert!(encode(SqlParam::Text("2024-01-01".into()), &Type::TIMESTAMP).is_err());
        assert!(encode(SqlParam::Int(1), &Type::FLOAT8).is_err());
    }
}
