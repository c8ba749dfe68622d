//! Conversions between [`Value`]/[`Row`] and tokio-postgres.

use super::numeric::{self, Numeric};
use crate::error::{TableError, TableResult};
use crate::row::Row;
use crate::value::Value;
use bytes::BytesMut;
use std::error::Error;
use tokio_postgres::types::{IsNull, ToSql, Type};

type BoxError = Box<dyn Error + Sync + Send>;

impl ToSql for Value {
    fn to_sql(&self, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError> {
        match self {
            Value::Null => Ok(IsNull::Yes),
            Value::Text(s) => {
                if !<&str as ToSql>::accepts(ty) {
                    return Err(format!("cannot bind text to a {ty} parameter").into());
                }
                s.as_str().to_sql(ty, out)
            }
            Value::Number(n) => number_to_sql(n, ty, out),
        }
    }

    // Any type: NULL binds anywhere; the concrete check happens in `to_sql`.
    fn accepts(_ty: &Type) -> bool {
        true
    }

    tokio_postgres::types::to_sql_checked!();
}

fn number_to_sql(
    n: &serde_json::Number,
    ty: &Type,
    out: &mut BytesMut,
) -> Result<IsNull, BoxError> {
    let int = || {
        n.as_i64()
            .ok_or_else(|| BoxError::from(format!("{n} is not an integer")))
    };
    let float = || {
        n.as_f64()
            .ok_or_else(|| BoxError::from(format!("{n} is not representable as f64")))
    };

    match *ty {
        Type::INT2 => i16::try_from(int()?)?.to_sql(ty, out),
        Type::INT4 => i32::try_from(int()?)?.to_sql(ty, out),
        Type::INT8 => int()?.to_sql(ty, out),
        Type::FLOAT4 => (float()? as f32).to_sql(ty, out),
        Type::FLOAT8 => float()?.to_sql(ty, out),
        Type::BOOL => (int()? != 0).to_sql(ty, out),
        Type::NUMERIC => {
            numeric::encode(&numeric::decimal_text(n), out)?;
            Ok(IsNull::No)
        }
        Type::TEXT | Type::VARCHAR | Type::BPCHAR | Type::NAME => n.to_string().to_sql(ty, out),
        _ => Err(format!("cannot bind a number to a {ty} parameter").into()),
    }
}

/// Convert a tokio-postgres row into a [`Row`].
///
/// Text-like columns become [`Value::Text`], integer/float/bool/numeric
/// columns become [`Value::Number`]. A `numeric` with a fraction goes
/// through `f64` and may lose digits; `NaN` and infinities are a decode
/// error. Other column types are a decode error too; cast them to `text`
/// in the query if you need them.
pub fn row_from_pg(row: &tokio_postgres::Row) -> TableResult<Row> {
    let mut out = Row::with_capacity(row.len());
    for (idx, column) in row.columns().iter().enumerate() {
        let name = column.name();
        let decode = |e: tokio_postgres::Error| TableError::decode(name, e.to_string());

        let value = match *column.type_() {
            Type::TEXT | Type::VARCHAR | Type::BPCHAR | Type::NAME => {
                Value::from(row.try_get::<_, Option<String>>(idx).map_err(decode)?)
            }
            Type::INT2 => Value::from(row.try_get::<_, Option<i16>>(idx).map_err(decode)?),
            Type::INT4 => Value::from(row.try_get::<_, Option<i32>>(idx).map_err(decode)?),
            Type::INT8 => Value::from(row.try_get::<_, Option<i64>>(idx).map_err(decode)?),
            Type::OID => Value::from(row.try_get::<_, Option<u32>>(idx).map_err(decode)?),
            Type::FLOAT4 => Value::from(row.try_get::<_, Option<f32>>(idx).map_err(decode)?),
            Type::FLOAT8 => Value::from(row.try_get::<_, Option<f64>>(idx).map_err(decode)?),
            Type::BOOL => Value::from(row.try_get::<_, Option<bool>>(idx).map_err(decode)?),
            Type::NUMERIC => match row.try_get::<_, Option<Numeric>>(idx).map_err(decode)? {
                Some(Numeric(n)) => Value::Number(n),
                None => Value::Null,
            },
            ref other => {
                return Err(TableError::decode(
                    name,
                    format!("unsupported column type {other}; cast it to text"),
                ));
            }
        };
        out.set(name, value);
    }
    Ok(out)
}
