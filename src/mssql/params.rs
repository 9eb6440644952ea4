//! Mapping from compiled parameters to tiberius wire values.
//!
//! Explicit annotations override the wire type inferred from the value's
//! shape. Incompatible or out-of-range annotations surface here as
//! `ParameterError`; annotation itself never validates.

use std::borrow::Cow;

use tiberius::numeric::Numeric;
use tiberius::{ColumnData, IntoSql};

use crate::error::TsqlTemplateError;
use crate::statement::Parameter;
use crate::types::{SqlType, SqlValue};

/// A parameter payload ready to hand to a tiberius query.
#[derive(Debug)]
pub(crate) struct BoundParam<'a>(ColumnData<'a>);

impl<'a> IntoSql<'a> for BoundParam<'a> {
    fn into_sql(self) -> ColumnData<'a> {
        self.0
    }
}

/// Convert one compiled parameter into its wire value.
pub(crate) fn bind_value(param: &Parameter) -> Result<BoundParam<'_>, TsqlTemplateError> {
    enforce_declared_length(param)?;

    let data = match param.ty {
        None => inferred_column_data(&param.value),
        Some(ty) => typed_column_data(ty, param)?,
    };

    Ok(BoundParam(data))
}

/// Wire value for an unannotated parameter, from the value's shape alone.
fn inferred_column_data(value: &SqlValue) -> ColumnData<'_> {
    match value {
        SqlValue::Int(i) => ColumnData::I64(Some(*i)),
        SqlValue::Float(f) => ColumnData::F64(Some(*f)),
        SqlValue::Text(s) => ColumnData::String(Some(Cow::from(s.as_str()))),
        SqlValue::Bool(b) => ColumnData::Bit(Some(*b)),
        SqlValue::Timestamp(dt) => {
            // ISO-8601; the server casts to the column's datetime type
            ColumnData::String(Some(Cow::from(
                dt.format("%Y-%m-%dT%H:%M:%S%.f").to_string(),
            )))
        }
        SqlValue::Null => ColumnData::String(None),
        SqlValue::JSON(jsval) => ColumnData::String(Some(Cow::from(jsval.to_string()))),
        SqlValue::Blob(bytes) => ColumnData::Binary(Some(Cow::from(bytes.as_slice()))),
    }
}

/// Wire value for an explicitly annotated parameter.
fn typed_column_data<'a>(
    ty: SqlType,
    param: &'a Parameter,
) -> Result<ColumnData<'a>, TsqlTemplateError> {
    let data = match (ty, &param.value) {
        (_, SqlValue::Null) => typed_null(ty),
        (SqlType::TinyInt, SqlValue::Int(i)) => ColumnData::U8(Some(narrowed(ty, *i)?)),
        (SqlType::SmallInt, SqlValue::Int(i)) => ColumnData::I16(Some(narrowed(ty, *i)?)),
        (SqlType::Int, SqlValue::Int(i)) => ColumnData::I32(Some(narrowed(ty, *i)?)),
        (SqlType::BigInt, SqlValue::Int(i)) => ColumnData::I64(Some(*i)),
        (SqlType::Real, SqlValue::Float(f)) => ColumnData::F32(Some(*f as f32)),
        (SqlType::Real, SqlValue::Int(i)) => ColumnData::F32(Some(*i as f32)),
        (SqlType::Float, SqlValue::Float(f)) => ColumnData::F64(Some(*f)),
        (SqlType::Float, SqlValue::Int(i)) => ColumnData::F64(Some(*i as f64)),
        (SqlType::Bit, SqlValue::Bool(b)) => ColumnData::Bit(Some(*b)),
        (SqlType::Bit, SqlValue::Int(i)) if *i == 0 || *i == 1 => {
            ColumnData::Bit(Some(*i == 1))
        }
        (SqlType::VarChar | SqlType::NVarChar | SqlType::Text, SqlValue::Text(s)) => {
            ColumnData::String(Some(Cow::from(s.as_str())))
        }
        (SqlType::VarChar | SqlType::NVarChar | SqlType::Text, SqlValue::JSON(jsval)) => {
            ColumnData::String(Some(Cow::from(jsval.to_string())))
        }
        (SqlType::DateTime, SqlValue::Timestamp(dt)) => ColumnData::String(Some(Cow::from(
            dt.format("%Y-%m-%dT%H:%M:%S%.f").to_string(),
        ))),
        (SqlType::DateTime, SqlValue::Text(s)) => ColumnData::String(Some(Cow::from(s.as_str()))),
        (SqlType::VarBinary, SqlValue::Blob(bytes)) => {
            ColumnData::Binary(Some(Cow::from(bytes.as_slice())))
        }
        (SqlType::Decimal, SqlValue::Int(_) | SqlValue::Float(_)) => {
            ColumnData::Numeric(Some(numeric_value(param)?))
        }
        (ty, value) => {
            return Err(TsqlTemplateError::ParameterError(format!(
                "cannot bind {value:?} as {ty:?}"
            )));
        }
    };

    Ok(data)
}

/// The NULL wire value carrying the annotated type.
fn typed_null(ty: SqlType) -> ColumnData<'static> {
    match ty {
        SqlType::TinyInt => ColumnData::U8(None),
        SqlType::SmallInt => ColumnData::I16(None),
        SqlType::Int => ColumnData::I32(None),
        SqlType::BigInt => ColumnData::I64(None),
        SqlType::Real => ColumnData::F32(None),
        SqlType::Float => ColumnData::F64(None),
        SqlType::Bit => ColumnData::Bit(None),
        SqlType::VarChar | SqlType::NVarChar | SqlType::Text | SqlType::DateTime => {
            ColumnData::String(None)
        }
        SqlType::VarBinary => ColumnData::Binary(None),
        SqlType::Decimal => ColumnData::Numeric(None),
    }
}

fn narrowed<T: TryFrom<i64>>(ty: SqlType, value: i64) -> Result<T, TsqlTemplateError> {
    T::try_from(value).map_err(|_| {
        TsqlTemplateError::ParameterError(format!("value {value} is out of range for {ty:?}"))
    })
}

/// Build a tiberius numeric from the value plus the annotation's scale and
/// precision options. The stored integer is the value scaled by 10^scale.
fn numeric_value(param: &Parameter) -> Result<Numeric, TsqlTemplateError> {
    let options = param.options.unwrap_or_default();
    let scale = options.scale.unwrap_or(0);

    let factor = 10i128.checked_pow(u32::from(scale)).ok_or_else(|| {
        TsqlTemplateError::ParameterError(format!("scale {scale} is out of range for Decimal"))
    })?;

    let scaled = match &param.value {
        SqlValue::Int(i) => i128::from(*i).checked_mul(factor).ok_or_else(|| {
            TsqlTemplateError::ParameterError(format!(
                "value {i} overflows Decimal at scale {scale}"
            ))
        })?,
        SqlValue::Float(f) => {
            let scaled = (f * (factor as f64)).round();
            if !scaled.is_finite() || scaled.abs() >= i128::MAX as f64 {
                return Err(TsqlTemplateError::ParameterError(format!(
                    "value {f} overflows Decimal at scale {scale}"
                )));
            }
            scaled as i128
        }
        value => {
            return Err(TsqlTemplateError::ParameterError(format!(
                "cannot bind {value:?} as Decimal"
            )));
        }
    };

    if let Some(precision) = options.precision {
        let digits = scaled.unsigned_abs().to_string().len();
        if digits > usize::from(precision) {
            return Err(TsqlTemplateError::ParameterError(format!(
                "value {scaled}e-{scale} exceeds declared precision {precision}"
            )));
        }
    }

    Ok(Numeric::new_with_scale(scaled, scale))
}

/// Reject text/binary values that exceed a declared maximum length.
fn enforce_declared_length(param: &Parameter) -> Result<(), TsqlTemplateError> {
    let Some(length) = param.options.and_then(|o| o.length) else {
        return Ok(());
    };

    let actual = match &param.value {
        SqlValue::Text(s) => Some(s.chars().count()),
        SqlValue::Blob(bytes) => Some(bytes.len()),
        _ => None,
    };

    match actual {
        Some(actual) if actual > length => Err(TsqlTemplateError::ParameterError(format!(
            "parameter {} is {actual} long but declared length is {length}",
            param.name
        ))),
        _ => Ok(()),
    }
}
