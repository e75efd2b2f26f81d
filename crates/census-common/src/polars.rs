//! Conversions from polars `AnyValue` cells.

use polars::prelude::AnyValue;

use crate::numeric::{clean_number, format_plain};

pub fn any_is_null(value: &AnyValue<'_>) -> bool {
    matches!(value, AnyValue::Null)
}

/// Numeric view of a cell; text cells go through [`clean_number`].
pub fn any_to_f64(value: &AnyValue<'_>) -> Option<f64> {
    match value {
        AnyValue::Int8(v) => Some(f64::from(*v)),
        AnyValue::Int16(v) => Some(f64::from(*v)),
        AnyValue::Int32(v) => Some(f64::from(*v)),
        AnyValue::Int64(v) => Some(*v as f64),
        AnyValue::UInt8(v) => Some(f64::from(*v)),
        AnyValue::UInt16(v) => Some(f64::from(*v)),
        AnyValue::UInt32(v) => Some(f64::from(*v)),
        AnyValue::UInt64(v) => Some(*v as f64),
        AnyValue::Float32(v) => Some(f64::from(*v)),
        AnyValue::Float64(v) => Some(*v),
        AnyValue::String(s) => clean_number(s),
        AnyValue::StringOwned(s) => clean_number(s.as_str()),
        _ => None,
    }
}

/// Integer view of a cell; floats must be integral.
pub fn any_to_i64(value: &AnyValue<'_>) -> Option<i64> {
    match value {
        AnyValue::Int8(v) => Some(i64::from(*v)),
        AnyValue::Int16(v) => Some(i64::from(*v)),
        AnyValue::Int32(v) => Some(i64::from(*v)),
        AnyValue::Int64(v) => Some(*v),
        AnyValue::UInt8(v) => Some(i64::from(*v)),
        AnyValue::UInt16(v) => Some(i64::from(*v)),
        AnyValue::UInt32(v) => Some(i64::from(*v)),
        AnyValue::UInt64(v) => i64::try_from(*v).ok(),
        AnyValue::Float32(v) if v.fract() == 0.0 => Some(*v as i64),
        AnyValue::Float64(v) if v.fract() == 0.0 => Some(*v as i64),
        AnyValue::String(s) => s.trim().parse().ok(),
        AnyValue::StringOwned(s) => s.as_str().trim().parse().ok(),
        _ => None,
    }
}

/// Text view of a cell; `None` for nulls.
pub fn any_to_text(value: &AnyValue<'_>) -> Option<String> {
    match value {
        AnyValue::Null => None,
        AnyValue::String(s) => Some((*s).to_string()),
        AnyValue::StringOwned(s) => Some(s.as_str().to_string()),
        AnyValue::Boolean(b) => Some(b.to_string()),
        AnyValue::Float32(v) => Some(format_plain(f64::from(*v))),
        AnyValue::Float64(v) => Some(format_plain(*v)),
        other => any_to_i64(other).map(|v| v.to_string()),
    }
}
