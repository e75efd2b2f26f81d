//! Integrity rules. Each check inspects one frame (or a fact/dimension
//! pair) and returns the violations it found.

pub mod completeness;
pub mod empty;
pub mod orphans;
pub mod range;
pub mod uniqueness;

use census_common::{any_to_f64, any_to_i64, any_to_text};
use polars::prelude::{AnyValue, Column, DataFrame};

use crate::error::{Result, ValidateError};

/// Offending values kept on a violation.
pub(crate) const MAX_EXAMPLES: usize = 5;

pub(crate) fn column<'a>(df: &'a DataFrame, table: &str, name: &str) -> Result<&'a Column> {
    df.column(name).map_err(|source| ValidateError::Column {
        table: table.to_string(),
        column: name.to_string(),
        source,
    })
}

fn cell<'a>(column: &'a Column, idx: usize) -> AnyValue<'a> {
    column.get(idx).unwrap_or(AnyValue::Null)
}

pub(crate) fn integers(column: &Column) -> impl Iterator<Item = Option<i64>> + '_ {
    (0..column.len()).map(move |idx| any_to_i64(&cell(column, idx)))
}

pub(crate) fn floats(column: &Column) -> impl Iterator<Item = Option<f64>> + '_ {
    (0..column.len()).map(move |idx| any_to_f64(&cell(column, idx)))
}

pub(crate) fn texts(column: &Column) -> impl Iterator<Item = Option<String>> + '_ {
    (0..column.len()).map(move |idx| any_to_text(&cell(column, idx)))
}
