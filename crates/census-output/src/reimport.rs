//! Reading exported CSVs back and comparing them with in-memory tables.

use std::path::Path;

use census_common::any_to_text;
use census_model::{FactTable, Value};
use polars::prelude::{AnyValue, CsvReadOptions, DataFrame, SerReader};

use crate::error::{OutputError, Result};

/// Differences reported per table before giving up.
const MAX_DIFFERENCES: usize = 10;

/// Reads an exported file with every column as text.
pub fn read_exported(path: &Path) -> Result<DataFrame> {
    let reimport_error = |source| OutputError::Reimport {
        path: path.to_path_buf(),
        source,
    };
    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .map_err(reimport_error)?
        .finish()
        .map_err(reimport_error)
}

/// Compares a re-imported frame with the table it was written from.
///
/// Shapes and column names must match; integers and text must be equal;
/// floats may differ by half a unit of the last exported decimal. Empty
/// text and nulls are equivalent.
pub fn compare(df: &DataFrame, table: &FactTable, precision: u32) -> Vec<String> {
    let mut differences = Vec::new();
    if df.height() != table.len() || df.width() != table.width() {
        differences.push(format!(
            "{}: shape {}x{} differs from {}x{}",
            table.name,
            df.height(),
            df.width(),
            table.len(),
            table.width()
        ));
        return differences;
    }
    let tolerance = 0.5 * 10f64.powi(-(precision as i32)) + 1e-9;
    for (idx, spec) in table.columns.iter().enumerate() {
        let Ok(column) = df.column(&spec.name) else {
            differences.push(format!("{}: column {} missing", table.name, spec.name));
            continue;
        };
        for (row, cells) in table.rows.iter().enumerate() {
            let actual = any_to_text(&column.get(row).unwrap_or(AnyValue::Null));
            if !cell_matches(&cells[idx], actual.as_deref(), tolerance) {
                differences.push(format!(
                    "{}: row {} column {}: expected {:?}, found {:?}",
                    table.name,
                    row + 1,
                    spec.name,
                    cells[idx],
                    actual
                ));
                if differences.len() >= MAX_DIFFERENCES {
                    return differences;
                }
            }
        }
    }
    differences
}

fn cell_matches(expected: &Value, actual: Option<&str>, tolerance: f64) -> bool {
    let actual = actual.filter(|text| !text.is_empty());
    match (expected, actual) {
        (Value::Null, None) => true,
        (Value::Text(text), None) => text.is_empty(),
        (_, None) | (Value::Null, Some(_)) => false,
        (Value::Int(v), Some(text)) => text.trim().parse::<i64>().is_ok_and(|parsed| parsed == *v),
        (Value::Float(v), Some(text)) => text
            .trim()
            .parse::<f64>()
            .is_ok_and(|parsed| (parsed - v).abs() <= tolerance),
        (Value::Text(v), Some(text)) => v == text,
    }
}

/// Re-imports `path` and compares it with `table`.
pub fn reimport_matches(path: &Path, table: &FactTable, precision: u32) -> Result<Vec<String>> {
    let df = read_exported(path)?;
    Ok(compare(&df, table, precision))
}
