//! One CSV file per table.

use std::fs;
use std::path::{Path, PathBuf};

use census_common::{format_fixed, format_plain};
use census_model::{ColumnRole, FactTable, Value};
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::error::{OutputError, Result};

/// `<prefix>_<table>.csv`
pub fn table_file_name(prefix: &str, table: &str) -> String {
    format!("{prefix}_{table}.csv")
}

pub fn manifest_file_name(prefix: &str) -> String {
    format!("{prefix}_manifest.json")
}

pub fn validation_file_name(prefix: &str) -> String {
    format!("{prefix}_validation.json")
}

/// A table written to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenTable {
    pub path: PathBuf,
    pub sha256: String,
}

/// Serialized form of one cell. Percentages and indices carry exactly
/// `precision` decimals; counts are written without trailing zeros.
pub fn format_cell(value: &Value, role: ColumnRole, precision: u32) -> String {
    match value {
        Value::Null => String::new(),
        Value::Int(v) => v.to_string(),
        Value::Float(v) => match role {
            ColumnRole::Percent | ColumnRole::Index => format_fixed(*v, precision),
            _ => format_plain(*v),
        },
        Value::Text(v) => v.clone(),
    }
}

/// Encodes `table` as comma-separated UTF-8 with a header row.
pub fn encode_table(table: &FactTable, precision: u32) -> Result<Vec<u8>> {
    let csv_error = |source| OutputError::Csv {
        table: table.name.clone(),
        source,
    };
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(table.columns.iter().map(|column| column.name.as_str()))
        .map_err(csv_error)?;
    for row in &table.rows {
        let record = row
            .iter()
            .zip(&table.columns)
            .map(|(value, column)| format_cell(value, column.role, precision));
        writer.write_record(record).map_err(csv_error)?;
    }
    writer
        .into_inner()
        .map_err(|err| csv_error(csv::Error::from(err.into_error())))
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

pub fn write_table(
    dir: &Path,
    prefix: &str,
    table: &FactTable,
    precision: u32,
) -> Result<WrittenTable> {
    let bytes = encode_table(table, precision)?;
    let path = dir.join(table_file_name(prefix, &table.name));
    fs::write(&path, &bytes).map_err(|source| OutputError::Write {
        path: path.clone(),
        source,
    })?;
    debug!(table = %table.name, rows = table.len(), path = %path.display(), "wrote table");
    Ok(WrittenTable {
        path,
        sha256: sha256_hex(&bytes),
    })
}

#[cfg(test)]
mod tests {
    use census_model::FactColumn;

    use super::*;

    #[test]
    fn percentages_have_fixed_decimals() {
        assert_eq!(format_cell(&Value::Float(50.0), ColumnRole::Percent, 2), "50.00");
        assert_eq!(format_cell(&Value::Float(33.333), ColumnRole::Index, 2), "33.33");
        assert_eq!(format_cell(&Value::Float(9504.0), ColumnRole::Count, 2), "9504");
        assert_eq!(format_cell(&Value::Null, ColumnRole::Count, 2), "");
    }

    #[test]
    fn encodes_header_and_quotes() {
        let mut table = FactTable::new(
            "Dim_Teste",
            vec![
                FactColumn::new("teste_id", ColumnRole::PrimaryKey),
                FactColumn::new("descricao", ColumnRole::Attribute),
            ],
        );
        table
            .push_row(vec![
                Value::Int(1),
                Value::Text("Alojamento, restauração e similares".to_string()),
            ])
            .unwrap();
        let bytes = encode_table(&table, 2).unwrap();
        assert_eq!(
            String::from_utf8(bytes).unwrap(),
            "teste_id,descricao\n1,\"Alojamento, restauração e similares\"\n"
        );
        assert_eq!(table_file_name("DW", "Dim_Teste"), "DW_Dim_Teste.csv");
    }
}
