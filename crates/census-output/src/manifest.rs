//! `<Prefix>_manifest.json`: every exported table with its shape and hash.

use std::fs;
use std::path::Path;

use census_model::{ColumnRole, FactTable};
use serde::{Deserialize, Serialize};

use crate::error::{OutputError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableKind {
    Dimension,
    Fact,
    Mapping,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestColumn {
    pub name: String,
    pub role: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestTable {
    pub name: String,
    pub kind: TableKind,
    pub file: String,
    pub rows: usize,
    pub columns: usize,
    pub column_names: Vec<ManifestColumn>,
    pub sha256: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    pub generated_at: String,
    pub prefix: String,
    /// Decimals used for percentage and index columns.
    pub precision: u32,
    pub tables: Vec<ManifestTable>,
}

impl Manifest {
    pub fn table(&self, name: &str) -> Option<&ManifestTable> {
        self.tables.iter().find(|table| table.name == name)
    }

    pub fn total_rows(&self, kind: TableKind) -> usize {
        self.tables
            .iter()
            .filter(|table| table.kind == kind)
            .map(|table| table.rows)
            .sum()
    }
}

pub fn role_name(role: ColumnRole) -> String {
    match role {
        ColumnRole::PrimaryKey => "primary_key".to_string(),
        ColumnRole::ForeignKey(entity) => format!("foreign_key:{}", entity.table_name()),
        ColumnRole::Count => "count".to_string(),
        ColumnRole::Percent => "percent".to_string(),
        ColumnRole::Index => "index".to_string(),
        ColumnRole::Year => "year".to_string(),
        ColumnRole::Attribute => "attribute".to_string(),
        ColumnRole::Source => "source".to_string(),
    }
}

pub fn manifest_entry(
    table: &FactTable,
    kind: TableKind,
    file: String,
    sha256: String,
) -> ManifestTable {
    ManifestTable {
        name: table.name.clone(),
        kind,
        file,
        rows: table.len(),
        columns: table.width(),
        column_names: table
            .columns
            .iter()
            .map(|column| ManifestColumn {
                name: column.name.clone(),
                role: role_name(column.role),
            })
            .collect(),
        sha256,
    }
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).map_err(|source| OutputError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(path, json).map_err(|source| OutputError::Write {
        path: path.to_path_buf(),
        source,
    })
}

pub fn read_manifest(path: &Path) -> Result<Manifest> {
    let text = fs::read_to_string(path).map_err(|source| OutputError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| OutputError::Json {
        path: path.to_path_buf(),
        source,
    })
}
