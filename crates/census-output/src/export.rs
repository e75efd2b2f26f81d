//! Writes the consolidated star schema and its manifest.

use std::fs;
use std::path::{Path, PathBuf};

use census_model::{DimensionRegistry, FactTable, MappingTable, ValidationReport};
use chrono::{SecondsFormat, Utc};
use tracing::{info, warn};

use crate::error::{OutputError, Result};
use crate::manifest::{Manifest, ManifestTable, TableKind, manifest_entry, read_manifest, write_json};
use crate::reimport::{read_exported, reimport_matches};
use crate::writer::{
    manifest_file_name, sha256_hex, table_file_name, validation_file_name, write_table,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOptions {
    pub prefix: String,
    /// Decimals for percentage and index columns.
    pub precision: u32,
}

/// Tables to export.
pub struct ExportRequest<'a> {
    pub registry: &'a DimensionRegistry,
    pub facts: &'a [FactTable],
    pub mappings: Option<&'a MappingTable>,
    pub report: Option<&'a ValidationReport>,
}

impl ExportRequest<'_> {
    /// Every table in export order: dimensions, facts, then the mapping table.
    pub fn tables(&self) -> Vec<(FactTable, TableKind)> {
        let mut tables: Vec<(FactTable, TableKind)> = self
            .registry
            .tables()
            .map(|dimension| (dimension.to_table(), TableKind::Dimension))
            .collect();
        tables.extend(self.facts.iter().map(|fact| (fact.clone(), TableKind::Fact)));
        if let Some(mappings) = self.mappings {
            tables.push((mappings.to_table(), TableKind::Mapping));
        }
        tables
    }
}

/// Writes one CSV per table, the validation report and the manifest into
/// `dir` (created if missing).
pub fn export(
    dir: &Path,
    options: &ExportOptions,
    request: &ExportRequest<'_>,
) -> Result<Manifest> {
    fs::create_dir_all(dir).map_err(|source| OutputError::Write {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut entries: Vec<ManifestTable> = Vec::new();
    for (table, kind) in request.tables() {
        let written = write_table(dir, &options.prefix, &table, options.precision)?;
        entries.push(manifest_entry(
            &table,
            kind,
            table_file_name(&options.prefix, &table.name),
            written.sha256,
        ));
    }

    if let Some(report) = request.report {
        write_json(&dir.join(validation_file_name(&options.prefix)), report)?;
    }

    let manifest = Manifest {
        generated_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        prefix: options.prefix.clone(),
        precision: options.precision,
        tables: entries,
    };
    write_json(&dir.join(manifest_file_name(&options.prefix)), &manifest)?;
    info!(
        dir = %dir.display(),
        tables = manifest.tables.len(),
        dimension_rows = manifest.total_rows(TableKind::Dimension),
        fact_rows = manifest.total_rows(TableKind::Fact),
        "export finished"
    );
    Ok(manifest)
}

/// Re-imports every exported table and compares it with the in-memory one.
pub fn verify_round_trip(
    dir: &Path,
    options: &ExportOptions,
    request: &ExportRequest<'_>,
) -> Result<Vec<String>> {
    let mut differences = Vec::new();
    for (table, _) in request.tables() {
        let path = dir.join(table_file_name(&options.prefix, &table.name));
        differences.extend(reimport_matches(&path, &table, options.precision)?);
    }
    Ok(differences)
}

/// Outcome of checking an export directory against its manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VerifyReport {
    pub manifest: PathBuf,
    pub tables: usize,
    pub problems: Vec<String>,
}

impl VerifyReport {
    pub fn is_ok(&self) -> bool {
        self.problems.is_empty()
    }
}

/// Checks file presence, sha256, shape and column names of every table
/// listed in `<prefix>_manifest.json`.
pub fn verify_export(dir: &Path, prefix: &str) -> Result<VerifyReport> {
    let manifest_path = dir.join(manifest_file_name(prefix));
    let manifest = read_manifest(&manifest_path)?;
    let mut report = VerifyReport {
        manifest: manifest_path,
        tables: manifest.tables.len(),
        problems: Vec::new(),
    };
    for entry in &manifest.tables {
        let path = dir.join(&entry.file);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(err) => {
                warn!(path = %path.display(), %err, "exported file unreadable");
                report.problems.push(format!("{}: {err}", entry.file));
                continue;
            }
        };
        if sha256_hex(&bytes) != entry.sha256 {
            report.problems.push(format!("{}: sha256 mismatch", entry.file));
        }
        let df = read_exported(&path)?;
        if df.height() != entry.rows || df.width() != entry.columns {
            report.problems.push(format!(
                "{}: {}x{} in file, {}x{} in manifest",
                entry.file,
                df.height(),
                df.width(),
                entry.rows,
                entry.columns
            ));
        }
        let names: Vec<&str> = df
            .get_column_names()
            .into_iter()
            .map(|name| name.as_str())
            .collect();
        let expected: Vec<&str> = entry
            .column_names
            .iter()
            .map(|column| column.name.as_str())
            .collect();
        if names != expected {
            report
                .problems
                .push(format!("{}: column names differ from manifest", entry.file));
        }
    }
    Ok(report)
}
