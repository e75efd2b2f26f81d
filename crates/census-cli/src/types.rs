use std::collections::BTreeMap;
use std::path::PathBuf;

use census_consolidate::SkippedSource;
use census_model::{EntityType, MappingStats, SourceLayout, ValidationReport};
use census_output::TableKind;
use census_validate::ExportGate;

/// Switches of one `run` that are not part of the configuration file.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunFlags {
    /// Export even when the consolidated report has fatal violations.
    pub force: bool,
    /// Run every stage except export.
    pub dry_run: bool,
    /// Re-import the written files and compare them with the tables.
    pub verify: bool,
}

#[derive(Debug)]
pub struct RunResult {
    pub output_dir: PathBuf,
    pub prefix: String,
    pub sources: Vec<SourceSummary>,
    pub skipped: Vec<SkippedSource>,
    pub tables: Vec<TableSummary>,
    pub mapping_stats: BTreeMap<EntityType, MappingStats>,
    /// Validation of the consolidated star schema.
    pub report: ValidationReport,
    pub gate: ExportGate,
    pub manifest: Option<PathBuf>,
    /// Differences found by the re-import check, when it ran.
    pub round_trip: Option<Vec<String>>,
    pub errors: Vec<String>,
}

impl RunResult {
    /// 1 when fatal violations remain (forced exports included) or the
    /// re-import check found differences, else 0.
    pub fn exit_code(&self) -> i32 {
        let round_trip_failed = self
            .round_trip
            .as_ref()
            .is_some_and(|differences| !differences.is_empty());
        if self.report.has_fatal() || round_trip_failed {
            1
        } else {
            0
        }
    }
}

/// One loaded source.
#[derive(Debug, Clone)]
pub struct SourceSummary {
    pub dataset: String,
    pub year: i32,
    pub layout: SourceLayout,
    pub file: String,
    pub encoding: &'static str,
    pub rows_read: usize,
    pub records_kept: usize,
    pub fact_rows: usize,
    pub fatal: usize,
    pub warnings: usize,
}

/// One consolidated output table.
#[derive(Debug, Clone)]
pub struct TableSummary {
    pub name: String,
    pub kind: TableKind,
    pub rows: usize,
    pub columns: usize,
}
