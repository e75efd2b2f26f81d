//! Runs every integrity rule over a registry and its fact tables.

use std::collections::HashMap;

use census_model::{
    ColumnRole, DimensionRegistry, FactTable, MappingTable, Relationship, RuleKind, Severity,
    ValidationOptions, ValidationReport,
};
use polars::prelude::DataFrame;
use tracing::{debug, error, warn};

use crate::checks::{completeness, empty, orphans, range, uniqueness};
use crate::error::Result;
use crate::frame::to_frame;

/// Tables and relationships to validate.
pub struct ValidationInput<'a> {
    pub registry: &'a DimensionRegistry,
    pub facts: &'a [FactTable],
    pub mappings: Option<&'a MappingTable>,
    pub relationships: &'a [Relationship],
}

/// Relationships implied by the FK columns of `facts`.
pub fn relationships_of(facts: &[FactTable]) -> Vec<Relationship> {
    facts.iter().flat_map(FactTable::relationships).collect()
}

/// Validates dimensions, facts and FK relationships.
///
/// Orphan FKs and duplicate primary keys are fatal by default;
/// completeness, range and empty-table findings are warnings. Every
/// severity can be overridden through `options`.
pub fn validate(
    scope: &str,
    input: &ValidationInput<'_>,
    options: &ValidationOptions,
) -> Result<ValidationReport> {
    let mut tables: Vec<FactTable> = input
        .registry
        .tables()
        .map(|dimension| dimension.to_table())
        .collect();
    let fact_positions = tables.len()..tables.len() + input.facts.len();
    tables.extend(input.facts.iter().cloned());
    if let Some(mappings) = input.mappings {
        tables.push(mappings.to_table());
    }

    let mut frames: HashMap<&str, DataFrame> = HashMap::with_capacity(tables.len());
    for table in &tables {
        frames.insert(table.name.as_str(), to_frame(table)?);
    }

    let mut report = ValidationReport::new(scope);
    for (idx, table) in tables.iter().enumerate() {
        let Some(df) = frames.get(table.name.as_str()) else {
            continue;
        };
        if let Some(pk) = table.primary_key_index() {
            let severity = options.severity_for(RuleKind::Uniqueness);
            report.extend(uniqueness::check(
                &table.name,
                df,
                &table.columns[pk].name,
                severity,
            )?);
        }
        let required = required_columns(table, options);
        report.extend(completeness::check(
            &table.name,
            df,
            &required,
            options.completeness_threshold,
            options.severity_for(RuleKind::Completeness),
        ));
        report.extend(range::check(
            &table.name,
            df,
            &table.columns,
            options,
            options.severity_for(RuleKind::Range),
        )?);
        if fact_positions.contains(&idx) {
            report.extend(empty::check(
                &table.name,
                df,
                options.severity_for(RuleKind::EmptyTable),
            ));
        }
    }

    for relationship in input.relationships {
        let (Some(facts), Some(dimension)) = (
            frames.get(relationship.fact_table.as_str()),
            frames.get(relationship.dimension_table.as_str()),
        ) else {
            warn!(
                fact_table = %relationship.fact_table,
                dimension_table = %relationship.dimension_table,
                "relationship refers to an unknown table"
            );
            continue;
        };
        let severity = options.severity_for(RuleKind::OrphanForeignKey);
        report.extend(orphans::check(relationship, facts, dimension, severity)?);
    }

    for violation in &report.violations {
        match violation.severity {
            Severity::Fatal => error!(
                rule = %violation.rule,
                table = %violation.table,
                column = violation.column.as_deref().unwrap_or("-"),
                count = violation.count,
                "{}",
                violation.message
            ),
            Severity::Warning => warn!(
                rule = %violation.rule,
                table = %violation.table,
                count = violation.count,
                "{}",
                violation.message
            ),
        }
    }
    debug!(
        scope,
        tables = tables.len(),
        fatal = report.fatal_count(),
        warnings = report.warning_count(),
        "validation finished"
    );
    Ok(report)
}

/// Configured required columns, else the primary key and the first measure.
fn required_columns(table: &FactTable, options: &ValidationOptions) -> Vec<String> {
    if let Some(columns) = options.required_columns.get(&table.name) {
        return columns.clone();
    }
    let key = table
        .columns
        .iter()
        .find(|column| column.role == ColumnRole::PrimaryKey);
    let measure = table.columns.iter().find(|column| column.role.is_measure());
    key.into_iter()
        .chain(measure)
        .map(|column| column.name.clone())
        .collect()
}

/// Outcome of the export gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportGate {
    /// No fatal violations.
    Clear,
    /// Fatal violations present, export forced by the caller.
    Forced { fatal: usize },
    /// Fatal violations present; nothing may be written.
    Blocked { fatal: usize },
}

impl ExportGate {
    pub fn allows_export(self) -> bool {
        !matches!(self, ExportGate::Blocked { .. })
    }
}

/// Fatal violations block export unless `force` is set.
pub fn gate_export(report: &ValidationReport, force: bool) -> ExportGate {
    let fatal = report.fatal_count();
    if fatal == 0 {
        ExportGate::Clear
    } else if force {
        warn!(fatal, "exporting despite fatal violations");
        ExportGate::Forced { fatal }
    } else {
        ExportGate::Blocked { fatal }
    }
}
