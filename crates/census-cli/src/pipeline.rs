//! Census ETL pipeline with explicit stages.
//!
//! Each configured source goes through:
//! 1. **Ingest**: locate the file, decode it, find the header, adapt the layout
//! 2. **Resolve**: map raw labels onto the dimensions built by earlier sources
//! 3. **Assemble**: build the fact tables of the layout
//! 4. **Validate**: integrity report of the source on its own
//!
//! The sources are then merged:
//! 5. **Consolidate**: registry merge, key remapping, temporal evolution
//! 6. **Validate**: integrity report of the consolidated star schema
//! 7. **Export**: CSV files, manifest and validation report, gated by the report
//!
//! A source that fails any of stages 1-4 is skipped and the run continues.

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result, anyhow, bail};
use tracing::{debug, error, info, info_span, warn};

use census_consolidate::{Consolidation, Consolidator, SourceDataset, temporal_evolution};
use census_ingest::{ReadOptions, locate_source, read_source};
use census_map::EntityResolver;
use census_model::{
    DatasetId, DimensionRegistry, EtlConfig, FactTable, MappingTable, Provenance,
    ResolvedRecord, Severity, SourceRecord, SourceSpec, ValidationReport,
};
use census_output::{
    ExportOptions, ExportRequest, TableKind, export, manifest_file_name, verify_round_trip,
};
use census_standards::Catalog;
use census_transform::{FactAssembler, adapt};
use census_validate::{ExportGate, ValidationInput, gate_export, relationships_of, validate};

use crate::types::{RunFlags, RunResult, SourceSummary, TableSummary};

// ============================================================================
// Stage 1: Ingest
// ============================================================================

/// Result of the ingest stage for one source.
#[derive(Debug)]
pub struct IngestedSource {
    pub path: PathBuf,
    pub encoding: &'static str,
    pub rows_read: usize,
    pub records: Vec<SourceRecord>,
}

/// Locates, reads and adapts one source.
pub fn ingest(input_dir: &Path, source: &SourceSpec) -> Result<IngestedSource> {
    let path = locate_source(input_dir, &source.dataset, &source.candidates)?;
    let delimiter = source
        .delimiter
        .map(|delimiter| {
            u8::try_from(delimiter)
                .map_err(|_| anyhow!("delimiter {delimiter:?} is not a single byte"))
        })
        .transpose()?;
    let table = read_source(&path, ReadOptions { delimiter })
        .with_context(|| format!("read {}", path.display()))?;
    let records = adapt(source.layout, &table)
        .with_context(|| format!("adapt {} as {}", path.display(), source.layout))?;
    Ok(IngestedSource {
        encoding: table.encoding.as_str(),
        rows_read: table.len(),
        records,
        path,
    })
}

// ============================================================================
// Stage 2: Resolve
// ============================================================================

/// Result of the resolve stage for one source.
#[derive(Debug)]
pub struct ResolvedSource {
    pub registry: DimensionRegistry,
    pub mappings: MappingTable,
    pub records: Vec<ResolvedRecord>,
}

/// Resolves every record against a copy of `registry`, the dimensions as
/// they stand after every previously processed source.
///
/// Rows whose labels are excluded or unmapped are dropped; the misses are
/// counted in the mapping table.
pub fn resolve(
    registry: &DimensionRegistry,
    resolver: &EntityResolver,
    dataset: &DatasetId,
    records: &[SourceRecord],
) -> Result<ResolvedSource> {
    let mut registry = registry.clone();
    let mut mappings = MappingTable::new();
    let mut resolved = Vec::with_capacity(records.len());
    for record in records {
        if let Some(record) =
            resolver.resolve_record(&mut registry, &mut mappings, dataset, record)?
        {
            resolved.push(record);
        }
    }
    Ok(ResolvedSource {
        registry,
        mappings,
        records: resolved,
    })
}

// ============================================================================
// Stages 1-4 for one source
// ============================================================================

pub struct SourceContext<'a> {
    pub config: &'a EtlConfig,
    pub resolver: &'a EntityResolver,
    pub input_dir: &'a Path,
    /// Dimensions after every previously processed source.
    pub registry: &'a DimensionRegistry,
}

/// Runs ingest, resolve, assemble and source validation.
pub fn process_source(
    context: &SourceContext<'_>,
    source: &SourceSpec,
) -> Result<(SourceDataset, SourceSummary)> {
    let dataset = DatasetId::new(&source.dataset)?;
    let provenance = Provenance {
        year: source.year,
        dataset: dataset.clone(),
    };

    let ingest_span = info_span!("ingest", dataset = %dataset);
    let ingest_start = Instant::now();
    let ingested = ingest_span.in_scope(|| ingest(context.input_dir, source))?;
    info!(
        dataset = %dataset,
        file = %ingested.path.display(),
        encoding = ingested.encoding,
        rows = ingested.rows_read,
        records = ingested.records.len(),
        duration_ms = ingest_start.elapsed().as_millis(),
        "ingest complete"
    );

    let resolve_span = info_span!("resolve", dataset = %dataset);
    let resolve_start = Instant::now();
    let resolved = resolve_span.in_scope(|| {
        resolve(
            context.registry,
            context.resolver,
            &dataset,
            &ingested.records,
        )
    })?;
    let dropped = ingested.records.len() - resolved.records.len();
    info!(
        dataset = %dataset,
        kept = resolved.records.len(),
        dropped,
        labels = resolved.mappings.len(),
        duration_ms = resolve_start.elapsed().as_millis(),
        "resolve complete"
    );
    if resolved.records.is_empty() {
        bail!("no row of {} resolved", ingested.path.display());
    }

    let assemble_span = info_span!("assemble", dataset = %dataset);
    let assemble_start = Instant::now();
    let facts = assemble_span.in_scope(|| {
        FactAssembler::new(context.config, provenance.clone()).assemble(
            source.layout,
            &resolved.records,
            &resolved.registry,
        )
    })?;
    let fact_rows: usize = facts.iter().map(FactTable::len).sum();
    info!(
        dataset = %dataset,
        tables = facts.len(),
        fact_rows,
        duration_ms = assemble_start.elapsed().as_millis(),
        "assemble complete"
    );

    let validate_span = info_span!("validate", dataset = %dataset);
    let report = validate_span.in_scope(|| {
        let relationships = relationships_of(&facts);
        validate(
            dataset.as_str(),
            &ValidationInput {
                registry: &resolved.registry,
                facts: &facts,
                mappings: Some(&resolved.mappings),
                relationships: &relationships,
            },
            &context.config.validation,
        )
    })?;

    let summary = SourceSummary {
        dataset: source.dataset.clone(),
        year: source.year,
        layout: source.layout,
        file: file_name(&ingested.path),
        encoding: ingested.encoding,
        rows_read: ingested.rows_read,
        records_kept: resolved.records.len(),
        fact_rows,
        fatal: report.fatal_count(),
        warnings: report.warning_count(),
    };
    let dataset = SourceDataset {
        provenance,
        layout: source.layout,
        registry: resolved.registry,
        mappings: resolved.mappings,
        facts,
        report,
    };
    Ok((dataset, summary))
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("unknown")
        .to_string()
}

// ============================================================================
// Stage 5: Consolidate
// ============================================================================

/// Merges the loaded sources and appends the temporal evolution facts.
pub fn consolidate(consolidator: Consolidator, precision: u32) -> Result<Consolidation> {
    let mut consolidation = consolidator.finish().context("consolidate sources")?;
    if let Some(evolution) = temporal_evolution(&consolidation.facts, precision)
        .context("build temporal evolution")?
    {
        debug!(rows = evolution.len(), "temporal evolution appended");
        consolidation.facts.push(evolution);
    }
    Ok(consolidation)
}

// ============================================================================
// Stage 6: Validate
// ============================================================================

pub fn validate_consolidation(
    consolidation: &Consolidation,
    config: &EtlConfig,
) -> Result<ValidationReport> {
    let relationships = relationships_of(&consolidation.facts);
    let report = validate(
        "consolidated",
        &ValidationInput {
            registry: &consolidation.registry,
            facts: &consolidation.facts,
            mappings: Some(&consolidation.mappings),
            relationships: &relationships,
        },
        &config.validation,
    )
    .context("validate consolidated tables")?;
    Ok(report)
}

// ============================================================================
// Stage 7: Export
// ============================================================================

/// Result of the export stage.
#[derive(Debug, Default)]
pub struct ExportOutcome {
    pub manifest: Option<PathBuf>,
    pub round_trip: Option<Vec<String>>,
}

pub fn export_consolidation(
    consolidation: &Consolidation,
    report: &ValidationReport,
    config: &EtlConfig,
    verify: bool,
) -> Result<ExportOutcome> {
    let options = ExportOptions {
        prefix: config.prefix.clone(),
        precision: config.assembly.precision,
    };
    let request = ExportRequest {
        registry: &consolidation.registry,
        facts: &consolidation.facts,
        mappings: Some(&consolidation.mappings),
        report: Some(report),
    };
    let manifest = export(&config.output_dir, &options, &request)
        .with_context(|| format!("export to {}", config.output_dir.display()))?;
    let manifest_path = config.output_dir.join(manifest_file_name(&manifest.prefix));

    let round_trip = if verify {
        let differences = verify_round_trip(&config.output_dir, &options, &request)
            .context("re-import exported tables")?;
        for difference in &differences {
            warn!(%difference, "re-import mismatch");
        }
        Some(differences)
    } else {
        None
    };
    Ok(ExportOutcome {
        manifest: Some(manifest_path),
        round_trip,
    })
}

// ============================================================================
// Full run
// ============================================================================

/// Runs every stage for the sources of `config`.
///
/// Fails only when the run cannot produce anything: the catalog does not
/// load, no source loads, or export I/O fails.
pub fn run(config: &EtlConfig, flags: RunFlags) -> Result<RunResult> {
    let catalog = Catalog::builtin().context("load reference catalog")?;
    let resolver = EntityResolver::from_catalog(&catalog, config.resolution.clone())
        .context("build entity resolver")?;
    let input_dir = config
        .input_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from("."));
    let base = catalog.seeded_registry().context("seed registry")?;
    let mut current = base.clone();
    let mut consolidator = Consolidator::new(base, config.source_order);
    let mut sources = Vec::new();
    let mut errors = Vec::new();
    for source in config.ordered_sources() {
        let source_span = info_span!("source", dataset = %source.dataset, year = source.year);
        let _source_guard = source_span.enter();
        let context = SourceContext {
            config,
            resolver: &resolver,
            input_dir: &input_dir,
            registry: &current,
        };
        match process_source(&context, source) {
            Ok((dataset, summary)) => {
                // later sources resolve against this source's additions
                current = dataset.registry.clone();
                consolidator.add(dataset);
                sources.push(summary);
            }
            Err(error) => {
                let reason = format!("{error:#}");
                if source.required {
                    error!(dataset = %source.dataset, %reason, "required source unavailable");
                    errors.push(format!("{}: {reason}", source.dataset));
                }
                consolidator.skip(source.dataset.clone(), source.year, reason);
            }
        }
    }
    if sources.is_empty() {
        bail!(
            "none of the {} configured sources could be loaded",
            config.sources.len()
        );
    }

    let consolidate_span = info_span!("consolidate");
    let consolidate_start = Instant::now();
    let consolidation = consolidate_span
        .in_scope(|| consolidate(consolidator, config.assembly.precision))?;
    info!(
        sources = consolidation.merged.len(),
        skipped = consolidation.skipped.len(),
        dimension_rows = consolidation.registry.total_rows(),
        fact_tables = consolidation.facts.len(),
        duration_ms = consolidate_start.elapsed().as_millis(),
        "consolidate complete"
    );

    let validate_span = info_span!("validate", dataset = "consolidated");
    let report = validate_span.in_scope(|| validate_consolidation(&consolidation, config))?;
    let gate = gate_export(&report, flags.force);

    let export_span = info_span!("export", prefix = %config.prefix);
    let outcome = export_span.in_scope(|| {
        if flags.dry_run {
            info!("dry run, nothing written");
            return Ok(ExportOutcome::default());
        }
        if let ExportGate::Blocked { fatal } = gate {
            error!(fatal, "export blocked by fatal violations");
            return Ok(ExportOutcome::default());
        }
        let export_start = Instant::now();
        let outcome = export_consolidation(&consolidation, &report, config, flags.verify)?;
        info!(
            dir = %config.output_dir.display(),
            duration_ms = export_start.elapsed().as_millis(),
            "export complete"
        );
        Ok::<_, anyhow::Error>(outcome)
    })?;
    if let ExportGate::Blocked { fatal } = gate {
        errors.push(format!(
            "export blocked: {fatal} fatal violation(s); use --force to export anyway"
        ));
    }

    Ok(RunResult {
        output_dir: config.output_dir.clone(),
        prefix: config.prefix.clone(),
        sources,
        skipped: consolidation.skipped.clone(),
        tables: table_summaries(&consolidation),
        mapping_stats: consolidation.mappings.stats(),
        report,
        gate,
        manifest: outcome.manifest,
        round_trip: outcome.round_trip,
        errors,
    })
}

fn table_summaries(consolidation: &Consolidation) -> Vec<TableSummary> {
    let mut tables: Vec<TableSummary> = consolidation
        .registry
        .tables()
        .map(|dimension| summarize(&dimension.to_table(), TableKind::Dimension))
        .collect();
    tables.extend(
        consolidation
            .facts
            .iter()
            .map(|fact| summarize(fact, TableKind::Fact)),
    );
    tables.push(summarize(
        &consolidation.mappings.to_table(),
        TableKind::Mapping,
    ));
    tables
}

fn summarize(table: &FactTable, kind: TableKind) -> TableSummary {
    TableSummary {
        name: table.name.clone(),
        kind,
        rows: table.len(),
        columns: table.width(),
    }
}

/// Violations of `table` in `report`, as (fatal, warnings).
pub fn violation_counts(report: &ValidationReport, table: &str) -> (usize, usize) {
    report
        .violations
        .iter()
        .filter(|violation| violation.table == table)
        .fold((0, 0), |(fatal, warnings), violation| match violation.severity {
            Severity::Fatal => (fatal + 1, warnings),
            Severity::Warning => (fatal, warnings + 1),
        })
}
