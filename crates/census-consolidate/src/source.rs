use census_model::{
    DimensionRegistry, FactTable, MappingTable, Provenance, SourceLayout, ValidationReport,
};

/// Everything one source produced, built independently of other sources.
#[derive(Debug, Clone)]
pub struct SourceDataset {
    pub provenance: Provenance,
    pub layout: SourceLayout,
    pub registry: DimensionRegistry,
    pub mappings: MappingTable,
    pub facts: Vec<FactTable>,
    /// Validation of this source before consolidation.
    pub report: ValidationReport,
}

/// A configured source that produced nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedSource {
    pub dataset: String,
    pub year: i32,
    pub reason: String,
}

/// Per-source line of the consolidation summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedSource {
    pub dataset: String,
    pub year: i32,
    pub layout: SourceLayout,
    pub fact_rows: usize,
    /// Dimension entries this source added to the consolidated registry.
    pub new_entries: usize,
    /// Source keys that changed when mapped into the consolidated registry.
    pub remapped_keys: usize,
}
