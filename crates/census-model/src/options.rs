//! Run configuration, deserialized from TOML.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};
use crate::{EntityType, RuleKind, Severity};

/// Known source layouts; each has one schema adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceLayout {
    PopulationByNationality,
    PermitsByNationalitySex,
    EducationLong,
    EducationWide,
    EmploymentBySector,
    EmploymentBySituation,
    ConditionByNationality,
    OccupationBySex,
    PermitsByMotiveWide,
    PermitsByMotiveLong,
    PopulationByRegion,
}

impl SourceLayout {
    pub const ALL: [SourceLayout; 11] = [
        SourceLayout::PopulationByNationality,
        SourceLayout::PermitsByNationalitySex,
        SourceLayout::EducationLong,
        SourceLayout::EducationWide,
        SourceLayout::EmploymentBySector,
        SourceLayout::EmploymentBySituation,
        SourceLayout::ConditionByNationality,
        SourceLayout::OccupationBySex,
        SourceLayout::PermitsByMotiveWide,
        SourceLayout::PermitsByMotiveLong,
        SourceLayout::PopulationByRegion,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SourceLayout::PopulationByNationality => "population_by_nationality",
            SourceLayout::PermitsByNationalitySex => "permits_by_nationality_sex",
            SourceLayout::EducationLong => "education_long",
            SourceLayout::EducationWide => "education_wide",
            SourceLayout::EmploymentBySector => "employment_by_sector",
            SourceLayout::EmploymentBySituation => "employment_by_situation",
            SourceLayout::ConditionByNationality => "condition_by_nationality",
            SourceLayout::OccupationBySex => "occupation_by_sex",
            SourceLayout::PermitsByMotiveWide => "permits_by_motive_wide",
            SourceLayout::PermitsByMotiveLong => "permits_by_motive_long",
            SourceLayout::PopulationByRegion => "population_by_region",
        }
    }
}

impl fmt::Display for SourceLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Order in which sources are resolved against the shared registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceOrder {
    /// By year, ties broken by declaration order.
    #[default]
    Chronological,
    /// Exactly as declared.
    Declared,
}

/// One logical input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceSpec {
    pub dataset: String,
    pub year: i32,
    pub layout: SourceLayout,
    /// Filename variants tried in order, relative to the input directory.
    pub candidates: Vec<String>,
    #[serde(default)]
    pub delimiter: Option<char>,
    /// A missing required source is still non-fatal, but is logged as an error.
    #[serde(default)]
    pub required: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssemblyOptions {
    /// Decimal places for percentages and indices.
    pub precision: u32,
    /// Keep zero/missing measures and emit full category coverage.
    pub include_zero_rows: bool,
}

impl Default for AssemblyOptions {
    fn default() -> Self {
        Self {
            precision: 2,
            include_zero_rows: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationOptions {
    /// Minimum non-null rate (%) for required columns.
    pub completeness_threshold: f64,
    pub percent_min: f64,
    pub percent_max: f64,
    pub count_min: f64,
    /// Treat range violations as fatal.
    pub range_fatal: bool,
    pub severity_overrides: BTreeMap<RuleKind, Severity>,
    /// Required columns per table; the primary key and the first measure
    /// column are required when a table is not listed.
    pub required_columns: BTreeMap<String, Vec<String>>,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            completeness_threshold: 95.0,
            percent_min: 0.0,
            percent_max: 100.0,
            count_min: 0.0,
            range_fatal: false,
            severity_overrides: BTreeMap::new(),
            required_columns: BTreeMap::new(),
        }
    }
}

impl ValidationOptions {
    /// Effective severity: explicit override, then `range_fatal`, then the rule default.
    pub fn severity_for(&self, rule: RuleKind) -> Severity {
        if let Some(severity) = self.severity_overrides.get(&rule) {
            return *severity;
        }
        if rule == RuleKind::Range && self.range_fatal {
            return Severity::Fatal;
        }
        rule.default_severity()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolutionOptions {
    pub auto_create: BTreeMap<EntityType, bool>,
}

impl ResolutionOptions {
    pub fn allows_auto_create(&self, entity: EntityType) -> bool {
        self.auto_create
            .get(&entity)
            .copied()
            .unwrap_or_else(|| entity.auto_create_default())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EtlConfig {
    /// Prefix of every exported file name.
    pub prefix: String,
    pub input_dir: Option<PathBuf>,
    pub output_dir: PathBuf,
    pub source_order: SourceOrder,
    pub assembly: AssemblyOptions,
    pub validation: ValidationOptions,
    pub resolution: ResolutionOptions,
    /// Composite-index weight per education level canonical name; the
    /// level rank is used when a level is not listed.
    pub weights: BTreeMap<String, f64>,
    pub sources: Vec<SourceSpec>,
}

impl Default for EtlConfig {
    fn default() -> Self {
        Self {
            prefix: "DW".to_string(),
            input_dir: None,
            output_dir: PathBuf::from("output"),
            source_order: SourceOrder::default(),
            assembly: AssemblyOptions::default(),
            validation: ValidationOptions::default(),
            resolution: ResolutionOptions::default(),
            weights: BTreeMap::new(),
            sources: Vec::new(),
        }
    }
}

impl EtlConfig {
    pub fn validate(&self) -> Result<()> {
        if self.prefix.trim().is_empty() || self.prefix.contains(['/', '\\']) {
            return Err(ModelError::InvalidConfig(format!(
                "prefix {:?} is not a valid file name prefix",
                self.prefix
            )));
        }
        if self.assembly.precision > 6 {
            return Err(ModelError::InvalidConfig(format!(
                "precision {} exceeds 6 decimals",
                self.assembly.precision
            )));
        }
        let threshold = self.validation.completeness_threshold;
        if !(0.0..=100.0).contains(&threshold) {
            return Err(ModelError::InvalidConfig(format!(
                "completeness threshold {threshold} is outside 0..=100"
            )));
        }
        if self.validation.percent_min > self.validation.percent_max {
            return Err(ModelError::InvalidConfig(
                "percent_min is greater than percent_max".to_string(),
            ));
        }
        let mut seen = BTreeSet::new();
        for source in &self.sources {
            if source.candidates.is_empty() {
                return Err(ModelError::InvalidConfig(format!(
                    "source {} lists no candidate files",
                    source.dataset
                )));
            }
            if !seen.insert(source.dataset.as_str()) {
                return Err(ModelError::InvalidConfig(format!(
                    "duplicate source dataset {}",
                    source.dataset
                )));
            }
        }
        Ok(())
    }

    /// Sources in processing order.
    pub fn ordered_sources(&self) -> Vec<&SourceSpec> {
        let mut sources: Vec<&SourceSpec> = self.sources.iter().collect();
        if self.source_order == SourceOrder::Chronological {
            // stable: ties keep declaration order
            sources.sort_by_key(|source| source.year);
        }
        sources
    }

    /// Weight for an education level in the composite index.
    pub fn weight_for(&self, level: &str, rank: Option<u32>) -> f64 {
        self.weights
            .get(level)
            .copied()
            .unwrap_or_else(|| f64::from(rank.unwrap_or(0)))
    }
}
