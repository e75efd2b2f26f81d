//! Data model for the census star schema.
//!
//! Dimension tables ([`DimensionRegistry`]), fact tables ([`FactTable`]),
//! the label [`MappingTable`], the integrity [`ValidationReport`], the
//! intermediate records exchanged between stages, and the run
//! configuration ([`EtlConfig`]).

pub mod dimension;
pub mod entity;
pub mod error;
pub mod fact;
pub mod ids;
pub mod label;
pub mod mapping;
pub mod options;
pub mod record;
pub mod report;

pub use dimension::{
    AGGREGATE_COLUMN, DimensionAttributes, DimensionRecord, DimensionRegistry, DimensionTable,
    RANK_COLUMN,
};
pub use entity::EntityType;
pub use error::{ModelError, Result};
pub use fact::{
    ColumnRole, FactColumn, FactTable, Provenance, Relationship, SOURCE_COLUMN, Value,
    YEAR_COLUMN,
};
pub use ids::{DatasetId, SurrogateKey};
pub use label::{fold_letter, label_key, tidy_label};
pub use mapping::{MAPPING_TABLE, MappingEntry, MappingStats, MappingTable, MappingTag};
pub use options::{
    AssemblyOptions, EtlConfig, ResolutionOptions, SourceLayout, SourceOrder, SourceSpec,
    ValidationOptions,
};
pub use record::{LabelRef, RawMeasure, ResolvedMeasure, ResolvedRecord, SourceRecord};
pub use report::{RuleGroup, RuleKind, Severity, ValidationReport, Violation};
