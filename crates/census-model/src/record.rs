//! Intermediate records passed from schema adapters through resolution.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{EntityType, SurrogateKey};

/// A raw label bound to the entity type it should resolve against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelRef {
    pub entity: EntityType,
    pub raw: String,
}

impl LabelRef {
    pub fn new(entity: EntityType, raw: impl Into<String>) -> Self {
        Self {
            entity,
            raw: raw.into(),
        }
    }
}

/// Measure cells of one source row, before resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RawMeasure {
    Single(Option<f64>),
    /// Separate male/female columns; `total` is kept when the source has one.
    BySex {
        male: Option<f64>,
        female: Option<f64>,
        total: Option<f64>,
    },
    /// One column per category (column header is the raw category label).
    Wide {
        entity: EntityType,
        cells: Vec<(String, Option<f64>)>,
    },
}

/// Uniform output of a schema adapter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceRecord {
    /// 1-based data line in the source (after the header).
    pub line: usize,
    pub labels: Vec<LabelRef>,
    pub measure: RawMeasure,
}

impl SourceRecord {
    pub fn new(line: usize, labels: Vec<LabelRef>, measure: RawMeasure) -> Self {
        Self {
            line,
            labels,
            measure,
        }
    }

    /// Adds a label unless the cell is blank; for optional columns.
    #[must_use]
    pub fn with_optional_label(mut self, entity: EntityType, raw: &str) -> Self {
        if !raw.trim().is_empty() {
            self.labels.push(LabelRef::new(entity, raw));
        }
        self
    }
}

/// Measure cells after category labels were resolved to keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ResolvedMeasure {
    Single(Option<f64>),
    BySex {
        male: (SurrogateKey, Option<f64>),
        female: (SurrogateKey, Option<f64>),
        total: Option<f64>,
    },
    Wide {
        entity: EntityType,
        cells: Vec<(SurrogateKey, Option<f64>)>,
    },
}

/// A source record whose labels all resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedRecord {
    pub line: usize,
    pub keys: BTreeMap<EntityType, SurrogateKey>,
    pub measure: ResolvedMeasure,
}

impl ResolvedRecord {
    pub fn key(&self, entity: EntityType) -> Option<SurrogateKey> {
        self.keys.get(&entity).copied()
    }
}
