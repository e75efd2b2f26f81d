//! Merges per-source registries, mappings and facts into one dataset.
//!
//! Sources are merged one at a time in a fixed order. Each source's
//! dimension entries are matched against the consolidated registry as it
//! stands after every earlier source (canonical name first, then known
//! variants); unmatched entries are appended. Fact FKs and mapping keys are
//! rewritten through the resulting key map, fact tables are concatenated
//! and their primary keys renumbered.

use std::collections::BTreeMap;

use census_model::{
    DimensionAttributes, DimensionRecord, DimensionRegistry, EntityType, FactTable, MappingTable,
    SourceOrder, SurrogateKey, Value,
};
use census_transform::KeySequence;
use tracing::{debug, info, warn};

use crate::error::{ConsolidateError, Result};
use crate::source::{MergedSource, SkippedSource, SourceDataset};

/// Consolidated cross-year dataset.
#[derive(Debug, Clone)]
pub struct Consolidation {
    pub registry: DimensionRegistry,
    pub facts: Vec<FactTable>,
    pub mappings: MappingTable,
    pub merged: Vec<MergedSource>,
    pub skipped: Vec<SkippedSource>,
}

impl Consolidation {
    pub fn fact(&self, name: &str) -> Option<&FactTable> {
        self.facts.iter().find(|table| table.name == name)
    }

    /// Distinct reference years, ascending.
    pub fn years(&self) -> Vec<i32> {
        let mut years: Vec<i32> = self.merged.iter().map(|source| source.year).collect();
        years.sort_unstable();
        years.dedup();
        years
    }
}

/// Old source key to consolidated key, per entity.
type KeyMap = BTreeMap<EntityType, BTreeMap<SurrogateKey, SurrogateKey>>;

pub struct Consolidator {
    registry: DimensionRegistry,
    order: SourceOrder,
    sources: Vec<SourceDataset>,
    skipped: Vec<SkippedSource>,
}

impl Consolidator {
    /// Starts from `base`, usually the seeded reference catalog.
    pub fn new(base: DimensionRegistry, order: SourceOrder) -> Self {
        Self {
            registry: base,
            order,
            sources: Vec::new(),
            skipped: Vec::new(),
        }
    }

    pub fn add(&mut self, source: SourceDataset) {
        self.sources.push(source);
    }

    /// Records a source that could not be loaded; consolidation proceeds.
    pub fn skip(&mut self, dataset: impl Into<String>, year: i32, reason: impl Into<String>) {
        let skipped = SkippedSource {
            dataset: dataset.into(),
            year,
            reason: reason.into(),
        };
        warn!(dataset = %skipped.dataset, reason = %skipped.reason, "source skipped");
        self.skipped.push(skipped);
    }

    pub fn finish(self) -> Result<Consolidation> {
        let Self {
            mut registry,
            order,
            mut sources,
            skipped,
        } = self;
        if order == SourceOrder::Chronological {
            sources.sort_by_key(|source| source.provenance.year);
        }

        let mut facts: Vec<FactTable> = Vec::new();
        let mut mappings = MappingTable::new();
        let mut merged = Vec::with_capacity(sources.len());
        for source in sources {
            let dataset = source.provenance.dataset.to_string();
            let before = registry.total_rows();
            let keys = merge_registry(&mut registry, &source.registry)?;
            let remapped_keys = keys
                .values()
                .flat_map(BTreeMap::iter)
                .filter(|(old, new)| old != new)
                .count();

            let mut fact_rows = 0;
            for mut table in source.facts {
                remap_foreign_keys(&mut table, &keys);
                fact_rows += table.len();
                append_facts(&mut facts, table, &dataset)?;
            }

            let mut source_mappings = source.mappings;
            for (entity, remap) in &keys {
                source_mappings.remap_keys(*entity, remap);
            }
            mappings.extend(source_mappings);

            let new_entries = registry.total_rows() - before;
            debug!(
                dataset = %dataset,
                new_entries,
                remapped_keys,
                fact_rows,
                "merged source"
            );
            merged.push(MergedSource {
                dataset,
                year: source.provenance.year,
                layout: source.layout,
                fact_rows,
                new_entries,
                remapped_keys,
            });
        }

        for table in &mut facts {
            renumber_primary_keys(table);
        }
        info!(
            sources = merged.len(),
            skipped = skipped.len(),
            dimension_rows = registry.total_rows(),
            fact_tables = facts.len(),
            "consolidation finished"
        );
        Ok(Consolidation {
            registry,
            facts,
            mappings,
            merged,
            skipped,
        })
    }
}

fn attributes_of(record: &DimensionRecord) -> DimensionAttributes {
    DimensionAttributes {
        rank: record.rank,
        aggregate: record.aggregate,
        extra: record.attributes.clone(),
    }
}

/// Maps every entry of `source` into `target`, appending what is new.
fn merge_registry(target: &mut DimensionRegistry, source: &DimensionRegistry) -> Result<KeyMap> {
    let mut keys = KeyMap::new();
    for table in source.tables() {
        let entity = table.entity();
        let merged = target.table_mut(entity);
        let remap = keys.entry(entity).or_default();
        for record in table.records() {
            let existing = merged
                .key_of(&record.canonical_name)
                .or_else(|| merged.variant_key(&record.canonical_name));
            let key = match existing {
                Some(existing) => existing,
                None => merged.ensure(&record.canonical_name, attributes_of(record))?,
            };
            for variant in &record.variants {
                if let Err(err) = merged.add_variant(key, variant) {
                    warn!(%entity, %err, "variant not carried over");
                }
            }
            remap.insert(record.key, key);
        }
    }
    Ok(keys)
}

fn remap_foreign_keys(table: &mut FactTable, keys: &KeyMap) {
    let columns: Vec<(usize, EntityType)> = table.foreign_keys().collect();
    for (idx, entity) in columns {
        let Some(remap) = keys.get(&entity) else {
            continue;
        };
        for row in &mut table.rows {
            let Value::Int(value) = row[idx] else {
                continue;
            };
            let new = SurrogateKey::try_from(value)
                .ok()
                .and_then(|key| remap.get(&key));
            if let Some(new) = new {
                row[idx] = Value::Int(i64::from(*new));
            }
        }
    }
}

fn append_facts(facts: &mut Vec<FactTable>, table: FactTable, dataset: &str) -> Result<()> {
    match facts.iter_mut().find(|existing| existing.name == table.name) {
        Some(existing) => {
            if existing.columns != table.columns {
                return Err(ConsolidateError::ColumnMismatch {
                    table: table.name,
                    dataset: dataset.to_string(),
                });
            }
            existing.rows.extend(table.rows);
        }
        None => facts.push(table),
    }
    Ok(())
}

/// Sequential keys across the concatenated table, in row order.
fn renumber_primary_keys(table: &mut FactTable) {
    let Some(pk) = table.primary_key_index() else {
        return;
    };
    let mut sequence = KeySequence::new();
    for row in &mut table.rows {
        row[pk] = Value::Int(sequence.next_key());
    }
}
