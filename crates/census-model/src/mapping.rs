//! Raw label to surrogate key associations collected during resolution.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::fact::{ColumnRole, FactColumn, FactTable, SOURCE_COLUMN, Value};
use crate::{DatasetId, EntityType, SurrogateKey};

/// Exported name of the mapping table.
pub const MAPPING_TABLE: &str = "Map_Etiquetas";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MappingTag {
    /// Label matched a canonical name.
    Exact,
    /// Label matched a registered variant or a classification rule.
    Variant,
    /// Label created a new dimension entry.
    New,
    /// Label could not be matched and the entity type is closed.
    Unmapped,
}

impl MappingTag {
    pub fn as_str(self) -> &'static str {
        match self {
            MappingTag::Exact => "exact",
            MappingTag::Variant => "variant",
            MappingTag::New => "new",
            MappingTag::Unmapped => "unmapped",
        }
    }

    pub fn is_mapped(self) -> bool {
        !matches!(self, MappingTag::Unmapped)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappingEntry {
    pub entity: EntityType,
    pub raw_label: String,
    pub key: Option<SurrogateKey>,
    pub tag: MappingTag,
    pub occurrences: u64,
    pub dataset: DatasetId,
}

/// Per-entity occurrence counts by outcome.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingStats {
    pub exact: u64,
    pub variant: u64,
    pub new: u64,
    pub unmapped: u64,
    /// Labels rejected as non-entities (headers, totals, footnotes).
    pub excluded: u64,
}

impl MappingStats {
    pub fn mapped(&self) -> u64 {
        self.exact + self.variant + self.new
    }

    pub fn total(&self) -> u64 {
        self.mapped() + self.unmapped
    }

    /// Share of resolvable occurrences that got a key, in percent.
    pub fn mapping_rate(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        self.mapped() as f64 / total as f64 * 100.0
    }

    fn add(&mut self, tag: MappingTag, occurrences: u64) {
        match tag {
            MappingTag::Exact => self.exact += occurrences,
            MappingTag::Variant => self.variant += occurrences,
            MappingTag::New => self.new += occurrences,
            MappingTag::Unmapped => self.unmapped += occurrences,
        }
    }
}

/// One entry per (dataset, entity, raw label); repeats bump `occurrences`.
#[derive(Debug, Clone, Default)]
pub struct MappingTable {
    entries: Vec<MappingEntry>,
    index: HashMap<(DatasetId, EntityType, String), usize>,
    excluded: BTreeMap<EntityType, u64>,
}

impl MappingTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[MappingEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn record(
        &mut self,
        dataset: &DatasetId,
        entity: EntityType,
        raw_label: &str,
        key: Option<SurrogateKey>,
        tag: MappingTag,
    ) {
        let index_key = (dataset.clone(), entity, raw_label.to_string());
        if let Some(&idx) = self.index.get(&index_key) {
            self.entries[idx].occurrences += 1;
            return;
        }
        self.index.insert(index_key, self.entries.len());
        self.entries.push(MappingEntry {
            entity,
            raw_label: raw_label.to_string(),
            key,
            tag,
            occurrences: 1,
            dataset: dataset.clone(),
        });
    }

    pub fn record_excluded(&mut self, entity: EntityType) {
        *self.excluded.entry(entity).or_default() += 1;
    }

    /// Rewrites keys of `entity` through `remap` (old key -> new key).
    pub fn remap_keys(
        &mut self,
        entity: EntityType,
        remap: &BTreeMap<SurrogateKey, SurrogateKey>,
    ) {
        for entry in self.entries.iter_mut().filter(|entry| entry.entity == entity) {
            if let Some(key) = entry.key.and_then(|key| remap.get(&key)) {
                entry.key = Some(*key);
            }
        }
    }

    /// Appends all entries and exclusion counts of `other`.
    pub fn extend(&mut self, other: MappingTable) {
        for entry in other.entries {
            let index_key = (entry.dataset.clone(), entry.entity, entry.raw_label.clone());
            match self.index.get(&index_key) {
                Some(&idx) => self.entries[idx].occurrences += entry.occurrences,
                None => {
                    self.index.insert(index_key, self.entries.len());
                    self.entries.push(entry);
                }
            }
        }
        for (entity, count) in other.excluded {
            *self.excluded.entry(entity).or_default() += count;
        }
    }

    /// `Map_Etiquetas` rows, one per entry, numbered from 1.
    pub fn to_table(&self) -> FactTable {
        let columns = vec![
            FactColumn::new("mapeamento_id", ColumnRole::PrimaryKey),
            FactColumn::new("entidade", ColumnRole::Attribute),
            FactColumn::new("etiqueta_original", ColumnRole::Attribute),
            FactColumn::new("chave", ColumnRole::Attribute),
            FactColumn::new("compatibilidade", ColumnRole::Attribute),
            FactColumn::new("ocorrencias", ColumnRole::Count),
            FactColumn::new(SOURCE_COLUMN, ColumnRole::Source),
        ];
        let mut table = FactTable::new(MAPPING_TABLE, columns);
        for (idx, entry) in self.entries.iter().enumerate() {
            table.rows.push(vec![
                Value::Int(idx as i64 + 1),
                Value::Text(entry.entity.as_str().to_string()),
                Value::Text(entry.raw_label.clone()),
                entry.key.map_or(Value::Null, |key| Value::Int(i64::from(key))),
                Value::Text(entry.tag.as_str().to_string()),
                Value::Int(entry.occurrences as i64),
                Value::Text(entry.dataset.to_string()),
            ]);
        }
        table
    }

    pub fn stats(&self) -> BTreeMap<EntityType, MappingStats> {
        let mut stats: BTreeMap<EntityType, MappingStats> = BTreeMap::new();
        for entry in &self.entries {
            stats
                .entry(entry.entity)
                .or_default()
                .add(entry.tag, entry.occurrences);
        }
        for (entity, count) in &self.excluded {
            stats.entry(*entity).or_default().excluded += count;
        }
        stats
    }
}
