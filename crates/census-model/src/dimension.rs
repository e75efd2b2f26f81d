//! Dimension tables and the registry that owns them.
//!
//! A [`DimensionTable`] is append-only: surrogate keys are handed out from a
//! monotonically increasing counter starting at 1 and are never reused or
//! renumbered. Canonical names and variants are indexed by
//! [`label_key`](crate::label_key), so `ensure` is idempotent for any
//! spelling that folds to the same key.
//!
//! Mutation requires `&mut DimensionRegistry`; the borrow checker gives each
//! dimension a single writer for the duration of a resolution pass.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};
use crate::fact::{ColumnRole, FactColumn, FactTable, Value};
use crate::label::{label_key, tidy_label};
use crate::{EntityType, SurrogateKey};

/// Rank column of ranked dimensions.
pub const RANK_COLUMN: &str = "ordem";
/// Roll-up flag column of dimensions with aggregates.
pub const AGGREGATE_COLUMN: &str = "agregado";

/// Descriptive attributes supplied when an entry is first created.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DimensionAttributes {
    pub rank: Option<u32>,
    pub aggregate: bool,
    pub extra: BTreeMap<String, String>,
}

impl DimensionAttributes {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_rank(mut self, rank: u32) -> Self {
        self.rank = Some(rank);
        self
    }

    #[must_use]
    pub fn aggregate(mut self) -> Self {
        self.aggregate = true;
        self
    }

    #[must_use]
    pub fn with(mut self, column: &str, value: impl Into<String>) -> Self {
        self.extra.insert(column.to_string(), value.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionRecord {
    pub key: SurrogateKey,
    pub canonical_name: String,
    pub rank: Option<u32>,
    pub aggregate: bool,
    pub attributes: BTreeMap<String, String>,
    /// Known alternative spellings, as first seen.
    pub variants: BTreeSet<String>,
}

impl DimensionRecord {
    pub fn attribute(&self, column: &str) -> Option<&str> {
        self.attributes.get(column).map(String::as_str)
    }
}

#[derive(Debug, Clone)]
pub struct DimensionTable {
    entity: EntityType,
    records: Vec<DimensionRecord>,
    by_key: BTreeMap<SurrogateKey, usize>,
    by_name: HashMap<String, SurrogateKey>,
    by_variant: HashMap<String, SurrogateKey>,
    next_key: SurrogateKey,
}

impl DimensionTable {
    pub fn new(entity: EntityType) -> Self {
        Self {
            entity,
            records: Vec::new(),
            by_key: BTreeMap::new(),
            by_name: HashMap::new(),
            by_variant: HashMap::new(),
            next_key: SurrogateKey::FIRST,
        }
    }

    pub fn entity(&self) -> EntityType {
        self.entity
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[DimensionRecord] {
        &self.records
    }

    pub fn keys(&self) -> impl Iterator<Item = SurrogateKey> + '_ {
        self.by_key.keys().copied()
    }

    /// Key the next new entry will receive.
    pub fn next_key(&self) -> SurrogateKey {
        self.next_key
    }

    pub fn get(&self, key: SurrogateKey) -> Option<&DimensionRecord> {
        self.by_key.get(&key).map(|&idx| &self.records[idx])
    }

    /// Looks up a canonical name (not variants).
    pub fn key_of(&self, name: &str) -> Option<SurrogateKey> {
        self.by_name.get(&label_key(name)).copied()
    }

    /// Looks up a registered variant spelling.
    pub fn variant_key(&self, label: &str) -> Option<SurrogateKey> {
        self.by_variant.get(&label_key(label)).copied()
    }

    /// Returns the key for `canonical_name`, creating the entry on first use.
    ///
    /// Attributes of an existing entry are never overwritten.
    pub fn ensure(
        &mut self,
        canonical_name: &str,
        attributes: DimensionAttributes,
    ) -> Result<SurrogateKey> {
        let name = tidy_label(canonical_name);
        if name.is_empty() {
            return Err(ModelError::EmptyCanonicalName(self.entity));
        }
        let key = label_key(&name);
        if let Some(existing) = self.by_name.get(&key) {
            return Ok(*existing);
        }
        let assigned = self.next_key;
        self.push(assigned, name, key, attributes);
        Ok(assigned)
    }

    /// Inserts an entry under an explicit key.
    ///
    /// Re-inserting the same name under the same key is a no-op. A key that
    /// already names a different entity, or a name already held by another
    /// key, is rejected.
    pub fn insert_with_key(
        &mut self,
        key: SurrogateKey,
        canonical_name: &str,
        attributes: DimensionAttributes,
    ) -> Result<SurrogateKey> {
        let name = tidy_label(canonical_name);
        if name.is_empty() {
            return Err(ModelError::EmptyCanonicalName(self.entity));
        }
        let name_key = label_key(&name);
        if let Some(record) = self.get(key) {
            if label_key(&record.canonical_name) == name_key {
                return Ok(key);
            }
            return Err(ModelError::KeyReuse {
                entity: self.entity,
                key,
                existing: record.canonical_name.clone(),
                requested: name,
            });
        }
        if let Some(existing) = self.by_name.get(&name_key) {
            return Err(ModelError::DuplicateCanonicalName {
                entity: self.entity,
                name,
                key: *existing,
            });
        }
        self.push(key, name, name_key, attributes);
        Ok(key)
    }

    /// Registers an alternative spelling for `key`.
    ///
    /// Returns `Ok(false)` when the spelling is already known for this key.
    pub fn add_variant(&mut self, key: SurrogateKey, variant: &str) -> Result<bool> {
        let Some(&idx) = self.by_key.get(&key) else {
            return Err(ModelError::UnknownKey {
                entity: self.entity,
                key,
            });
        };
        let tidy = tidy_label(variant);
        let variant_key = label_key(&tidy);
        if variant_key.is_empty() {
            return Ok(false);
        }
        let owner = self
            .by_name
            .get(&variant_key)
            .or_else(|| self.by_variant.get(&variant_key))
            .copied();
        match owner {
            Some(existing) if existing == key => Ok(false),
            Some(existing) => Err(ModelError::VariantConflict {
                entity: self.entity,
                variant: tidy,
                existing,
            }),
            None => {
                self.by_variant.insert(variant_key, key);
                self.records[idx].variants.insert(tidy);
                Ok(true)
            }
        }
    }

    /// Tabular form used for validation and export: key, canonical name,
    /// descriptive attributes, then `ordem` and `agregado` where the entity
    /// has them.
    pub fn to_table(&self) -> FactTable {
        let entity = self.entity;
        let mut columns = vec![
            FactColumn::new(entity.key_column(), ColumnRole::PrimaryKey),
            FactColumn::new(entity.name_column(), ColumnRole::Attribute),
        ];
        columns.extend(
            entity
                .attribute_columns()
                .iter()
                .map(|column| FactColumn::new(*column, ColumnRole::Attribute)),
        );
        if entity.is_ranked() {
            columns.push(FactColumn::new(RANK_COLUMN, ColumnRole::Attribute));
        }
        if entity.has_aggregates() {
            columns.push(FactColumn::new(AGGREGATE_COLUMN, ColumnRole::Attribute));
        }

        let mut table = FactTable::new(entity.table_name(), columns);
        for record in &self.records {
            let mut row = vec![
                Value::Int(i64::from(record.key)),
                Value::Text(record.canonical_name.clone()),
            ];
            row.extend(entity.attribute_columns().iter().map(|column| {
                record
                    .attribute(column)
                    .map_or(Value::Null, |value| Value::Text(value.to_string()))
            }));
            if entity.is_ranked() {
                row.push(record.rank.map_or(Value::Null, |rank| Value::Int(i64::from(rank))));
            }
            if entity.has_aggregates() {
                row.push(Value::Int(i64::from(record.aggregate)));
            }
            table.rows.push(row);
        }
        table
    }

    fn push(
        &mut self,
        key: SurrogateKey,
        name: String,
        name_key: String,
        attributes: DimensionAttributes,
    ) {
        self.by_key.insert(key, self.records.len());
        self.by_name.insert(name_key, key);
        self.records.push(DimensionRecord {
            key,
            canonical_name: name,
            rank: attributes.rank,
            aggregate: attributes.aggregate,
            attributes: attributes.extra,
            variants: BTreeSet::new(),
        });
        if key >= self.next_key {
            self.next_key = key.next();
        }
    }
}

/// One dimension table per entity type, passed by reference through every phase.
#[derive(Debug, Clone)]
pub struct DimensionRegistry {
    tables: BTreeMap<EntityType, DimensionTable>,
}

impl Default for DimensionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl DimensionRegistry {
    pub fn new() -> Self {
        let tables = EntityType::ALL
            .into_iter()
            .map(|entity| (entity, DimensionTable::new(entity)))
            .collect();
        Self { tables }
    }

    pub fn table(&self, entity: EntityType) -> &DimensionTable {
        &self.tables[&entity]
    }

    pub fn table_mut(&mut self, entity: EntityType) -> &mut DimensionTable {
        self.tables
            .entry(entity)
            .or_insert_with(|| DimensionTable::new(entity))
    }

    pub fn tables(&self) -> impl Iterator<Item = &DimensionTable> {
        self.tables.values()
    }

    pub fn ensure(
        &mut self,
        entity: EntityType,
        canonical_name: &str,
        attributes: DimensionAttributes,
    ) -> Result<SurrogateKey> {
        self.table_mut(entity).ensure(canonical_name, attributes)
    }

    pub fn get(&self, entity: EntityType, key: SurrogateKey) -> Option<&DimensionRecord> {
        self.table(entity).get(key)
    }

    pub fn key_of(&self, entity: EntityType, name: &str) -> Option<SurrogateKey> {
        self.table(entity).key_of(name)
    }

    pub fn is_aggregate(&self, entity: EntityType, key: SurrogateKey) -> bool {
        self.get(entity, key).is_some_and(|record| record.aggregate)
    }

    pub fn total_rows(&self) -> usize {
        self.tables.values().map(DimensionTable::len).sum()
    }
}
