//! Resolution of raw labels to surrogate keys.

use std::collections::BTreeMap;

use census_model::{
    DatasetId, DimensionAttributes, DimensionRegistry, EntityType, MappingTable, MappingTag,
    RawMeasure, ResolutionOptions, ResolvedMeasure, ResolvedRecord, SourceRecord, SurrogateKey,
    label_key,
};
use census_standards::Catalog;
use tracing::{debug, trace};

use crate::classifier::PatternClassifier;
use crate::error::Result;
use crate::exclusion::{ExclusionReason, exclusion_reason};
use crate::normalize::clean_label;

const MALE: &str = "Masculino";
const FEMALE: &str = "Feminino";

/// Outcome of resolving one raw label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// The label is a canonical name.
    Exact(SurrogateKey),
    /// The label is a registered variant, or a classification rule matched
    /// it (it is then registered as a variant).
    Variant(SurrogateKey),
    /// A new dimension entry was created for the label.
    New(SurrogateKey),
    /// The label is not an entity (total, header echo, footnote, ...).
    Excluded(ExclusionReason),
    /// No match, and the entity type does not allow auto-creation.
    Unmapped,
}

impl Resolution {
    pub fn key(self) -> Option<SurrogateKey> {
        match self {
            Resolution::Exact(key) | Resolution::Variant(key) | Resolution::New(key) => Some(key),
            Resolution::Excluded(_) | Resolution::Unmapped => None,
        }
    }

    /// Mapping tag; `None` for excluded labels, which are only counted.
    pub fn tag(self) -> Option<MappingTag> {
        match self {
            Resolution::Exact(_) => Some(MappingTag::Exact),
            Resolution::Variant(_) => Some(MappingTag::Variant),
            Resolution::New(_) => Some(MappingTag::New),
            Resolution::Unmapped => Some(MappingTag::Unmapped),
            Resolution::Excluded(_) => None,
        }
    }
}

/// Maps raw labels onto a [`DimensionRegistry`].
///
/// The resolver itself is immutable; every call that may append a
/// dimension entry takes the registry by `&mut`.
#[derive(Debug, Clone)]
pub struct EntityResolver {
    classifier: PatternClassifier,
    options: ResolutionOptions,
}

impl EntityResolver {
    pub fn new(classifier: PatternClassifier, options: ResolutionOptions) -> Self {
        Self {
            classifier,
            options,
        }
    }

    /// A resolver using the classification rules of the built-in catalog.
    pub fn from_catalog(catalog: &Catalog, options: ResolutionOptions) -> Result<Self> {
        Ok(Self::new(PatternClassifier::from_catalog(catalog)?, options))
    }

    pub fn options(&self) -> &ResolutionOptions {
        &self.options
    }

    /// Resolves `raw` against the dimension of `entity`.
    ///
    /// Checks, in order: exclusion heuristic, canonical names, registered
    /// variants, classification rules, auto-creation. A rule whose canonical
    /// name is not in the registry only creates it when the entity type
    /// allows auto-creation.
    pub fn resolve(
        &self,
        registry: &mut DimensionRegistry,
        raw: &str,
        entity: EntityType,
    ) -> Result<Resolution> {
        let cleaned = clean_label(raw);
        let key = label_key(&cleaned);
        if let Some(reason) = exclusion_reason(&key, entity) {
            trace!(%entity, label = raw, %reason, "label excluded");
            return Ok(Resolution::Excluded(reason));
        }

        let table = registry.table_mut(entity);
        if let Some(found) = table.key_of(&cleaned) {
            return Ok(Resolution::Exact(found));
        }
        if let Some(found) = table.variant_key(&cleaned) {
            return Ok(Resolution::Variant(found));
        }
        let auto_create = self.options.allows_auto_create(entity);
        if let Some(canonical) = self.classifier.classify(entity, &key) {
            let found = match table.key_of(canonical) {
                Some(found) => found,
                None if auto_create => table.ensure(canonical, DimensionAttributes::new())?,
                None => {
                    debug!(%entity, label = raw, canonical, "classified into a missing entry");
                    return Ok(Resolution::Unmapped);
                }
            };
            table.add_variant(found, &cleaned)?;
            trace!(%entity, label = raw, canonical, "label classified");
            return Ok(Resolution::Variant(found));
        }
        if auto_create {
            let created = table.ensure(&cleaned, DimensionAttributes::new())?;
            debug!(%entity, key = %created, "created dimension entry");
            trace!(%entity, label = raw, "auto-created from label");
            return Ok(Resolution::New(created));
        }
        trace!(%entity, label = raw, "label unmapped");
        Ok(Resolution::Unmapped)
    }

    /// Resolves `raw` and records the outcome in `mappings`.
    pub fn resolve_recorded(
        &self,
        registry: &mut DimensionRegistry,
        mappings: &mut MappingTable,
        dataset: &DatasetId,
        raw: &str,
        entity: EntityType,
    ) -> Result<Resolution> {
        let resolution = self.resolve(registry, raw, entity)?;
        match resolution.tag() {
            Some(tag) => mappings.record(dataset, entity, raw.trim(), resolution.key(), tag),
            None => mappings.record_excluded(entity),
        }
        Ok(resolution)
    }

    /// Resolves every label of `record`.
    ///
    /// Returns `Ok(None)` when a row label is excluded or unmapped; the row
    /// is dropped and the miss is counted in `mappings`. Wide cells whose
    /// column label does not resolve are dropped individually.
    pub fn resolve_record(
        &self,
        registry: &mut DimensionRegistry,
        mappings: &mut MappingTable,
        dataset: &DatasetId,
        record: &SourceRecord,
    ) -> Result<Option<ResolvedRecord>> {
        let mut keys = BTreeMap::new();
        for label in &record.labels {
            let resolution =
                self.resolve_recorded(registry, mappings, dataset, &label.raw, label.entity)?;
            match resolution.key() {
                Some(key) => {
                    keys.insert(label.entity, key);
                }
                None => {
                    debug!(
                        %dataset,
                        line = record.line,
                        entity = %label.entity,
                        ?resolution,
                        "row dropped"
                    );
                    return Ok(None);
                }
            }
        }

        let measure = match &record.measure {
            RawMeasure::Single(value) => ResolvedMeasure::Single(*value),
            RawMeasure::BySex {
                male,
                female,
                total,
            } => {
                let male_key = registry.ensure(EntityType::Sex, MALE, DimensionAttributes::new())?;
                let female_key =
                    registry.ensure(EntityType::Sex, FEMALE, DimensionAttributes::new())?;
                ResolvedMeasure::BySex {
                    male: (male_key, *male),
                    female: (female_key, *female),
                    total: *total,
                }
            }
            RawMeasure::Wide { entity, cells } => {
                let mut resolved = Vec::with_capacity(cells.len());
                for (header, value) in cells {
                    let resolution =
                        self.resolve_recorded(registry, mappings, dataset, header, *entity)?;
                    if let Some(key) = resolution.key() {
                        resolved.push((key, *value));
                    }
                }
                ResolvedMeasure::Wide {
                    entity: *entity,
                    cells: resolved,
                }
            }
        };

        Ok(Some(ResolvedRecord {
            line: record.line,
            keys,
            measure,
        }))
    }
}

#[cfg(test)]
mod tests {
    use census_model::LabelRef;

    use super::*;

    fn setup() -> (EntityResolver, DimensionRegistry) {
        let catalog = Catalog::builtin().unwrap();
        let resolver = EntityResolver::from_catalog(&catalog, ResolutionOptions::default()).unwrap();
        (resolver, catalog.seeded_registry().unwrap())
    }

    #[test]
    fn exact_variant_and_new() {
        let (resolver, mut registry) = setup();
        let brasil = registry.key_of(EntityType::Nationality, "Brasil").unwrap();
        assert_eq!(
            resolver.resolve(&mut registry, "BRASIL", EntityType::Nationality).unwrap(),
            Resolution::Exact(brasil)
        );
        let romenia = registry.key_of(EntityType::Nationality, "Roménia").unwrap();
        assert_eq!(
            resolver.resolve(&mut registry, "Romania", EntityType::Nationality).unwrap(),
            Resolution::Variant(romenia)
        );
        let before = registry.table(EntityType::Nationality).len();
        let nepal = resolver
            .resolve(&mut registry, "Nepal", EntityType::Nationality)
            .unwrap();
        assert!(matches!(nepal, Resolution::New(_)));
        assert_eq!(registry.table(EntityType::Nationality).len(), before + 1);
        // second sighting is an exact match on the created entry
        assert_eq!(
            resolver.resolve(&mut registry, "nepal", EntityType::Nationality).unwrap(),
            Resolution::Exact(nepal.key().unwrap())
        );
    }

    #[test]
    fn classified_labels_become_variants() {
        let (resolver, mut registry) = setup();
        let family = registry
            .key_of(EntityType::Motive, "Reagrupamento Familiar")
            .unwrap();
        assert_eq!(
            resolver.resolve(&mut registry, "ARTIGO 89", EntityType::Motive).unwrap(),
            Resolution::Variant(family)
        );
        assert_eq!(
            registry.table(EntityType::Motive).variant_key("artigo 89"),
            Some(family)
        );
    }

    #[test]
    fn closed_catalogs_do_not_grow() {
        let (resolver, mut registry) = setup();
        let before = registry.table(EntityType::EducationLevel).len();
        assert_eq!(
            resolver
                .resolve(&mut registry, "Não aplicável", EntityType::EducationLevel)
                .unwrap(),
            Resolution::Unmapped
        );
        assert_eq!(registry.table(EntityType::EducationLevel).len(), before);
    }

    #[test]
    fn rules_do_not_create_closed_entries() {
        let catalog = Catalog::builtin().unwrap();
        let resolver = EntityResolver::from_catalog(&catalog, ResolutionOptions::default()).unwrap();
        let mut registry = DimensionRegistry::new();
        assert_eq!(
            resolver
                .resolve(&mut registry, "Ensino superior", EntityType::EducationLevel)
                .unwrap(),
            Resolution::Unmapped
        );
        assert!(registry.table(EntityType::EducationLevel).is_empty());
    }

    #[test]
    fn single_letter_sex_codes_resolve() {
        let (resolver, mut registry) = setup();
        let male = registry.key_of(EntityType::Sex, "Masculino").unwrap();
        let female = registry.key_of(EntityType::Sex, "Feminino").unwrap();
        assert_eq!(
            resolver.resolve(&mut registry, "H", EntityType::Sex).unwrap(),
            Resolution::Variant(male)
        );
        assert_eq!(
            resolver.resolve(&mut registry, "M", EntityType::Sex).unwrap(),
            Resolution::Variant(female)
        );
    }

    #[test]
    fn totals_are_excluded_without_side_effects() {
        let (resolver, mut registry) = setup();
        let before = registry.total_rows();
        let resolution = resolver
            .resolve(&mut registry, "Total", EntityType::Nationality)
            .unwrap();
        assert_eq!(resolution, Resolution::Excluded(ExclusionReason::Footer));
        assert_eq!(registry.total_rows(), before);
    }

    #[test]
    fn mojibake_resolves_to_catalog_entry() {
        let (resolver, mut registry) = setup();
        let ucrania = registry.key_of(EntityType::Nationality, "Ucrânia").unwrap();
        assert_eq!(
            resolver
                .resolve(&mut registry, "UcrÃ¢nia", EntityType::Nationality)
                .unwrap(),
            Resolution::Exact(ucrania)
        );
    }

    #[test]
    fn record_resolution_records_mappings() {
        let (resolver, mut registry) = setup();
        let mut mappings = MappingTable::new();
        let dataset = DatasetId::new("censos_2011").unwrap();
        let record = SourceRecord::new(
            1,
            vec![
                LabelRef::new(EntityType::Nationality, "Brasil"),
                LabelRef::new(EntityType::EducationLevel, "Ensino superior"),
            ],
            RawMeasure::Single(Some(9504.0)),
        )
        .with_optional_label(EntityType::AgeGroup, "15 a 64 anos");
        let resolved = resolver
            .resolve_record(&mut registry, &mut mappings, &dataset, &record)
            .unwrap()
            .unwrap();
        assert_eq!(
            resolved.key(EntityType::Nationality),
            registry.key_of(EntityType::Nationality, "Brasil")
        );
        assert_eq!(
            resolved.key(EntityType::EducationLevel),
            registry.key_of(EntityType::EducationLevel, "Superior")
        );
        assert_eq!(
            resolved.key(EntityType::AgeGroup),
            registry.key_of(EntityType::AgeGroup, "15-64 anos")
        );
        let stats = mappings.stats();
        assert_eq!(stats[&EntityType::Nationality].exact, 1);
        assert_eq!(stats[&EntityType::EducationLevel].variant, 1);
        assert_eq!(stats[&EntityType::AgeGroup].variant, 1);

        let total_row = SourceRecord::new(
            2,
            vec![LabelRef::new(EntityType::Nationality, "Total")],
            RawMeasure::Single(Some(1.0)),
        );
        assert!(
            resolver
                .resolve_record(&mut registry, &mut mappings, &dataset, &total_row)
                .unwrap()
                .is_none()
        );
        assert_eq!(mappings.stats()[&EntityType::Nationality].excluded, 1);
    }

    #[test]
    fn by_sex_measures_get_sex_keys() {
        let (resolver, mut registry) = setup();
        let mut mappings = MappingTable::new();
        let dataset = DatasetId::new("censos_2021").unwrap();
        let record = SourceRecord::new(
            1,
            vec![LabelRef::new(EntityType::Nationality, "Angola")],
            RawMeasure::BySex {
                male: Some(10.0),
                female: Some(12.0),
                total: Some(22.0),
            },
        );
        let resolved = resolver
            .resolve_record(&mut registry, &mut mappings, &dataset, &record)
            .unwrap()
            .unwrap();
        let ResolvedMeasure::BySex { male, female, .. } = resolved.measure else {
            panic!("expected by-sex measure");
        };
        assert_eq!(Some(male.0), registry.key_of(EntityType::Sex, "Masculino"));
        assert_eq!(Some(female.0), registry.key_of(EntityType::Sex, "Feminino"));
    }
}
