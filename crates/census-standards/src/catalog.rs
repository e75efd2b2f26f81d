//! Parsing of the embedded reference tables and registry seeding.

use census_model::{DimensionAttributes, DimensionRegistry, EntityType, label_key};
use csv::ReaderBuilder;
use tracing::debug;

use crate::embedded;
use crate::error::{Result, StandardsError};

const NAME_COLUMN: &str = "nome";
const RANK_COLUMN: &str = "ordem";
const AGGREGATE_COLUMN: &str = "agregado";

/// Embedded dimension tables in seeding order.
const DIMENSION_SOURCES: [(&str, EntityType, &str); 10] = [
    ("nationalities.csv", EntityType::Nationality, embedded::NATIONALITIES),
    ("education.csv", EntityType::EducationLevel, embedded::EDUCATION_LEVELS),
    ("sectors.csv", EntityType::Sector, embedded::SECTORS),
    ("occupations.csv", EntityType::Occupation, embedded::OCCUPATIONS),
    ("conditions.csv", EntityType::EconomicCondition, embedded::ECONOMIC_CONDITIONS),
    ("motives.csv", EntityType::Motive, embedded::MOTIVES),
    ("regions.csv", EntityType::Region, embedded::REGIONS),
    ("sexes.csv", EntityType::Sex, embedded::SEXES),
    ("age_groups.csv", EntityType::AgeGroup, embedded::AGE_GROUPS),
    (
        "situations.csv",
        EntityType::ProfessionalSituation,
        embedded::PROFESSIONAL_SITUATIONS,
    ),
];

/// A reference dimension entry.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogEntry {
    pub entity: EntityType,
    pub name: String,
    pub attributes: DimensionAttributes,
}

/// A known alternative spelling of a catalog entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantSpelling {
    pub entity: EntityType,
    pub variant: String,
    pub canonical: String,
}

/// One `(pattern, canonical name)` pair. Patterns are regular expressions
/// applied to folded labels (see [`census_model::label_key`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassificationRule {
    pub entity: EntityType,
    pub pattern: String,
    pub canonical: String,
}

/// The built-in reference catalog.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
    variants: Vec<VariantSpelling>,
    rules: Vec<ClassificationRule>,
}

struct Row {
    line: usize,
    cells: Vec<String>,
}

fn read_rows(file: &'static str, text: &str) -> Result<(Vec<String>, Vec<Row>)> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());
    let headers = reader
        .headers()
        .map_err(|error| StandardsError::csv(file, &error))?
        .iter()
        .map(str::to_string)
        .collect();
    let mut rows = Vec::new();
    for (idx, record) in reader.records().enumerate() {
        let record = record.map_err(|error| StandardsError::csv(file, &error))?;
        rows.push(Row {
            line: idx + 2,
            cells: record.iter().map(str::to_string).collect(),
        });
    }
    Ok((headers, rows))
}

fn column(file: &'static str, headers: &[String], name: &'static str) -> Result<usize> {
    headers
        .iter()
        .position(|header| header == name)
        .ok_or(StandardsError::MissingColumn { file, column: name })
}

fn parse_entity(file: &'static str, line: usize, raw: &str) -> Result<EntityType> {
    raw.parse().map_err(|_| StandardsError::InvalidValue {
        file,
        line,
        message: format!("unknown entity type '{raw}'"),
    })
}

fn parse_dimension(
    file: &'static str,
    entity: EntityType,
    text: &str,
) -> Result<Vec<CatalogEntry>> {
    let (headers, rows) = read_rows(file, text)?;
    let name_idx = column(file, &headers, NAME_COLUMN)?;
    for header in &headers {
        let known = header == NAME_COLUMN
            || header == RANK_COLUMN
            || header == AGGREGATE_COLUMN
            || entity.attribute_columns().contains(&header.as_str());
        if !known {
            return Err(StandardsError::InvalidValue {
                file,
                line: 1,
                message: format!("column '{header}' is not an attribute of {entity}"),
            });
        }
    }

    let mut entries = Vec::with_capacity(rows.len());
    for row in rows {
        let mut attributes = DimensionAttributes::new();
        for (idx, value) in row.cells.iter().enumerate() {
            if idx == name_idx || value.is_empty() {
                continue;
            }
            match headers[idx].as_str() {
                RANK_COLUMN => {
                    let rank = value.parse().map_err(|_| StandardsError::InvalidValue {
                        file,
                        line: row.line,
                        message: format!("rank '{value}' is not a positive integer"),
                    })?;
                    attributes = attributes.with_rank(rank);
                }
                AGGREGATE_COLUMN => attributes = attributes.aggregate(),
                other => attributes = attributes.with(other, value.clone()),
            }
        }
        let name = row.cells.get(name_idx).cloned().unwrap_or_default();
        if name.is_empty() {
            return Err(StandardsError::InvalidValue {
                file,
                line: row.line,
                message: "empty name".to_string(),
            });
        }
        entries.push(CatalogEntry {
            entity,
            name,
            attributes,
        });
    }
    Ok(entries)
}

/// Parses `entidade,<value column>,nome` tables (variants and rules).
fn parse_pairs(
    file: &'static str,
    text: &str,
    value_column: &'static str,
) -> Result<Vec<(EntityType, String, String)>> {
    let (headers, rows) = read_rows(file, text)?;
    let entity_idx = column(file, &headers, "entidade")?;
    let value_idx = column(file, &headers, value_column)?;
    let name_idx = column(file, &headers, NAME_COLUMN)?;
    rows.into_iter()
        .map(|row| {
            let cell = |idx: usize| row.cells.get(idx).cloned().unwrap_or_default();
            let entity = parse_entity(file, row.line, &cell(entity_idx))?;
            Ok((entity, cell(value_idx), cell(name_idx)))
        })
        .collect()
}

impl Catalog {
    /// Loads the embedded reference tables.
    pub fn builtin() -> Result<Self> {
        let mut entries = Vec::new();
        for (file, entity, text) in DIMENSION_SOURCES {
            entries.extend(parse_dimension(file, entity, text)?);
        }
        let variants = parse_pairs("variants.csv", embedded::VARIANTS, "variante")?
            .into_iter()
            .map(|(entity, variant, canonical)| VariantSpelling {
                entity,
                variant,
                canonical,
            })
            .collect();
        let rules = parse_pairs("rules.csv", embedded::RULES, "padrao")?
            .into_iter()
            .map(|(entity, pattern, canonical)| ClassificationRule {
                entity,
                pattern,
                canonical,
            })
            .collect();
        let catalog = Self {
            entries,
            variants,
            rules,
        };
        catalog.check_targets()?;
        debug!(
            entries = catalog.entries.len(),
            variants = catalog.variants.len(),
            rules = catalog.rules.len(),
            "loaded reference catalog"
        );
        Ok(catalog)
    }

    /// Every variant and rule must point at an entry of its own entity.
    fn check_targets(&self) -> Result<()> {
        let variants = self
            .variants
            .iter()
            .map(|variant| (variant.entity, &variant.canonical));
        let rules = self.rules.iter().map(|rule| (rule.entity, &rule.canonical));
        for (file, targets) in [
            ("variants.csv", variants.collect::<Vec<_>>()),
            ("rules.csv", rules.collect()),
        ] {
            for (idx, (entity, canonical)) in targets.into_iter().enumerate() {
                if self.entry(entity, canonical).is_none() {
                    return Err(StandardsError::InvalidValue {
                        file,
                        line: idx + 2,
                        message: format!("'{canonical}' is not a {entity} catalog entry"),
                    });
                }
            }
        }
        Ok(())
    }

    pub fn entries(&self, entity: EntityType) -> impl Iterator<Item = &CatalogEntry> {
        self.entries
            .iter()
            .filter(move |entry| entry.entity == entity)
    }

    pub fn entry(&self, entity: EntityType, name: &str) -> Option<&CatalogEntry> {
        let wanted = label_key(name);
        self.entries(entity)
            .find(|entry| label_key(&entry.name) == wanted)
    }

    pub fn variants(&self, entity: EntityType) -> impl Iterator<Item = &VariantSpelling> {
        self.variants
            .iter()
            .filter(move |variant| variant.entity == entity)
    }

    /// Rules for `entity`, in evaluation order.
    pub fn rules(&self, entity: EntityType) -> impl Iterator<Item = &ClassificationRule> {
        self.rules.iter().filter(move |rule| rule.entity == entity)
    }

    /// Inserts every entry and variant into `registry`.
    ///
    /// Seeding an empty registry always assigns the same keys, so
    /// independently built per-source registries agree on catalog keys.
    pub fn seed(&self, registry: &mut DimensionRegistry) -> Result<()> {
        for entry in &self.entries {
            registry.ensure(entry.entity, &entry.name, entry.attributes.clone())?;
        }
        for variant in &self.variants {
            let table = registry.table_mut(variant.entity);
            let key =
                table
                    .key_of(&variant.canonical)
                    .ok_or_else(|| StandardsError::InvalidValue {
                        file: "variants.csv",
                        line: 0,
                        message: format!("'{}' was not seeded", variant.canonical),
                    })?;
            table.add_variant(key, &variant.variant)?;
        }
        Ok(())
    }

    /// A fresh registry holding the catalog.
    pub fn seeded_registry(&self) -> Result<DimensionRegistry> {
        let mut registry = DimensionRegistry::new();
        self.seed(&mut registry)?;
        Ok(registry)
    }
}
