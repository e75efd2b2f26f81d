//! Fact assembly: resolved records to fact tables with derived measures.

use std::collections::{BTreeSet, HashMap};

use census_model::{
    DimensionRegistry, EntityType, EtlConfig, FactTable, Provenance, ResolvedMeasure,
    ResolvedRecord, SourceLayout, SurrogateKey, Value,
};
use tracing::debug;

use crate::error::Result;
use crate::facts::{
    EDUCATION, EDUCATION_STATISTICS, EMPLOYMENT_BY_SECTOR, EMPLOYMENT_BY_SITUATION, FactSpec,
    OCCUPATION_BY_SEX, PERMITS_BY_MOTIVE, PERMITS_BY_SEX, POPULATION_BY_CONDITION,
    POPULATION_BY_NATIONALITY, POPULATION_BY_REGION, POPULATION_BY_SEX,
    education_statistics_columns,
};
use crate::metrics::{composite_index, percentage};
use crate::sequence::KeySequence;

/// One measure bound to its foreign keys, before it becomes a fact row.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub keys: Vec<Option<SurrogateKey>>,
    pub measure: Option<f64>,
}

impl Observation {
    fn group_key(&self, spec: &FactSpec) -> Vec<Option<SurrogateKey>> {
        spec.group.iter().map(|&idx| self.keys[idx]).collect()
    }
}

/// Builds the fact tables of one source.
pub struct FactAssembler<'a> {
    config: &'a EtlConfig,
    provenance: Provenance,
}

impl<'a> FactAssembler<'a> {
    pub fn new(config: &'a EtlConfig, provenance: Provenance) -> Self {
        Self { config, provenance }
    }

    /// Emits every fact table fed by `layout`.
    pub fn assemble(
        &self,
        layout: SourceLayout,
        records: &[ResolvedRecord],
        registry: &DimensionRegistry,
    ) -> Result<Vec<FactTable>> {
        let tables = match layout {
            SourceLayout::PopulationByNationality => {
                let totals = records
                    .iter()
                    .map(|record| Observation {
                        keys: vec![record.key(EntityType::Nationality)],
                        measure: total_of(&record.measure),
                    })
                    .collect();
                let by_sex = explode_by_sex(records, &[EntityType::Nationality]);
                let mut tables = vec![self.build(&POPULATION_BY_NATIONALITY, totals, registry)?];
                if !by_sex.is_empty() {
                    tables.push(self.build(&POPULATION_BY_SEX, by_sex, registry)?);
                }
                tables
            }
            SourceLayout::PermitsByNationalitySex => {
                let observations = explode_by_sex(records, &[EntityType::Nationality]);
                vec![self.build(&PERMITS_BY_SEX, observations, registry)?]
            }
            SourceLayout::EducationLong | SourceLayout::EducationWide => {
                let observations = if layout == SourceLayout::EducationWide {
                    explode_wide(records, &EDUCATION)
                } else {
                    singles(records, &EDUCATION)
                };
                let kept = self.prepare(&EDUCATION, observations, registry);
                let statistics = self.education_statistics(&kept, registry)?;
                vec![self.emit(&EDUCATION, kept, registry)?, statistics]
            }
            SourceLayout::EmploymentBySector => {
                let observations = singles(records, &EMPLOYMENT_BY_SECTOR);
                vec![self.build(&EMPLOYMENT_BY_SECTOR, observations, registry)?]
            }
            SourceLayout::EmploymentBySituation => {
                let observations = singles(records, &EMPLOYMENT_BY_SITUATION);
                vec![self.build(&EMPLOYMENT_BY_SITUATION, observations, registry)?]
            }
            SourceLayout::ConditionByNationality => {
                let observations = singles(records, &POPULATION_BY_CONDITION);
                vec![self.build(&POPULATION_BY_CONDITION, observations, registry)?]
            }
            SourceLayout::OccupationBySex => {
                let observations =
                    explode_by_sex(records, &[EntityType::Nationality, EntityType::Occupation]);
                vec![self.build(&OCCUPATION_BY_SEX, observations, registry)?]
            }
            SourceLayout::PermitsByMotiveWide => {
                let observations = explode_wide(records, &PERMITS_BY_MOTIVE);
                vec![self.build(&PERMITS_BY_MOTIVE, observations, registry)?]
            }
            SourceLayout::PermitsByMotiveLong => {
                let observations = singles(records, &PERMITS_BY_MOTIVE);
                vec![self.build(&PERMITS_BY_MOTIVE, observations, registry)?]
            }
            SourceLayout::PopulationByRegion => {
                let observations = singles(records, &POPULATION_BY_REGION);
                vec![self.build(&POPULATION_BY_REGION, observations, registry)?]
            }
        };
        for table in &tables {
            debug!(
                dataset = %self.provenance.dataset,
                table = %table.name,
                rows = table.len(),
                "assembled fact table"
            );
        }
        Ok(tables)
    }

    fn build(
        &self,
        spec: &FactSpec,
        observations: Vec<Observation>,
        registry: &DimensionRegistry,
    ) -> Result<FactTable> {
        let kept = self.prepare(spec, observations, registry);
        self.emit(spec, kept, registry)
    }

    /// Drops negative measures, merges duplicates, applies the zero-row
    /// policy and completes category coverage.
    fn prepare(
        &self,
        spec: &FactSpec,
        observations: Vec<Observation>,
        registry: &DimensionRegistry,
    ) -> Vec<Observation> {
        let received = observations.len();
        let observations: Vec<Observation> = observations
            .into_iter()
            .filter(|observation| observation.measure.is_none_or(|value| value >= 0.0))
            .collect();
        if observations.len() < received {
            debug!(
                table = spec.name,
                dropped = received - observations.len(),
                "dropped negative measures"
            );
        }
        let merged = merge_duplicates(observations);
        let include_zero = self.config.assembly.include_zero_rows;
        let before = merged.len();
        let mut kept: Vec<Observation> = merged
            .into_iter()
            .filter_map(|mut observation| {
                let positive = observation.measure.is_some_and(|value| value > 0.0);
                if positive {
                    Some(observation)
                } else if include_zero {
                    observation.measure = Some(0.0);
                    Some(observation)
                } else {
                    None
                }
            })
            .collect();
        if kept.len() < before {
            debug!(
                table = spec.name,
                dropped = before - kept.len(),
                "dropped zero or missing measures"
            );
        }
        if include_zero && let Some(position) = spec.coverage {
            complete_coverage(&mut kept, position, spec.keys[position], registry);
        }
        kept
    }

    fn emit(
        &self,
        spec: &FactSpec,
        observations: Vec<Observation>,
        registry: &DimensionRegistry,
    ) -> Result<FactTable> {
        let percents = percentages_of_group(spec, &observations, registry, self.precision());
        let mut table = spec.empty_table();
        let mut sequence = KeySequence::new();
        for (observation, percent) in observations.into_iter().zip(percents) {
            let mut row = Vec::with_capacity(table.width());
            row.push(Value::Int(sequence.next_key()));
            row.extend(observation.keys.iter().map(|key| key_value(*key)));
            row.push(Value::from_opt_f64(observation.measure));
            row.push(Value::Float(percent));
            self.push_provenance(&mut row);
            table.push_row(row)?;
        }
        Ok(table)
    }

    /// One row per (nationality, age group): total, share of the
    /// highest-ranked level, and the composite education index.
    fn education_statistics(
        &self,
        observations: &[Observation],
        registry: &DimensionRegistry,
    ) -> Result<FactTable> {
        let levels = registry.table(EntityType::EducationLevel);
        let top_rank = levels.records().iter().filter_map(|record| record.rank).max();

        let mut order: Vec<(Option<SurrogateKey>, Option<SurrogateKey>)> = Vec::new();
        let mut groups: HashMap<(Option<SurrogateKey>, Option<SurrogateKey>), Vec<&Observation>> =
            HashMap::new();
        for observation in observations {
            let key = (observation.keys[0], observation.keys[2]);
            let members = groups.entry(key).or_default();
            if members.is_empty() {
                order.push(key);
            }
            members.push(observation);
        }

        let precision = self.precision();
        let mut table = FactTable::new(EDUCATION_STATISTICS, education_statistics_columns());
        let mut sequence = KeySequence::new();
        for key in order {
            let members = groups.get(&key).map(Vec::as_slice).unwrap_or_default();
            let mut total = 0.0;
            let mut top = 0.0;
            let mut weighted = Vec::with_capacity(members.len());
            for observation in members {
                let Some(level) = observation.keys[1].and_then(|key| levels.get(key)) else {
                    continue;
                };
                if level.aggregate {
                    continue;
                }
                let measure = observation.measure.unwrap_or(0.0);
                total += measure;
                if level.rank.is_some() && level.rank == top_rank {
                    top += measure;
                }
                weighted.push((measure, self.config.weight_for(&level.canonical_name, level.rank)));
            }
            let mut row = vec![
                Value::Int(sequence.next_key()),
                key_value(key.0),
                key_value(key.1),
                Value::Float(total),
                Value::Float(percentage(top, total, precision)),
                Value::Float(composite_index(&weighted, total, precision)),
            ];
            self.push_provenance(&mut row);
            table.push_row(row)?;
        }
        Ok(table)
    }

    fn push_provenance(&self, row: &mut Vec<Value>) {
        row.push(Value::Int(i64::from(self.provenance.year)));
        row.push(Value::Text(self.provenance.dataset.to_string()));
    }

    fn precision(&self) -> u32 {
        self.config.assembly.precision
    }
}

fn key_value(key: Option<SurrogateKey>) -> Value {
    key.map_or(Value::Null, |key| Value::Int(i64::from(key)))
}

/// Total of a by-sex measure: the source total, else male + female.
fn total_of(measure: &ResolvedMeasure) -> Option<f64> {
    match measure {
        ResolvedMeasure::Single(value) => *value,
        ResolvedMeasure::BySex {
            male,
            female,
            total,
        } => total.or_else(|| add(male.1, female.1)),
        ResolvedMeasure::Wide { cells, .. } => {
            cells.iter().fold(None, |sum, (_, value)| add(sum, *value))
        }
    }
}

fn add(left: Option<f64>, right: Option<f64>) -> Option<f64> {
    match (left, right) {
        (Some(a), Some(b)) => Some(a + b),
        (Some(a), None) | (None, Some(a)) => Some(a),
        (None, None) => None,
    }
}

/// One observation per record with a single measure.
fn singles(records: &[ResolvedRecord], spec: &FactSpec) -> Vec<Observation> {
    records
        .iter()
        .filter_map(|record| match record.measure {
            ResolvedMeasure::Single(measure) => Some(Observation {
                keys: spec.keys.iter().map(|entity| record.key(*entity)).collect(),
                measure,
            }),
            _ => None,
        })
        .collect()
}

/// Wide-to-long: one observation per category cell. The category fills
/// the FK of the wide entity.
fn explode_wide(records: &[ResolvedRecord], spec: &FactSpec) -> Vec<Observation> {
    let mut observations = Vec::new();
    for record in records {
        let ResolvedMeasure::Wide { entity, cells } = &record.measure else {
            continue;
        };
        for (category, measure) in cells {
            let keys = spec
                .keys
                .iter()
                .map(|key_entity| {
                    if key_entity == entity {
                        Some(*category)
                    } else {
                        record.key(*key_entity)
                    }
                })
                .collect();
            observations.push(Observation {
                keys,
                measure: *measure,
            });
        }
    }
    observations
}

/// One observation per sex from male/female columns; `row_keys` precede
/// the sex key.
fn explode_by_sex(records: &[ResolvedRecord], row_keys: &[EntityType]) -> Vec<Observation> {
    let mut observations = Vec::new();
    for record in records {
        let ResolvedMeasure::BySex { male, female, .. } = &record.measure else {
            continue;
        };
        if male.1.is_none() && female.1.is_none() {
            continue;
        }
        for (sex, measure) in [male, female] {
            let mut keys: Vec<Option<SurrogateKey>> =
                row_keys.iter().map(|entity| record.key(*entity)).collect();
            keys.push(Some(*sex));
            observations.push(Observation {
                keys,
                measure: *measure,
            });
        }
    }
    observations
}

/// Sums observations sharing keys, keeping first-seen order. Several raw
/// labels can classify into one canonical entry.
fn merge_duplicates(observations: Vec<Observation>) -> Vec<Observation> {
    let mut merged: Vec<Observation> = Vec::with_capacity(observations.len());
    let mut index: HashMap<Vec<Option<SurrogateKey>>, usize> = HashMap::new();
    for observation in observations {
        let key = observation.keys.clone();
        match index.get(&key) {
            Some(&idx) => {
                let existing = &mut merged[idx];
                existing.measure = add(existing.measure, observation.measure);
            }
            None => {
                index.insert(key, merged.len());
                merged.push(observation);
            }
        }
    }
    merged
}

/// Adds zero observations so every combination of the other keys lists
/// every non-aggregate entry of `entity` at `position`.
fn complete_coverage(
    observations: &mut Vec<Observation>,
    position: usize,
    entity: EntityType,
    registry: &DimensionRegistry,
) {
    let categories: Vec<SurrogateKey> = registry
        .table(entity)
        .records()
        .iter()
        .filter(|record| !record.aggregate)
        .map(|record| record.key)
        .collect();
    let present: BTreeSet<Vec<Option<SurrogateKey>>> = observations
        .iter()
        .map(|observation| observation.keys.clone())
        .collect();
    let mut contexts: Vec<Vec<Option<SurrogateKey>>> = Vec::new();
    for observation in observations.iter() {
        let mut keys = observation.keys.clone();
        keys[position] = None;
        if !contexts.contains(&keys) {
            contexts.push(keys);
        }
    }
    let before = observations.len();
    for keys in contexts {
        for category in &categories {
            let mut filled = keys.clone();
            filled[position] = Some(*category);
            if !present.contains(&filled) {
                observations.push(Observation {
                    keys: filled,
                    measure: Some(0.0),
                });
            }
        }
    }
    debug!(
        entity = %entity,
        added = observations.len() - before,
        "completed category coverage"
    );
}

/// Percentage of each observation within its group. Observations whose
/// non-group FKs point at aggregate entries do not count in denominators.
fn percentages_of_group(
    spec: &FactSpec,
    observations: &[Observation],
    registry: &DimensionRegistry,
    precision: u32,
) -> Vec<f64> {
    let counts_in_total = |observation: &Observation| {
        spec.keys.iter().enumerate().all(|(idx, entity)| {
            spec.group.contains(&idx)
                || observation.keys[idx].is_none_or(|key| !registry.is_aggregate(*entity, key))
        })
    };
    let mut totals: HashMap<Vec<Option<SurrogateKey>>, f64> = HashMap::new();
    for observation in observations {
        if counts_in_total(observation) {
            *totals.entry(observation.group_key(spec)).or_default() +=
                observation.measure.unwrap_or(0.0);
        }
    }
    observations
        .iter()
        .map(|observation| {
            let total = totals
                .get(&observation.group_key(spec))
                .copied()
                .unwrap_or(0.0);
            percentage(observation.measure.unwrap_or(0.0), total, precision)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use census_model::{DatasetId, DimensionAttributes};

    use super::*;

    fn key(value: u32) -> SurrogateKey {
        SurrogateKey::new(value).unwrap()
    }

    fn registry() -> DimensionRegistry {
        let mut registry = DimensionRegistry::new();
        for (name, rank) in [("Básico", 1), ("Secundário", 2), ("Superior", 3)] {
            registry
                .ensure(
                    EntityType::EducationLevel,
                    name,
                    DimensionAttributes::new().with_rank(rank),
                )
                .unwrap();
        }
        registry
            .ensure(EntityType::Nationality, "Brasil", DimensionAttributes::new())
            .unwrap();
        registry
            .ensure(EntityType::Nationality, "Angola", DimensionAttributes::new())
            .unwrap();
        registry
            .ensure(
                EntityType::Nationality,
                "Estrangeira",
                DimensionAttributes::new().aggregate(),
            )
            .unwrap();
        for sector in ["Agricultura", "Indústria", "Serviços"] {
            registry
                .ensure(EntityType::Sector, sector, DimensionAttributes::new())
                .unwrap();
        }
        registry
            .ensure(EntityType::Sector, "Terciário", DimensionAttributes::new().aggregate())
            .unwrap();
        for age_group in ["15-64 anos", "65+ anos"] {
            registry
                .ensure(EntityType::AgeGroup, age_group, DimensionAttributes::new())
                .unwrap();
        }
        for situation in ["Patrão", "Trabalhador por conta de outrem"] {
            registry
                .ensure(
                    EntityType::ProfessionalSituation,
                    situation,
                    DimensionAttributes::new(),
                )
                .unwrap();
        }
        registry
    }

    fn provenance() -> Provenance {
        Provenance {
            year: 2011,
            dataset: DatasetId::new("censos_2011").unwrap(),
        }
    }

    fn record(keys: &[(EntityType, u32)], measure: ResolvedMeasure) -> ResolvedRecord {
        ResolvedRecord {
            line: 1,
            keys: keys.iter().map(|(entity, k)| (*entity, key(*k))).collect(),
            measure,
        }
    }

    fn column(table: &FactTable, name: &str) -> Vec<Value> {
        let idx = table.column_index(name).unwrap();
        table.rows.iter().map(|row| row[idx].clone()).collect()
    }

    #[test]
    fn education_scenario_row() {
        let config = EtlConfig::default();
        let assembler = FactAssembler::new(&config, provenance());
        let brasil_superior = record(
            &[
                (EntityType::Nationality, 1),
                (EntityType::EducationLevel, 3),
                (EntityType::AgeGroup, 1),
            ],
            ResolvedMeasure::Single(Some(9504.0)),
        );
        let tables = assembler
            .assemble(SourceLayout::EducationLong, &[brasil_superior], &registry())
            .unwrap();
        let education = &tables[0];
        assert_eq!(education.name, "Fact_PopulacaoEducacao");
        assert_eq!(education.value(0, "populacao_educacao_id"), Some(&Value::Int(1)));
        assert_eq!(education.value(0, "nacionalidade_id"), Some(&Value::Int(1)));
        assert_eq!(education.value(0, "nivel_educacao_id"), Some(&Value::Int(3)));
        assert_eq!(education.value(0, "populacao_total"), Some(&Value::Float(9504.0)));
        assert_eq!(education.value(0, "percentual_nivel"), Some(&Value::Float(100.0)));
        assert_eq!(education.value(0, "grupo_etario_id"), Some(&Value::Int(1)));
        assert_eq!(education.value(0, "ano_referencia"), Some(&Value::Int(2011)));

        let statistics = &tables[1];
        assert_eq!(statistics.name, EDUCATION_STATISTICS);
        assert_eq!(statistics.value(0, "grupo_etario_id"), Some(&Value::Int(1)));
        assert_eq!(
            statistics.value(0, "percentual_ensino_superior"),
            Some(&Value::Float(100.0))
        );
        assert_eq!(statistics.value(0, "indice_educacional"), Some(&Value::Float(3.0)));
    }

    #[test]
    fn wide_education_explodes_and_closes_to_100() {
        let config = EtlConfig::default();
        let assembler = FactAssembler::new(&config, provenance());
        let wide = record(
            &[(EntityType::Nationality, 2)],
            ResolvedMeasure::Wide {
                entity: EntityType::EducationLevel,
                cells: vec![(key(1), Some(1.0)), (key(2), Some(1.0)), (key(3), Some(1.0))],
            },
        );
        let tables = assembler
            .assemble(SourceLayout::EducationWide, &[wide], &registry())
            .unwrap();
        let percents = column(&tables[0], "percentual_nivel");
        assert_eq!(
            percents,
            vec![Value::Float(33.33), Value::Float(33.33), Value::Float(33.33)]
        );
        let sum: f64 = percents.iter().filter_map(Value::as_f64).sum();
        assert!((sum - 100.0).abs() <= 0.5);
        // (1*1 + 1*2 + 1*3) / 3 with rank weights
        assert_eq!(tables[1].value(0, "indice_educacional"), Some(&Value::Float(2.0)));
    }

    #[test]
    fn zero_rows_are_dropped_by_default() {
        let config = EtlConfig::default();
        let assembler = FactAssembler::new(&config, provenance());
        let records = vec![
            record(
                &[(EntityType::Nationality, 1), (EntityType::Sector, 1)],
                ResolvedMeasure::Single(Some(5.0)),
            ),
            record(
                &[(EntityType::Nationality, 1), (EntityType::Sector, 2)],
                ResolvedMeasure::Single(Some(0.0)),
            ),
            record(
                &[(EntityType::Nationality, 1), (EntityType::Sector, 3)],
                ResolvedMeasure::Single(None),
            ),
        ];
        let tables = assembler
            .assemble(SourceLayout::EmploymentBySector, &records, &registry())
            .unwrap();
        assert_eq!(tables[0].len(), 1);
        assert_eq!(tables[0].value(0, "percentual_da_nacionalidade"), Some(&Value::Float(100.0)));
    }

    #[test]
    fn include_zero_rows_covers_every_detailed_sector() {
        let mut config = EtlConfig::default();
        config.assembly.include_zero_rows = true;
        let assembler = FactAssembler::new(&config, provenance());
        let records = vec![
            record(
                &[(EntityType::Nationality, 1), (EntityType::Sector, 1)],
                ResolvedMeasure::Single(Some(5.0)),
            ),
            record(
                &[(EntityType::Nationality, 2), (EntityType::Sector, 3)],
                ResolvedMeasure::Single(None),
            ),
        ];
        let tables = assembler
            .assemble(SourceLayout::EmploymentBySector, &records, &registry())
            .unwrap();
        let table = &tables[0];
        // 2 nationalities x 3 detailed sectors; the aggregate is not added
        assert_eq!(table.len(), 6);
        let ids = column(table, "empregados_setor_id");
        let expected: Vec<Value> = (1..=6).map(Value::Int).collect();
        assert_eq!(ids, expected);
        assert!(!column(table, "setor_id").contains(&Value::Int(4)));
    }

    #[test]
    fn negative_measures_are_dropped_even_with_zero_rows() {
        let mut config = EtlConfig::default();
        config.assembly.include_zero_rows = true;
        let assembler = FactAssembler::new(&config, provenance());
        let records = vec![
            record(
                &[(EntityType::Nationality, 1), (EntityType::Sector, 1)],
                ResolvedMeasure::Single(Some(10.0)),
            ),
            record(
                &[(EntityType::Nationality, 1), (EntityType::Sector, 2)],
                ResolvedMeasure::Single(Some(-5.0)),
            ),
        ];
        let tables = assembler
            .assemble(SourceLayout::EmploymentBySector, &records, &registry())
            .unwrap();
        let table = &tables[0];
        assert_eq!(table.len(), 3);
        assert_eq!(
            column(table, "empregados"),
            vec![Value::Float(10.0), Value::Float(0.0), Value::Float(0.0)]
        );
        assert_eq!(
            column(table, "percentual_da_nacionalidade"),
            vec![Value::Float(100.0), Value::Float(0.0), Value::Float(0.0)]
        );
    }

    #[test]
    fn aggregates_are_kept_but_not_counted() {
        let config = EtlConfig::default();
        let assembler = FactAssembler::new(&config, provenance());
        let records = vec![
            record(
                &[(EntityType::Nationality, 1)],
                ResolvedMeasure::BySex {
                    male: (key(1), Some(30.0)),
                    female: (key(2), Some(30.0)),
                    total: Some(60.0),
                },
            ),
            record(
                &[(EntityType::Nationality, 2)],
                ResolvedMeasure::BySex {
                    male: (key(1), None),
                    female: (key(2), None),
                    total: Some(40.0),
                },
            ),
            record(
                &[(EntityType::Nationality, 3)],
                ResolvedMeasure::BySex {
                    male: (key(1), None),
                    female: (key(2), None),
                    total: Some(100.0),
                },
            ),
        ];
        let tables = assembler
            .assemble(SourceLayout::PopulationByNationality, &records, &registry())
            .unwrap();
        let totals = &tables[0];
        assert_eq!(
            column(totals, "percentagem_total"),
            vec![Value::Float(60.0), Value::Float(40.0), Value::Float(100.0)]
        );
        let by_sex = &tables[1];
        assert_eq!(by_sex.name, "Fact_PopulacaoPorNacionalidadeSexo");
        assert_eq!(by_sex.len(), 2);
        assert_eq!(
            column(by_sex, "percentagem_sexo"),
            vec![Value::Float(50.0), Value::Float(50.0)]
        );
    }

    #[test]
    fn education_percentages_are_per_age_group() {
        let config = EtlConfig::default();
        let assembler = FactAssembler::new(&config, provenance());
        let records = vec![
            record(
                &[
                    (EntityType::Nationality, 1),
                    (EntityType::EducationLevel, 1),
                    (EntityType::AgeGroup, 1),
                ],
                ResolvedMeasure::Single(Some(30.0)),
            ),
            record(
                &[
                    (EntityType::Nationality, 1),
                    (EntityType::EducationLevel, 3),
                    (EntityType::AgeGroup, 1),
                ],
                ResolvedMeasure::Single(Some(10.0)),
            ),
            record(
                &[
                    (EntityType::Nationality, 1),
                    (EntityType::EducationLevel, 1),
                    (EntityType::AgeGroup, 2),
                ],
                ResolvedMeasure::Single(Some(5.0)),
            ),
        ];
        let tables = assembler
            .assemble(SourceLayout::EducationLong, &records, &registry())
            .unwrap();
        assert_eq!(
            column(&tables[0], "percentual_nivel"),
            vec![Value::Float(75.0), Value::Float(25.0), Value::Float(100.0)]
        );
        let statistics = &tables[1];
        assert_eq!(statistics.len(), 2);
        assert_eq!(
            column(statistics, "grupo_etario_id"),
            vec![Value::Int(1), Value::Int(2)]
        );
        assert_eq!(
            column(statistics, "percentual_ensino_superior"),
            vec![Value::Float(25.0), Value::Float(0.0)]
        );
    }

    #[test]
    fn permits_by_sex_explode_per_nationality() {
        let config = EtlConfig::default();
        let assembler = FactAssembler::new(&config, provenance());
        let records = vec![record(
            &[(EntityType::Nationality, 1)],
            ResolvedMeasure::BySex {
                male: (key(1), Some(30.0)),
                female: (key(2), Some(10.0)),
                total: None,
            },
        )];
        let tables = assembler
            .assemble(SourceLayout::PermitsByNationalitySex, &records, &registry())
            .unwrap();
        assert_eq!(tables.len(), 1);
        let table = &tables[0];
        assert_eq!(table.name, "Fact_ConcessoesPorNacionalidadeSexo");
        assert_eq!(column(table, "sexo_id"), vec![Value::Int(1), Value::Int(2)]);
        assert_eq!(
            column(table, "concessoes"),
            vec![Value::Float(30.0), Value::Float(10.0)]
        );
        assert_eq!(
            column(table, "percentual_sexo"),
            vec![Value::Float(75.0), Value::Float(25.0)]
        );
    }

    #[test]
    fn employment_by_situation_shares_per_nationality() {
        let config = EtlConfig::default();
        let assembler = FactAssembler::new(&config, provenance());
        let records = vec![
            record(
                &[(EntityType::Nationality, 1), (EntityType::ProfessionalSituation, 1)],
                ResolvedMeasure::Single(Some(1.0)),
            ),
            record(
                &[(EntityType::Nationality, 1), (EntityType::ProfessionalSituation, 2)],
                ResolvedMeasure::Single(Some(3.0)),
            ),
        ];
        let tables = assembler
            .assemble(SourceLayout::EmploymentBySituation, &records, &registry())
            .unwrap();
        let table = &tables[0];
        assert_eq!(table.name, "Fact_EmpregadosPorSituacao");
        assert_eq!(
            column(table, "percentual_situacao"),
            vec![Value::Float(25.0), Value::Float(75.0)]
        );
    }

    #[test]
    fn duplicate_categories_are_summed() {
        let config = EtlConfig::default();
        let assembler = FactAssembler::new(&config, provenance());
        let records = vec![
            record(&[(EntityType::Motive, 1)], ResolvedMeasure::Single(Some(10.0))),
            record(&[(EntityType::Motive, 1)], ResolvedMeasure::Single(Some(5.0))),
            record(&[(EntityType::Motive, 2)], ResolvedMeasure::Single(Some(5.0))),
        ];
        let tables = assembler
            .assemble(SourceLayout::PermitsByMotiveLong, &records, &registry())
            .unwrap();
        let table = &tables[0];
        assert_eq!(
            column(table, "concessoes"),
            vec![Value::Float(15.0), Value::Float(5.0)]
        );
        assert_eq!(column(table, "nacionalidade_id"), vec![Value::Null, Value::Null]);
        assert_eq!(
            column(table, "percentual_ano"),
            vec![Value::Float(75.0), Value::Float(25.0)]
        );
    }
}
