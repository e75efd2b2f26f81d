//! Schema adapters: one translation per [`SourceLayout`] from a
//! [`RawTable`] to uniform [`SourceRecord`]s.
//!
//! Headers are matched on their folded form, first exactly against each
//! alias in order and then by word prefix, so `"População residente
//! (N.º)"` satisfies the `populacao` alias.

use census_common::clean_number;
use census_ingest::RawTable;
use census_model::{EntityType, LabelRef, RawMeasure, SourceLayout, SourceRecord, label_key};
use tracing::debug;

use crate::error::{Result, TransformError};

struct ColumnSpec {
    name: &'static str,
    aliases: &'static [&'static str],
}

const NATIONALITY: ColumnSpec = ColumnSpec {
    name: "nacionalidade",
    aliases: &[
        "nacionalidade",
        "nacionalidades",
        "pais de nacionalidade",
        "pais",
        "paises",
    ],
};
const TOTAL: ColumnSpec = ColumnSpec {
    name: "total",
    aliases: &["total", "hm", "total hm", "populacao total", "populacao", "valor"],
};
const MALE: ColumnSpec = ColumnSpec {
    name: "homens",
    aliases: &["h", "homens", "masculino"],
};
const FEMALE: ColumnSpec = ColumnSpec {
    name: "mulheres",
    aliases: &["m", "mulheres", "feminino"],
};
const LEVEL: ColumnSpec = ColumnSpec {
    name: "nivel de ensino",
    aliases: &[
        "nivel de ensino",
        "nivel de escolaridade",
        "nivel de educacao",
        "escolaridade",
        "nivel",
    ],
};
const AGE: ColumnSpec = ColumnSpec {
    name: "grupo etario",
    aliases: &["grupo etario", "faixa etaria", "grupos etarios", "grupo de idade", "idade"],
};
const POPULATION: ColumnSpec = ColumnSpec {
    name: "populacao",
    aliases: &["populacao", "populacao residente", "total", "hm", "valor", "individuos"],
};
const SECTOR: ColumnSpec = ColumnSpec {
    name: "setor",
    aliases: &[
        "setor",
        "sector",
        "setor de atividade",
        "atividade economica",
        "actividade economica",
        "ramo de atividade",
        "cae",
    ],
};
const SITUATION: ColumnSpec = ColumnSpec {
    name: "situacao na profissao",
    aliases: &[
        "situacao na profissao",
        "situacao profissional",
        "situacao perante a profissao",
        "situacao",
    ],
};
const EMPLOYED: ColumnSpec = ColumnSpec {
    name: "empregados",
    aliases: &["empregados", "populacao empregada", "total", "hm", "valor"],
};
const CONDITION: ColumnSpec = ColumnSpec {
    name: "condicao",
    aliases: &[
        "condicao",
        "condicao perante o trabalho",
        "condicao perante a atividade economica",
        "condicao economica",
    ],
};
const OCCUPATION: ColumnSpec = ColumnSpec {
    name: "profissao",
    aliases: &["profissao", "profissoes", "grupo profissional", "grupo de profissoes", "cnp"],
};
const MOTIVE: ColumnSpec = ColumnSpec {
    name: "motivo",
    aliases: &["motivo", "motivos", "motivo de concessao", "tipo de autorizacao"],
};
const PERMITS: ColumnSpec = ColumnSpec {
    name: "total",
    aliases: &["total", "concessoes", "titulos concedidos", "valor", "numero"],
};
const REGION: ColumnSpec = ColumnSpec {
    name: "regiao",
    aliases: &["regiao", "regioes", "nuts ii", "zona geografica", "local de residencia"],
};

/// Header keys that never name a category in wide layouts.
const NON_CATEGORY_HEADERS: &[&str] = &["total", "totais", "hm", "total geral", "subtotal"];

fn is_word_prefix(key: &str, alias: &str) -> bool {
    key.strip_prefix(alias)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with(|ch: char| !ch.is_alphanumeric()))
}

/// Header positions claimed while adapting one table.
struct Columns<'a> {
    table: &'a RawTable,
    layout: SourceLayout,
    keys: Vec<String>,
    used: Vec<bool>,
}

impl<'a> Columns<'a> {
    fn new(table: &'a RawTable, layout: SourceLayout) -> Self {
        let keys: Vec<String> = table.headers.iter().map(|header| label_key(header)).collect();
        let used = vec![false; keys.len()];
        Self {
            table,
            layout,
            keys,
            used,
        }
    }

    fn find(&mut self, spec: &ColumnSpec) -> Option<usize> {
        let free = |used: &[bool], idx: usize| !used[idx];
        let exact = spec.aliases.iter().find_map(|alias| {
            (0..self.keys.len()).find(|&idx| free(&self.used, idx) && self.keys[idx] == *alias)
        });
        let found = exact.or_else(|| {
            spec.aliases.iter().find_map(|alias| {
                (0..self.keys.len())
                    .find(|&idx| free(&self.used, idx) && is_word_prefix(&self.keys[idx], alias))
            })
        })?;
        self.used[found] = true;
        Some(found)
    }

    fn require(&mut self, spec: &ColumnSpec) -> Result<usize> {
        self.find(spec).ok_or_else(|| TransformError::MissingColumn {
            layout: self.layout,
            column: spec.name,
            headers: self.table.headers.clone(),
        })
    }

    /// Unclaimed columns that name categories (percent and total columns
    /// are skipped).
    fn categories(&self) -> Result<Vec<usize>> {
        let columns: Vec<usize> = (0..self.keys.len())
            .filter(|&idx| {
                let key = &self.keys[idx];
                !self.used[idx]
                    && !key.is_empty()
                    && !key.contains('%')
                    && !key.starts_with("percent")
                    && !key.starts_with("taxa")
                    && !NON_CATEGORY_HEADERS.contains(&key.as_str())
            })
            .collect();
        if columns.is_empty() {
            return Err(TransformError::NoCategoryColumns {
                layout: self.layout,
            });
        }
        Ok(columns)
    }
}

fn cell(row: &[String], idx: usize) -> &str {
    row.get(idx).map_or("", String::as_str)
}

fn number(row: &[String], idx: Option<usize>) -> Option<f64> {
    idx.and_then(|idx| clean_number(cell(row, idx)))
}

fn wide_cells(table: &RawTable, row: &[String], columns: &[usize]) -> Vec<(String, Option<f64>)> {
    columns
        .iter()
        .map(|&idx| (table.headers[idx].clone(), number(row, Some(idx))))
        .collect()
}

/// Translates `table` into source records according to `layout`.
pub fn adapt(layout: SourceLayout, table: &RawTable) -> Result<Vec<SourceRecord>> {
    let mut columns = Columns::new(table, layout);
    let rows = table.rows.iter().enumerate().map(|(idx, row)| (idx + 1, row));
    let records: Vec<SourceRecord> = match layout {
        SourceLayout::PopulationByNationality => {
            let nationality = columns.require(&NATIONALITY)?;
            let male = columns.find(&MALE);
            let female = columns.find(&FEMALE);
            let total = columns.find(&TOTAL);
            if total.is_none() && (male.is_none() || female.is_none()) {
                return Err(TransformError::MissingColumn {
                    layout,
                    column: TOTAL.name,
                    headers: table.headers.clone(),
                });
            }
            rows.map(|(line, row)| {
                SourceRecord::new(
                    line,
                    vec![LabelRef::new(EntityType::Nationality, cell(row, nationality))],
                    RawMeasure::BySex {
                        male: number(row, male),
                        female: number(row, female),
                        total: number(row, total),
                    },
                )
            })
            .collect()
        }
        SourceLayout::PermitsByNationalitySex => {
            let nationality = columns.require(&NATIONALITY)?;
            let male = columns.require(&MALE)?;
            let female = columns.require(&FEMALE)?;
            let total = columns.find(&TOTAL);
            rows.map(|(line, row)| {
                SourceRecord::new(
                    line,
                    vec![LabelRef::new(EntityType::Nationality, cell(row, nationality))],
                    RawMeasure::BySex {
                        male: number(row, Some(male)),
                        female: number(row, Some(female)),
                        total: number(row, total),
                    },
                )
            })
            .collect()
        }
        SourceLayout::EducationLong => {
            let nationality = columns.require(&NATIONALITY)?;
            let level = columns.require(&LEVEL)?;
            let age = columns.find(&AGE);
            let population = columns.require(&POPULATION)?;
            rows.map(|(line, row)| {
                SourceRecord::new(
                    line,
                    vec![
                        LabelRef::new(EntityType::Nationality, cell(row, nationality)),
                        LabelRef::new(EntityType::EducationLevel, cell(row, level)),
                    ],
                    RawMeasure::Single(number(row, Some(population))),
                )
                .with_optional_label(EntityType::AgeGroup, optional_cell(row, age))
            })
            .collect()
        }
        SourceLayout::EducationWide => {
            let nationality = columns.require(&NATIONALITY)?;
            let age = columns.find(&AGE);
            let levels = columns.categories()?;
            rows.map(|(line, row)| {
                SourceRecord::new(
                    line,
                    vec![LabelRef::new(EntityType::Nationality, cell(row, nationality))],
                    RawMeasure::Wide {
                        entity: EntityType::EducationLevel,
                        cells: wide_cells(table, row, &levels),
                    },
                )
                .with_optional_label(EntityType::AgeGroup, optional_cell(row, age))
            })
            .collect()
        }
        SourceLayout::EmploymentBySector => {
            let nationality = columns.require(&NATIONALITY)?;
            let sector = columns.require(&SECTOR)?;
            let employed = columns.require(&EMPLOYED)?;
            single_rows(rows, nationality, EntityType::Sector, sector, employed)
        }
        SourceLayout::EmploymentBySituation => {
            let nationality = columns.require(&NATIONALITY)?;
            let situation = columns.require(&SITUATION)?;
            let employed = columns.require(&EMPLOYED)?;
            single_rows(
                rows,
                nationality,
                EntityType::ProfessionalSituation,
                situation,
                employed,
            )
        }
        SourceLayout::ConditionByNationality => {
            let nationality = columns.require(&NATIONALITY)?;
            let condition = columns.require(&CONDITION)?;
            let population = columns.require(&POPULATION)?;
            single_rows(
                rows,
                nationality,
                EntityType::EconomicCondition,
                condition,
                population,
            )
        }
        SourceLayout::OccupationBySex => {
            let nationality = columns.require(&NATIONALITY)?;
            let occupation = columns.require(&OCCUPATION)?;
            let male = columns.require(&MALE)?;
            let female = columns.require(&FEMALE)?;
            let total = columns.find(&TOTAL);
            rows.map(|(line, row)| {
                SourceRecord::new(
                    line,
                    vec![
                        LabelRef::new(EntityType::Nationality, cell(row, nationality)),
                        LabelRef::new(EntityType::Occupation, cell(row, occupation)),
                    ],
                    RawMeasure::BySex {
                        male: number(row, Some(male)),
                        female: number(row, Some(female)),
                        total: number(row, total),
                    },
                )
            })
            .collect()
        }
        SourceLayout::PermitsByMotiveWide => {
            let nationality = columns.require(&NATIONALITY)?;
            let motives = columns.categories()?;
            rows.map(|(line, row)| {
                SourceRecord::new(
                    line,
                    vec![LabelRef::new(EntityType::Nationality, cell(row, nationality))],
                    RawMeasure::Wide {
                        entity: EntityType::Motive,
                        cells: wide_cells(table, row, &motives),
                    },
                )
            })
            .collect()
        }
        SourceLayout::PermitsByMotiveLong => {
            let motive = columns.require(&MOTIVE)?;
            let nationality = columns.find(&NATIONALITY);
            let permits = columns.require(&PERMITS)?;
            rows.map(|(line, row)| {
                let mut labels = Vec::with_capacity(2);
                if let Some(nationality) = nationality {
                    labels.push(LabelRef::new(EntityType::Nationality, cell(row, nationality)));
                }
                labels.push(LabelRef::new(EntityType::Motive, cell(row, motive)));
                SourceRecord::new(line, labels, RawMeasure::Single(number(row, Some(permits))))
            })
            .collect()
        }
        SourceLayout::PopulationByRegion => {
            let region = columns.require(&REGION)?;
            let nationality = columns.require(&NATIONALITY)?;
            let population = columns.require(&POPULATION)?;
            rows.map(|(line, row)| {
                SourceRecord::new(
                    line,
                    vec![
                        LabelRef::new(EntityType::Region, cell(row, region)),
                        LabelRef::new(EntityType::Nationality, cell(row, nationality)),
                    ],
                    RawMeasure::Single(number(row, Some(population))),
                )
            })
            .collect()
        }
    };
    debug!(%layout, records = records.len(), "adapted source");
    Ok(records)
}

fn optional_cell(row: &[String], idx: Option<usize>) -> &str {
    idx.map_or("", |idx| cell(row, idx))
}

fn single_rows<'r>(
    rows: impl Iterator<Item = (usize, &'r Vec<String>)>,
    nationality: usize,
    entity: EntityType,
    label: usize,
    measure: usize,
) -> Vec<SourceRecord> {
    rows.map(|(line, row)| {
        SourceRecord::new(
            line,
            vec![
                LabelRef::new(EntityType::Nationality, cell(row, nationality)),
                LabelRef::new(entity, cell(row, label)),
            ],
            RawMeasure::Single(number(row, Some(measure))),
        )
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use census_ingest::SourceEncoding;

    use super::*;

    fn table(headers: &[&str], rows: &[&[&str]]) -> RawTable {
        RawTable {
            path: PathBuf::from("fixture.csv"),
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: rows
                .iter()
                .map(|row| row.iter().map(|c| c.to_string()).collect())
                .collect(),
            encoding: SourceEncoding::Utf8,
            delimiter: b';',
            skipped_rows: 0,
        }
    }

    #[test]
    fn education_long_reads_labels_measure_and_age_group() {
        let raw = table(
            &["Nacionalidade", "Nível de escolaridade", "Grupo etário", "População (N.º)"],
            &[&["Brasil", "Superior", "15-64 anos", "9 504"]],
        );
        let records = adapt(SourceLayout::EducationLong, &raw).unwrap();
        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.line, 1);
        assert_eq!(record.labels[0], LabelRef::new(EntityType::Nationality, "Brasil"));
        assert_eq!(record.labels[1], LabelRef::new(EntityType::EducationLevel, "Superior"));
        assert_eq!(record.labels[2], LabelRef::new(EntityType::AgeGroup, "15-64 anos"));
        assert_eq!(record.measure, RawMeasure::Single(Some(9504.0)));
    }

    #[test]
    fn blank_age_group_adds_no_label() {
        let raw = table(
            &["Nacionalidade", "Nível de escolaridade", "Grupo etário", "População"],
            &[&["Brasil", "Superior", "", "10"]],
        );
        let records = adapt(SourceLayout::EducationLong, &raw).unwrap();
        assert_eq!(records[0].labels.len(), 2);
    }

    #[test]
    fn situation_rows() {
        let raw = table(
            &["Nacionalidade", "Situação na profissão", "Empregados"],
            &[&["Brasil", "Trabalhador por conta de outrem", "40 000"]],
        );
        let records = adapt(SourceLayout::EmploymentBySituation, &raw).unwrap();
        assert_eq!(
            records[0].labels[1],
            LabelRef::new(
                EntityType::ProfessionalSituation,
                "Trabalhador por conta de outrem"
            )
        );
        assert_eq!(records[0].measure, RawMeasure::Single(Some(40000.0)));
    }

    #[test]
    fn permits_by_sex_require_both_sexes() {
        let raw = table(
            &["Nacionalidade", "Homens", "Mulheres"],
            &[&["Brasil", "1.200", "1.350"]],
        );
        let records = adapt(SourceLayout::PermitsByNationalitySex, &raw).unwrap();
        assert_eq!(
            records[0].measure,
            RawMeasure::BySex {
                male: Some(1200.0),
                female: Some(1350.0),
                total: None,
            }
        );
        let missing = table(&["Nacionalidade", "Homens", "Total"], &[]);
        let err = adapt(SourceLayout::PermitsByNationalitySex, &missing).unwrap_err();
        assert!(matches!(
            err,
            TransformError::MissingColumn { column: "mulheres", .. }
        ));
    }

    #[test]
    fn wide_permits_skip_total_and_percent_columns() {
        let raw = table(
            &["Nacionalidade", "Trabalho", "Estudo", "Reagrupamento familiar (%)", "Total"],
            &[&["Brasil", "1.234", "56", "10,5", "1.290"]],
        );
        let records = adapt(SourceLayout::PermitsByMotiveWide, &raw).unwrap();
        let RawMeasure::Wide { entity, cells } = &records[0].measure else {
            panic!("expected wide measure");
        };
        assert_eq!(*entity, EntityType::Motive);
        assert_eq!(
            cells,
            &vec![
                ("Trabalho".to_string(), Some(1234.0)),
                ("Estudo".to_string(), Some(56.0)),
            ]
        );
    }

    #[test]
    fn population_by_sex_columns() {
        let raw = table(&["País", "HM", "H", "M"], &[&["Angola", "22", "10", "x"]]);
        let records = adapt(SourceLayout::PopulationByNationality, &raw).unwrap();
        assert_eq!(
            records[0].measure,
            RawMeasure::BySex {
                male: Some(10.0),
                female: None,
                total: Some(22.0),
            }
        );
    }

    #[test]
    fn missing_required_column_names_it() {
        let raw = table(&["Nacionalidade", "Total"], &[]);
        let err = adapt(SourceLayout::EmploymentBySector, &raw).unwrap_err();
        assert!(matches!(
            err,
            TransformError::MissingColumn { column: "setor", .. }
        ));
    }

    #[test]
    fn long_permits_without_nationality() {
        let raw = table(&["Motivo", "Total"], &[&["Estudo", "120"]]);
        let records = adapt(SourceLayout::PermitsByMotiveLong, &raw).unwrap();
        assert_eq!(records[0].labels, vec![LabelRef::new(EntityType::Motive, "Estudo")]);
    }
}
