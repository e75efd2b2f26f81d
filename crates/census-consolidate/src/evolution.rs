//! `Fact_EvolucaoTemporal`: change between the earliest and latest year of
//! each entity in the consolidated facts.

use std::collections::BTreeMap;

use census_model::{ColumnRole, EntityType, FactColumn, FactTable, Value, YEAR_COLUMN};
use census_transform::facts::{PERMITS_BY_MOTIVE, POPULATION_BY_NATIONALITY};
use census_transform::metrics::{cagr, variation};
use census_transform::{FactSpec, KeySequence};
use tracing::debug;

use crate::error::Result;

pub const TEMPORAL_EVOLUTION: &str = "Fact_EvolucaoTemporal";

/// A measure tracked over time, keyed by one dimension.
struct Indicator {
    name: &'static str,
    source: FactSpec,
    entity: EntityType,
}

const INDICATORS: [Indicator; 2] = [
    Indicator {
        name: "populacao",
        source: POPULATION_BY_NATIONALITY,
        entity: EntityType::Nationality,
    },
    Indicator {
        name: "concessoes",
        source: PERMITS_BY_MOTIVE,
        entity: EntityType::Motive,
    },
];

pub fn temporal_evolution_columns() -> Vec<FactColumn> {
    let mut columns = vec![
        FactColumn::new("evolucao_id", ColumnRole::PrimaryKey),
        FactColumn::new("indicador", ColumnRole::Attribute),
    ];
    columns.extend(INDICATORS.iter().map(|indicator| FactColumn::foreign_key(indicator.entity)));
    columns.extend([
        FactColumn::new("ano_inicio", ColumnRole::Year),
        FactColumn::new("ano_fim", ColumnRole::Year),
        FactColumn::new("valor_inicio", ColumnRole::Count),
        FactColumn::new("valor_fim", ColumnRole::Count),
        FactColumn::new("variacao_absoluta", ColumnRole::Index),
        FactColumn::new("variacao_percentual", ColumnRole::Index),
        FactColumn::new("taxa_crescimento", ColumnRole::Index),
    ]);
    columns
}

/// Yearly totals per entity key of one indicator.
fn yearly_totals(table: &FactTable, indicator: &Indicator) -> BTreeMap<i64, BTreeMap<i32, f64>> {
    let mut totals: BTreeMap<i64, BTreeMap<i32, f64>> = BTreeMap::new();
    let (Some(key_idx), Some(measure_idx), Some(year_idx)) = (
        table.column_index(indicator.entity.key_column()),
        table.column_index(indicator.source.measure),
        table.column_index(YEAR_COLUMN),
    ) else {
        return totals;
    };
    for row in &table.rows {
        let (Some(key), Some(year), Some(measure)) = (
            row[key_idx].as_i64(),
            row[year_idx].as_i64().and_then(|year| i32::try_from(year).ok()),
            row[measure_idx].as_f64(),
        ) else {
            continue;
        };
        *totals.entry(key).or_default().entry(year).or_default() += measure;
    }
    totals
}

/// Builds the evolution table from consolidated facts; `None` when no
/// tracked fact table is present.
///
/// Entities seen in a single year get null variation and growth.
pub fn temporal_evolution(facts: &[FactTable], precision: u32) -> Result<Option<FactTable>> {
    let mut table = FactTable::new(TEMPORAL_EVOLUTION, temporal_evolution_columns());
    let mut sequence = KeySequence::new();
    let mut found = false;
    for (position, indicator) in INDICATORS.iter().enumerate() {
        let Some(source) = facts.iter().find(|table| table.name == indicator.source.name) else {
            continue;
        };
        found = true;
        for (key, years) in yearly_totals(source, indicator) {
            let (Some((&start_year, &start)), Some((&end_year, &end))) =
                (years.first_key_value(), years.last_key_value())
            else {
                continue;
            };
            let (absolute, relative, growth) = if end_year > start_year {
                let (absolute, relative) = variation(start, end, precision);
                let growth = cagr(start, end, end_year - start_year, precision);
                (Some(absolute), Some(relative), growth)
            } else {
                (None, None, None)
            };

            let mut row = vec![
                Value::Int(sequence.next_key()),
                Value::Text(indicator.name.to_string()),
            ];
            row.extend((0..INDICATORS.len()).map(|idx| {
                if idx == position {
                    Value::Int(key)
                } else {
                    Value::Null
                }
            }));
            row.extend([
                Value::Int(i64::from(start_year)),
                Value::Int(i64::from(end_year)),
                Value::Float(start),
                Value::Float(end),
                Value::from_opt_f64(absolute),
                Value::from_opt_f64(relative),
                Value::from_opt_f64(growth),
            ]);
            table.push_row(row)?;
        }
    }
    if !found {
        return Ok(None);
    }
    debug!(rows = table.len(), "built temporal evolution");
    Ok(Some(table))
}

#[cfg(test)]
mod tests {
    use census_model::SOURCE_COLUMN;

    use super::*;

    fn population(rows: &[(i64, f64, i64)]) -> FactTable {
        let mut table = POPULATION_BY_NATIONALITY.empty_table();
        for (idx, (nationality, total, year)) in rows.iter().enumerate() {
            table
                .push_row(vec![
                    Value::Int(idx as i64 + 1),
                    Value::Int(*nationality),
                    Value::Float(*total),
                    Value::Float(0.0),
                    Value::Int(*year),
                    Value::Text(format!("censos_{year}")),
                ])
                .unwrap();
        }
        table
    }

    #[test]
    fn growth_between_first_and_last_year() {
        let facts = vec![population(&[
            (4, 100.0, 2011),
            (4, 110.0, 2016),
            (4, 121.0, 2021),
            (9, 50.0, 2021),
            (5, 0.0, 2011),
            (5, 30.0, 2021),
        ])];
        let table = temporal_evolution(&facts, 2).unwrap().unwrap();
        assert_eq!(table.len(), 3);
        assert!(table.columns.iter().any(|c| c.name == "motivo_id"));
        assert!(!table.columns.iter().any(|c| c.name == SOURCE_COLUMN));

        // keys in ascending order: 4, 5, 9
        assert_eq!(table.value(0, "valor_inicio"), Some(&Value::Float(100.0)));
        assert_eq!(table.value(0, "valor_fim"), Some(&Value::Float(121.0)));
        assert_eq!(table.value(0, "variacao_absoluta"), Some(&Value::Float(21.0)));
        assert_eq!(table.value(0, "variacao_percentual"), Some(&Value::Float(21.0)));
        // (121/100)^(1/10) - 1
        assert_eq!(table.value(0, "taxa_crescimento"), Some(&Value::Float(1.92)));

        assert_eq!(table.value(1, "variacao_percentual"), Some(&Value::Float(0.0)));
        assert_eq!(table.value(1, "taxa_crescimento"), Some(&Value::Float(0.0)));

        assert_eq!(table.value(2, "ano_inicio"), Some(&Value::Int(2021)));
        assert_eq!(table.value(2, "variacao_absoluta"), Some(&Value::Null));
        assert_eq!(table.value(2, "taxa_crescimento"), Some(&Value::Null));
        assert_eq!(table.value(2, "motivo_id"), Some(&Value::Null));
    }

    #[test]
    fn no_tracked_tables_means_no_evolution() {
        assert!(temporal_evolution(&[], 2).unwrap().is_none());
    }
}
