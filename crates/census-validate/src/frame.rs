//! In-memory tables as polars frames.
//!
//! Key, year and foreign-key columns become `Int64`, measures `Float64`.
//! Other columns are `Int64` when every non-null cell is an integer and
//! `String` otherwise.

use census_model::{ColumnRole, FactColumn, FactTable, Value};
use polars::prelude::{Column, DataFrame, NamedFrom};

use crate::error::{Result, ValidateError};

pub fn to_frame(table: &FactTable) -> Result<DataFrame> {
    let columns = table
        .columns
        .iter()
        .enumerate()
        .map(|(idx, column)| build_column(table, idx, column))
        .collect();
    DataFrame::new(columns).map_err(|source| ValidateError::Frame {
        table: table.name.clone(),
        source,
    })
}

fn build_column(table: &FactTable, idx: usize, column: &FactColumn) -> Column {
    let cells = table.rows.iter().map(|row| row.get(idx).unwrap_or(&Value::Null));
    let name = column.name.as_str().into();
    if column.role.is_integer() || (!column.role.is_measure() && all_integers(table, idx)) {
        let values: Vec<Option<i64>> = cells.map(Value::as_i64).collect();
        Column::new(name, values)
    } else if column.role.is_measure() {
        let values: Vec<Option<f64>> = cells.map(Value::as_f64).collect();
        Column::new(name, values)
    } else {
        let values: Vec<Option<String>> = cells.map(text_of).collect();
        Column::new(name, values)
    }
}

fn all_integers(table: &FactTable, idx: usize) -> bool {
    let mut cells = table
        .rows
        .iter()
        .filter_map(|row| row.get(idx))
        .filter(|value| !value.is_null())
        .peekable();
    cells.peek().is_some() && cells.all(|value| matches!(value, Value::Int(_)))
}

fn text_of(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::Int(v) => Some(v.to_string()),
        Value::Float(v) => Some(v.to_string()),
        Value::Text(v) => Some(v.clone()),
    }
}

#[cfg(test)]
mod tests {
    use census_model::{EntityType, FactColumn};
    use polars::prelude::DataType;

    use super::*;

    #[test]
    fn column_types_follow_roles() {
        let mut table = FactTable::new(
            "Fact_Teste",
            vec![
                FactColumn::new("teste_id", ColumnRole::PrimaryKey),
                FactColumn::foreign_key(EntityType::Nationality),
                FactColumn::new("faixa_etaria", ColumnRole::Attribute),
                FactColumn::new("populacao", ColumnRole::Count),
            ],
        );
        table
            .push_row(vec![
                Value::Int(1),
                Value::Null,
                Value::Text("15-64 anos".to_string()),
                Value::Float(12.0),
            ])
            .unwrap();
        let df = to_frame(&table).unwrap();
        assert_eq!(df.shape(), (1, 4));
        assert_eq!(df.column("teste_id").unwrap().dtype(), &DataType::Int64);
        assert_eq!(df.column("nacionalidade_id").unwrap().null_count(), 1);
        assert_eq!(df.column("faixa_etaria").unwrap().dtype(), &DataType::String);
        assert_eq!(df.column("populacao").unwrap().dtype(), &DataType::Float64);
    }
}
