//! Fact tables: typed columns, rows of cells, and their FK relationships.

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};
use crate::{DatasetId, EntityType};

/// Provenance column holding the reference year.
pub const YEAR_COLUMN: &str = "ano_referencia";
/// Provenance column holding the dataset identifier.
pub const SOURCE_COLUMN: &str = "fonte_dados";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Int(i64),
    Float(f64),
    Text(String),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            Value::Float(v) if v.fract() == 0.0 => Some(*v as i64),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(v) => Some(*v as f64),
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(v) => Some(v),
            _ => None,
        }
    }

    pub fn from_opt_f64(value: Option<f64>) -> Self {
        value.map_or(Value::Null, Value::Float)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

/// What a column means; drives validation rules and export formatting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnRole {
    PrimaryKey,
    ForeignKey(EntityType),
    Count,
    Percent,
    Index,
    Year,
    Attribute,
    Source,
}

impl ColumnRole {
    pub fn is_measure(self) -> bool {
        matches!(self, ColumnRole::Count | ColumnRole::Percent | ColumnRole::Index)
    }

    pub fn is_integer(self) -> bool {
        matches!(
            self,
            ColumnRole::PrimaryKey | ColumnRole::ForeignKey(_) | ColumnRole::Year
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactColumn {
    pub name: String,
    pub role: ColumnRole,
}

impl FactColumn {
    pub fn new(name: impl Into<String>, role: ColumnRole) -> Self {
        Self {
            name: name.into(),
            role,
        }
    }

    pub fn foreign_key(entity: EntityType) -> Self {
        Self::new(entity.key_column(), ColumnRole::ForeignKey(entity))
    }
}

/// FK relationship `(fact_table, fk_column) -> (dimension_table, pk_column)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relationship {
    pub fact_table: String,
    pub fk_column: String,
    pub dimension_table: String,
    pub pk_column: String,
}

impl Relationship {
    pub fn new(
        fact_table: impl Into<String>,
        fk_column: impl Into<String>,
        dimension_table: impl Into<String>,
        pk_column: impl Into<String>,
    ) -> Self {
        Self {
            fact_table: fact_table.into(),
            fk_column: fk_column.into(),
            dimension_table: dimension_table.into(),
            pk_column: pk_column.into(),
        }
    }
}

/// Year and dataset a fact row was derived from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provenance {
    pub year: i32,
    pub dataset: DatasetId,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FactTable {
    pub name: String,
    pub columns: Vec<FactColumn>,
    pub rows: Vec<Vec<Value>>,
}

impl FactTable {
    pub fn new(name: impl Into<String>, columns: Vec<FactColumn>) -> Self {
        Self {
            name: name.into(),
            columns,
            rows: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn push_row(&mut self, row: Vec<Value>) -> Result<()> {
        if row.len() != self.columns.len() {
            return Err(ModelError::RowArity {
                table: self.name.clone(),
                expected: self.columns.len(),
                actual: row.len(),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column.name == name)
    }

    pub fn primary_key_index(&self) -> Option<usize> {
        self.columns
            .iter()
            .position(|column| column.role == ColumnRole::PrimaryKey)
    }

    /// Foreign-key columns with their positions.
    pub fn foreign_keys(&self) -> impl Iterator<Item = (usize, EntityType)> + '_ {
        self.columns
            .iter()
            .enumerate()
            .filter_map(|(idx, column)| match column.role {
                ColumnRole::ForeignKey(entity) => Some((idx, entity)),
                _ => None,
            })
    }

    pub fn value(&self, row: usize, column: &str) -> Option<&Value> {
        let idx = self.column_index(column)?;
        self.rows.get(row).and_then(|cells| cells.get(idx))
    }

    /// Relationships implied by the FK columns of this table.
    pub fn relationships(&self) -> Vec<Relationship> {
        self.foreign_keys()
            .map(|(idx, entity)| {
                Relationship::new(
                    self.name.clone(),
                    self.columns[idx].name.clone(),
                    entity.table_name(),
                    entity.key_column(),
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> FactTable {
        FactTable::new(
            "Fact_Test",
            vec![
                FactColumn::new("teste_id", ColumnRole::PrimaryKey),
                FactColumn::foreign_key(EntityType::Nationality),
                FactColumn::new("total", ColumnRole::Count),
            ],
        )
    }

    #[test]
    fn push_row_checks_arity() {
        let mut table = sample();
        table
            .push_row(vec![Value::Int(1), Value::Int(3), Value::Float(10.0)])
            .unwrap();
        let err = table.push_row(vec![Value::Int(2)]).unwrap_err();
        assert!(matches!(err, ModelError::RowArity { expected: 3, actual: 1, .. }));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn relationships_follow_fk_roles() {
        let rels = sample().relationships();
        assert_eq!(
            rels,
            vec![Relationship::new(
                "Fact_Test",
                "nacionalidade_id",
                "Dim_Nacionalidade",
                "nacionalidade_id"
            )]
        );
    }

    #[test]
    fn value_conversions() {
        assert_eq!(Value::Float(3.0).as_i64(), Some(3));
        assert_eq!(Value::Float(3.5).as_i64(), None);
        assert_eq!(Value::Int(4).as_f64(), Some(4.0));
        assert!(Value::from_opt_f64(None).is_null());
    }
}
