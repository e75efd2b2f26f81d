use thiserror::Error;

use crate::{EntityType, SurrogateKey};

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("{entity}: key {key} already belongs to '{existing}', cannot reuse it for '{requested}'")]
    KeyReuse {
        entity: EntityType,
        key: SurrogateKey,
        existing: String,
        requested: String,
    },
    #[error("{entity}: canonical name '{name}' already registered under key {key}")]
    DuplicateCanonicalName {
        entity: EntityType,
        name: String,
        key: SurrogateKey,
    },
    #[error("{entity}: variant '{variant}' already maps to key {existing}")]
    VariantConflict {
        entity: EntityType,
        variant: String,
        existing: SurrogateKey,
    },
    #[error("{entity}: unknown key {key}")]
    UnknownKey {
        entity: EntityType,
        key: SurrogateKey,
    },
    #[error("{0}: canonical name must not be empty")]
    EmptyCanonicalName(EntityType),
    #[error("unknown entity type: {0}")]
    UnknownEntityType(String),
    #[error("invalid dataset id: {0:?}")]
    InvalidDatasetId(String),
    #[error("invalid surrogate key: {0}")]
    InvalidKey(i64),
    #[error("table {table}: row has {actual} values, expected {expected}")]
    RowArity {
        table: String,
        expected: usize,
        actual: usize,
    },
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, ModelError>;
