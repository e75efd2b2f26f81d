use census_model::ModelError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConsolidateError {
    /// Two sources produced a fact table with the same name but different columns.
    #[error("{dataset}: columns of {table} differ from earlier sources")]
    ColumnMismatch { table: String, dataset: String },

    #[error(transparent)]
    Model(#[from] ModelError),
}

pub type Result<T> = std::result::Result<T, ConsolidateError>;
