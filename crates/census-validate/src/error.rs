use polars::prelude::PolarsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValidateError {
    #[error("failed to build frame for {table}: {source}")]
    Frame {
        table: String,
        #[source]
        source: PolarsError,
    },

    #[error("failed to read column {column} of {table}: {source}")]
    Column {
        table: String,
        column: String,
        #[source]
        source: PolarsError,
    },
}

pub type Result<T> = std::result::Result<T, ValidateError>;
