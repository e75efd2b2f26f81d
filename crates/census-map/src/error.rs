use census_model::{EntityType, ModelError};
use census_standards::StandardsError;

#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("invalid {entity} classification pattern '{pattern}': {source}")]
    InvalidPattern {
        entity: EntityType,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Standards(#[from] StandardsError),
}

pub type Result<T> = std::result::Result<T, MapError>;
