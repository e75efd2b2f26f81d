use census_model::{ModelError, SourceLayout};

#[derive(Debug, thiserror::Error)]
pub enum TransformError {
    /// The source lacks a column its layout requires.
    #[error("{layout} source has no '{column}' column (headers: {})", headers.join(", "))]
    MissingColumn {
        layout: SourceLayout,
        column: &'static str,
        headers: Vec<String>,
    },

    /// A wide layout found no category columns.
    #[error("{layout} source has no category columns")]
    NoCategoryColumns { layout: SourceLayout },

    #[error(transparent)]
    Model(#[from] ModelError),
}

pub type Result<T> = std::result::Result<T, TransformError>;
