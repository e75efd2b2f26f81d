use census_model::ModelError;

#[derive(Debug, thiserror::Error)]
pub enum StandardsError {
    #[error("failed to parse embedded table {file}: {message}")]
    Csv { file: &'static str, message: String },

    #[error("embedded table {file} is missing column {column}")]
    MissingColumn {
        file: &'static str,
        column: &'static str,
    },

    #[error("invalid value in {file} line {line}: {message}")]
    InvalidValue {
        file: &'static str,
        line: usize,
        message: String,
    },

    #[error(transparent)]
    Model(#[from] ModelError),
}

impl StandardsError {
    pub(crate) fn csv(file: &'static str, error: &csv::Error) -> Self {
        Self::Csv {
            file,
            message: error.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, StandardsError>;
