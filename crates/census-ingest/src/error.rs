//! Error types for source ingestion.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    /// None of the candidate file names exist in the input directory.
    #[error("source {dataset} not found in {dir} (tried: {})", candidates.join(", "))]
    SourceNotFound {
        dataset: String,
        dir: PathBuf,
        candidates: Vec<String>,
    },

    /// UTF-8, Latin-1 and CP1252 all failed.
    #[error("could not decode {path} as UTF-8, ISO-8859-1 or Windows-1252")]
    Decode { path: PathBuf },

    #[error("failed to read {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to list directory {path}: {source}")]
    DirectoryRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse CSV {path}: {message}")]
    Csv { path: PathBuf, message: String },

    #[error("source file is empty: {path}")]
    EmptySource { path: PathBuf },

    #[error("no header row within the first {max_skipped} metadata rows of {path}")]
    NoHeaderDetected { path: PathBuf, max_skipped: usize },
}

pub type Result<T> = std::result::Result<T, IngestError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_not_found_lists_candidates() {
        let err = IngestError::SourceNotFound {
            dataset: "rifa_2020".to_string(),
            dir: PathBuf::from("/data"),
            candidates: vec!["RIFA_2020.csv".to_string(), "rifa 2020.csv".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "source rifa_2020 not found in /data (tried: RIFA_2020.csv, rifa 2020.csv)"
        );
    }
}
