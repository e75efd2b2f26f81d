//! Locating source files among candidate name variants.

use std::path::{Path, PathBuf};

use census_model::label_key;
use tracing::debug;

use crate::error::{IngestError, Result};

/// Lists CSV files in `dir`, sorted by file name.
pub fn list_csv_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir).map_err(|source| IngestError::DirectoryRead {
        path: dir.to_path_buf(),
        source,
    })?;
    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| IngestError::DirectoryRead {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let is_csv = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
        if is_csv {
            files.push(path);
        }
    }
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// Returns the first candidate present in `dir`.
///
/// Candidates are tried in order, first as exact file names and then, for
/// the same order, against the directory listing ignoring case, accents
/// and spacing ("população 2011.CSV" matches "Populacao_2011.csv" only if
/// both fold to the same key).
pub fn locate_source(dir: &Path, dataset: &str, candidates: &[String]) -> Result<PathBuf> {
    for candidate in candidates {
        let path = dir.join(candidate);
        if path.is_file() {
            debug!(dataset, path = %path.display(), "located source");
            return Ok(path);
        }
    }

    let listing = if dir.is_dir() {
        list_csv_files(dir)?
    } else {
        Vec::new()
    };
    for candidate in candidates {
        let wanted = label_key(candidate);
        let found = listing.iter().find(|path| {
            path.file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| label_key(name) == wanted)
        });
        if let Some(path) = found {
            debug!(dataset, path = %path.display(), "located source by folded name");
            return Ok(path.clone());
        }
    }

    Err(IngestError::SourceNotFound {
        dataset: dataset.to_string(),
        dir: dir.to_path_buf(),
        candidates: candidates.to_vec(),
    })
}
