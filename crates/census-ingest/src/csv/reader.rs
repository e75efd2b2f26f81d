//! Reading a decoded source into a [`RawTable`].

use std::path::{Path, PathBuf};

use csv::ReaderBuilder;
use tracing::{debug, warn};

use super::header::{MAX_METADATA_ROWS, detect_header_row, normalize_header, sniff_delimiter};
use crate::decode::{SourceEncoding, decode_bytes};
use crate::error::{IngestError, Result};

/// A source file after decoding and header detection. Every row has the
/// same width as `headers`.
#[derive(Debug, Clone)]
pub struct RawTable {
    pub path: PathBuf,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub encoding: SourceEncoding,
    pub delimiter: u8,
    /// Metadata rows dropped above the header.
    pub skipped_rows: usize,
}

impl RawTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of the first header equal to `name` (exact match after
    /// whitespace normalization).
    pub fn column(&self, name: &str) -> Option<usize> {
        let wanted = normalize_header(name);
        self.headers.iter().position(|header| *header == wanted)
    }
}

/// Options for [`read_source`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ReadOptions {
    /// Field delimiter; sniffed when absent.
    pub delimiter: Option<u8>,
}

fn normalize_cell(raw: &str) -> String {
    raw.trim().trim_matches('\u{feff}').to_string()
}

/// Reads, decodes and tabulates one source file.
pub fn read_source(path: &Path, options: ReadOptions) -> Result<RawTable> {
    let bytes = std::fs::read(path).map_err(|source| IngestError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Err(IngestError::EmptySource {
            path: path.to_path_buf(),
        });
    }
    let (text, encoding) = decode_bytes(&bytes).ok_or_else(|| IngestError::Decode {
        path: path.to_path_buf(),
    })?;
    if encoding != SourceEncoding::Utf8 {
        debug!(path = %path.display(), %encoding, "decoded with fallback encoding");
    }
    let delimiter = options.delimiter.unwrap_or_else(|| sniff_delimiter(&text));
    parse_text(path, &text, encoding, delimiter)
}

fn parse_text(
    path: &Path,
    text: &str,
    encoding: SourceEncoding,
    delimiter: u8,
) -> Result<RawTable> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(text.as_bytes());
    let mut raw_rows: Vec<Vec<String>> = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|error| IngestError::Csv {
            path: path.to_path_buf(),
            message: error.to_string(),
        })?;
        let row: Vec<String> = record.iter().map(normalize_cell).collect();
        if row.iter().all(String::is_empty) {
            continue;
        }
        raw_rows.push(row);
    }
    if raw_rows.is_empty() {
        return Err(IngestError::EmptySource {
            path: path.to_path_buf(),
        });
    }

    let header_index =
        detect_header_row(&raw_rows).ok_or_else(|| IngestError::NoHeaderDetected {
            path: path.to_path_buf(),
            max_skipped: MAX_METADATA_ROWS,
        })?;
    let mut headers: Vec<String> = raw_rows[header_index]
        .iter()
        .map(|value| normalize_header(value))
        .collect();
    while headers.last().is_some_and(String::is_empty) {
        headers.pop();
    }

    let mut rows = Vec::with_capacity(raw_rows.len() - header_index - 1);
    let mut overflow = 0usize;
    for record in raw_rows.iter().skip(header_index + 1) {
        if record
            .iter()
            .skip(headers.len())
            .any(|value| !value.is_empty())
        {
            overflow += 1;
        }
        let row = (0..headers.len())
            .map(|idx| record.get(idx).cloned().unwrap_or_default())
            .collect();
        rows.push(row);
    }
    if overflow > 0 {
        warn!(
            path = %path.display(),
            rows = overflow,
            "cells beyond the header width were dropped"
        );
    }
    debug!(
        path = %path.display(),
        %encoding,
        delimiter = %char::from(delimiter),
        skipped = header_index,
        rows = rows.len(),
        "read source"
    );
    Ok(RawTable {
        path: path.to_path_buf(),
        headers,
        rows,
        encoding,
        delimiter,
        skipped_rows: header_index,
    })
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    fn write_bytes(bytes: &[u8]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(bytes).unwrap();
        file
    }

    #[test]
    fn reads_semicolon_file_with_title_block() {
        let file = write_bytes(
            "Quadro 2 - População estrangeira;;\nUnidade: N.º;;\nNacionalidade;HM;H\nBrasil;9 504;4 000\nUcrânia;10,5;\n"
                .as_bytes(),
        );
        let table = read_source(file.path(), ReadOptions::default()).unwrap();
        assert_eq!(table.headers, vec!["Nacionalidade", "HM", "H"]);
        assert_eq!(table.skipped_rows, 2);
        assert_eq!(table.delimiter, b';');
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[1], vec!["Ucrânia", "10,5", ""]);
        assert_eq!(table.column("HM"), Some(1));
    }

    #[test]
    fn reads_latin1_file() {
        let file = write_bytes(b"Pa\xeds,Total\nRom\xe9nia,5\n");
        let table = read_source(file.path(), ReadOptions::default()).unwrap();
        assert_eq!(table.encoding, SourceEncoding::Latin1);
        assert_eq!(table.headers, vec!["País", "Total"]);
        assert_eq!(table.rows[0][0], "Roménia");
    }

    #[test]
    fn short_rows_are_padded() {
        let file = write_bytes(b"Nacionalidade;Homens;Mulheres\nBrasil;10\n");
        let table = read_source(file.path(), ReadOptions::default()).unwrap();
        assert_eq!(table.rows[0], vec!["Brasil", "10", ""]);
    }

    #[test]
    fn delimiter_override_wins() {
        let file = write_bytes(b"Nacionalidade|Total\nBrasil|10\n");
        let options = ReadOptions {
            delimiter: Some(b'|'),
        };
        let table = read_source(file.path(), options).unwrap();
        assert_eq!(table.headers, vec!["Nacionalidade", "Total"]);
    }

    #[test]
    fn empty_and_binary_files_fail() {
        let empty = write_bytes(b"\n\n");
        assert!(matches!(
            read_source(empty.path(), ReadOptions::default()),
            Err(IngestError::EmptySource { .. })
        ));
        let binary = write_bytes(b"\x00\x01\x02");
        assert!(matches!(
            read_source(binary.path(), ReadOptions::default()),
            Err(IngestError::Decode { .. })
        ));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_source(&dir.path().join("nope.csv"), ReadOptions::default()).unwrap_err();
        assert!(matches!(err, IngestError::FileRead { .. }));
    }
}
