//! Ingestion of raw census and administrative CSV exports.
//!
//! - **Discovery**: resolve a dataset's candidate file names inside the
//!   input directory.
//! - **Decoding**: UTF-8, then ISO-8859-1, then Windows-1252.
//! - **Tabulation**: sniff the delimiter, skip up to three metadata rows
//!   and detect the header.

mod csv;
mod decode;
mod discovery;
mod error;

pub use csv::{
    MAX_METADATA_ROWS, RawTable, ReadOptions, detect_header_row, normalize_header, read_source,
    sniff_delimiter,
};
pub use decode::{SourceEncoding, decode_bytes};
pub use discovery::{list_csv_files, locate_source};
pub use error::{IngestError, Result};
