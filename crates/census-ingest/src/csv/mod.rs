//! CSV reading for raw statistical sources.

mod header;
mod reader;

pub use header::{MAX_METADATA_ROWS, detect_header_row, normalize_header, sniff_delimiter};
pub use reader::{RawTable, ReadOptions, read_source};
