//! Export of the consolidated star schema.
//!
//! Every dimension, fact and mapping table becomes `<Prefix>_<Table>.csv`
//! with a header row; percentage and index columns carry a fixed number of
//! decimals. `<Prefix>_manifest.json` lists each file with its shape,
//! column roles and sha256, and `<Prefix>_validation.json` holds the
//! validation report. Exports can be re-imported with polars and compared
//! with the tables they came from.

mod error;
mod export;
mod manifest;
mod reimport;
mod writer;

pub use error::{OutputError, Result};
pub use export::{
    ExportOptions, ExportRequest, VerifyReport, export, verify_export, verify_round_trip,
};
pub use manifest::{Manifest, ManifestColumn, ManifestTable, TableKind, read_manifest};
pub use reimport::{compare, read_exported, reimport_matches};
pub use writer::{
    encode_table, format_cell, manifest_file_name, table_file_name, validation_file_name,
    write_table,
};
