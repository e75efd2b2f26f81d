//! Library surface of the `census-etl` binary: configuration loading,
//! logging setup, the staged pipeline and its console summaries.

pub mod config;
pub mod logging;
pub mod pipeline;
pub mod summary;
pub mod types;
