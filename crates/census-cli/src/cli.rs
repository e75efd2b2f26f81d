//! CLI argument definitions for `census-etl`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

use census_model::EntityType;

#[derive(Parser)]
#[command(
    name = "census-etl",
    version,
    about = "Consolidate census CSV exports into a dimensional star schema",
    long_about = "Consolidate heterogeneous census and residence-permit CSV exports \
                  into dimension, fact and mapping tables.\n\n\
                  Labels are resolved to stable surrogate keys across years, the \
                  result is validated for referential integrity, and every table is \
                  exported as CSV with a JSON manifest."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the full pipeline for the sources of a configuration file.
    Run(RunArgs),

    /// Print the built-in reference dimensions.
    Catalog(CatalogArgs),

    /// Check an export directory against its manifest.
    Verify(VerifyArgs),
}

#[derive(Args)]
pub struct RunArgs {
    /// TOML configuration listing the sources.
    #[arg(long = "config", value_name = "FILE")]
    pub config: PathBuf,

    /// Directory holding the source CSV files (default: config `input_dir`).
    #[arg(long = "input-dir", value_name = "DIR")]
    pub input_dir: Option<PathBuf>,

    /// Directory for the exported files (default: config `output_dir`).
    #[arg(long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Prefix of every exported file name.
    #[arg(long = "prefix", value_name = "PREFIX")]
    pub prefix: Option<String>,

    /// Keep zero and missing measures and emit every category.
    #[arg(long = "include-zero-rows")]
    pub include_zero_rows: bool,

    /// Export even when fatal integrity violations are found.
    ///
    /// The exit status is still 1 when fatal violations exist.
    #[arg(long = "force")]
    pub force: bool,

    /// Run and validate without writing any file.
    #[arg(long = "dry-run")]
    pub dry_run: bool,

    /// Re-import the exported CSV files and compare them with the tables.
    #[arg(long = "verify", conflicts_with = "dry_run")]
    pub verify: bool,
}

#[derive(Args)]
pub struct CatalogArgs {
    /// Only print this entity type (e.g. nationality, education_level).
    #[arg(long = "entity", value_name = "TYPE", value_parser = parse_entity)]
    pub entity: Option<EntityType>,
}

#[derive(Args)]
pub struct VerifyArgs {
    /// Export directory.
    #[arg(value_name = "DIR")]
    pub dir: PathBuf,

    /// File name prefix used by the export.
    #[arg(long = "prefix", value_name = "PREFIX", default_value = "DW")]
    pub prefix: String,
}

fn parse_entity(value: &str) -> Result<EntityType, String> {
    value.parse().map_err(|error| format!("{error}"))
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
