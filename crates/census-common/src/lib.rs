//! Shared utilities for the census ETL crates.
//!
//! Locale-aware number cleaning, half-up rounding and fixed-precision
//! formatting, plus polars `AnyValue` conversions used by the validator and
//! the re-import check.

pub mod numeric;
pub mod polars;

pub use numeric::{clean_number, format_fixed, format_plain, is_conventional_sign, round_half_up};
pub use polars::{any_is_null, any_to_f64, any_to_i64, any_to_text};
