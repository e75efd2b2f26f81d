//! Integrity validation for dimension, fact and mapping tables.
//!
//! Tables are converted to polars frames and checked for orphan foreign
//! keys, duplicate primary keys, completeness of required columns, value
//! ranges and empty fact tables. The resulting
//! [`ValidationReport`](census_model::ValidationReport) decides whether
//! export may proceed.

mod checks;
mod error;
mod frame;
mod validator;

pub use error::{Result, ValidateError};
pub use frame::to_frame;
pub use validator::{ExportGate, ValidationInput, gate_export, relationships_of, validate};
