//! Built-in reference catalog for the census star schema.
//!
//! The catalog seeds every [`DimensionRegistry`](census_model::DimensionRegistry)
//! before resolution: education levels with their rank, CAE Rev.3 sections
//! and the primary/secondary/tertiary roll-ups, CNP occupation groups,
//! economic conditions, residence-permit motives, sexes, NUTS II regions
//! and the nationalities that recur across census and SEF/AIMA sources.
//! It also carries the ordered classification rules used to recognise
//! free-text labels.

mod catalog;
pub mod embedded;
mod error;

pub use catalog::{Catalog, CatalogEntry, ClassificationRule, VariantSpelling};
pub use error::{Result, StandardsError};
