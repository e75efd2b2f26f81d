//! Source layouts to star-schema facts.
//!
//! [`adapt`] turns a [`RawTable`](census_ingest::RawTable) into uniform
//! source records for one of the known layouts. After entity resolution,
//! [`FactAssembler`] explodes wide and by-sex measures, applies the zero-row
//! policy, computes group percentages and the education index, and numbers
//! fact rows from 1.

mod adapter;
mod assembler;
mod error;
pub mod facts;
pub mod metrics;
mod sequence;

pub use adapter::adapt;
pub use assembler::{FactAssembler, Observation};
pub use error::{Result, TransformError};
pub use facts::{EDUCATION_STATISTICS, FACT_SPECS, FactSpec};
pub use sequence::KeySequence;
