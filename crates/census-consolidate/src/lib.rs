//! Cross-year consolidation.
//!
//! Per-source registries, mapping tables and fact tables are merged in a
//! deterministic order so that one real-world entity keeps one surrogate key
//! across every source. Missing sources are recorded and skipped. After the
//! merge, [`temporal_evolution`] derives variation and compound growth per
//! entity between its first and last year.

mod consolidator;
mod error;
mod evolution;
mod source;

pub use consolidator::{Consolidation, Consolidator};
pub use error::{ConsolidateError, Result};
pub use evolution::{TEMPORAL_EVOLUTION, temporal_evolution, temporal_evolution_columns};
pub use source::{MergedSource, SkippedSource, SourceDataset};
