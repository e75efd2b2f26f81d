//! Entity resolution for raw census labels.
//!
//! Labels are repaired (mojibake table, footnote markers), folded (case,
//! whitespace, diacritics), screened by an exclusion heuristic, and then
//! matched against canonical names, registered variants and the ordered
//! classification rules. Open dimensions create new entries for labels
//! that match nothing.

mod classifier;
mod error;
mod exclusion;
mod normalize;
mod resolver;

pub use classifier::PatternClassifier;
pub use error::{MapError, Result};
pub use exclusion::{ExclusionReason, exclusion_reason};
pub use normalize::{clean_label, normalize_label, repair_mojibake, strip_footnotes};
pub use resolver::{EntityResolver, Resolution};
