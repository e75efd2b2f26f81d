//! Primary keys must be pairwise distinct.

use std::collections::{BTreeSet, HashSet};

use census_model::{RuleKind, Severity, Violation};
use polars::prelude::DataFrame;

use super::{MAX_EXAMPLES, column, texts};
use crate::error::Result;

/// `count` is the number of rows repeating an earlier key; null keys count
/// as duplicates of each other.
pub fn check(
    table: &str,
    df: &DataFrame,
    key_column: &str,
    severity: Severity,
) -> Result<Option<Violation>> {
    let mut seen = HashSet::new();
    let mut duplicates = 0u64;
    let mut examples = BTreeSet::new();
    for value in texts(column(df, table, key_column)?) {
        let value = value.unwrap_or_else(|| "null".to_string());
        if !seen.insert(value.clone()) {
            duplicates += 1;
            if examples.len() < MAX_EXAMPLES {
                examples.insert(value);
            }
        }
    }
    if duplicates == 0 {
        return Ok(None);
    }
    Ok(Some(Violation {
        rule: RuleKind::Uniqueness,
        severity,
        table: table.to_string(),
        column: Some(key_column.to_string()),
        count: duplicates,
        message: format!("{duplicates} duplicate value(s) in primary key {key_column}"),
        examples: examples.into_iter().collect(),
    }))
}
