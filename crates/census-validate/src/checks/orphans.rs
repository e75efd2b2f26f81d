//! Orphan foreign keys: FK values absent from the dimension's key set.

use std::collections::{BTreeSet, HashSet};

use census_model::{Relationship, RuleKind, Severity, Violation};
use polars::prelude::DataFrame;

use super::{MAX_EXAMPLES, column, integers};
use crate::error::Result;

/// One violation per relationship with orphans; `count` is the number of
/// fact rows whose FK has no dimension row. Null FKs are not orphans.
pub fn check(
    relationship: &Relationship,
    facts: &DataFrame,
    dimension: &DataFrame,
    severity: Severity,
) -> Result<Option<Violation>> {
    let keys: HashSet<i64> = integers(column(
        dimension,
        &relationship.dimension_table,
        &relationship.pk_column,
    )?)
    .flatten()
    .collect();

    let mut orphans = 0u64;
    let mut examples = BTreeSet::new();
    for value in integers(column(facts, &relationship.fact_table, &relationship.fk_column)?).flatten()
    {
        if !keys.contains(&value) {
            orphans += 1;
            if examples.len() < MAX_EXAMPLES {
                examples.insert(value);
            }
        }
    }
    if orphans == 0 {
        return Ok(None);
    }
    Ok(Some(Violation {
        rule: RuleKind::OrphanForeignKey,
        severity,
        table: relationship.fact_table.clone(),
        column: Some(relationship.fk_column.clone()),
        count: orphans,
        message: format!(
            "{} value(s) of {}.{} missing from {}.{}",
            orphans,
            relationship.fact_table,
            relationship.fk_column,
            relationship.dimension_table,
            relationship.pk_column
        ),
        examples: examples.into_iter().map(|value| value.to_string()).collect(),
    }))
}
