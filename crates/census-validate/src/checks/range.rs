//! Percentages within bounds, counts not below the minimum.

use std::collections::BTreeSet;

use census_common::format_plain;
use census_model::{ColumnRole, FactColumn, RuleKind, Severity, ValidationOptions, Violation};
use polars::prelude::DataFrame;

use super::{MAX_EXAMPLES, column, floats};
use crate::error::Result;

pub fn check(
    table: &str,
    df: &DataFrame,
    columns: &[FactColumn],
    options: &ValidationOptions,
    severity: Severity,
) -> Result<Vec<Violation>> {
    let mut violations = Vec::new();
    for spec in columns {
        let (min, max) = match spec.role {
            ColumnRole::Percent => (options.percent_min, options.percent_max),
            ColumnRole::Count => (options.count_min, f64::INFINITY),
            _ => continue,
        };
        let mut outside = 0u64;
        let mut examples = BTreeSet::new();
        for value in floats(column(df, table, &spec.name)?).flatten() {
            if value < min || value > max || value.is_nan() {
                outside += 1;
                if examples.len() < MAX_EXAMPLES {
                    examples.insert(format_plain(value));
                }
            }
        }
        if outside > 0 {
            let bounds = if max.is_finite() {
                format!("[{}, {}]", format_plain(min), format_plain(max))
            } else {
                format!(">= {}", format_plain(min))
            };
            violations.push(Violation {
                rule: RuleKind::Range,
                severity,
                table: table.to_string(),
                column: Some(spec.name.clone()),
                count: outside,
                message: format!("{outside} value(s) of {} outside {bounds}", spec.name),
                examples: examples.into_iter().collect(),
            });
        }
    }
    Ok(violations)
}
