//! Non-null rate of required columns.

use census_model::{RuleKind, Severity, Violation};
use polars::prelude::DataFrame;

use super::texts;

/// A required column below `threshold` percent non-null (or absent) is a
/// violation; `count` is the number of null cells.
pub fn check(
    table: &str,
    df: &DataFrame,
    required: &[String],
    threshold: f64,
    severity: Severity,
) -> Vec<Violation> {
    let height = df.height();
    let mut violations = Vec::new();
    for name in required {
        let Ok(column) = df.column(name) else {
            violations.push(Violation {
                rule: RuleKind::Completeness,
                severity,
                table: table.to_string(),
                column: Some(name.clone()),
                count: height as u64,
                message: format!("required column {name} is missing"),
                examples: Vec::new(),
            });
            continue;
        };
        if height == 0 {
            continue;
        }
        let nulls = texts(column)
            .filter(|value| value.as_deref().is_none_or(|text| text.trim().is_empty()))
            .count();
        let rate = (height - nulls) as f64 / height as f64 * 100.0;
        if rate < threshold {
            violations.push(Violation {
                rule: RuleKind::Completeness,
                severity,
                table: table.to_string(),
                column: Some(name.clone()),
                count: nulls as u64,
                message: format!("{name} is {rate:.2}% complete, below {threshold:.2}%"),
                examples: Vec::new(),
            });
        }
    }
    violations
}
