use census_model::{RuleKind, Severity, Violation};
use polars::prelude::DataFrame;

/// A fact table without rows.
pub fn check(table: &str, df: &DataFrame, severity: Severity) -> Option<Violation> {
    (df.height() == 0).then(|| Violation {
        rule: RuleKind::EmptyTable,
        severity,
        table: table.to_string(),
        column: None,
        count: 0,
        message: format!("{table} has no rows"),
        examples: Vec::new(),
    })
}
