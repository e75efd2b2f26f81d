use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Fatal,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Warning => "warning",
            Severity::Fatal => "fatal",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Integrity rule families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    OrphanForeignKey,
    Uniqueness,
    Completeness,
    Range,
    EmptyTable,
}

impl RuleKind {
    pub fn as_str(self) -> &'static str {
        match self {
            RuleKind::OrphanForeignKey => "orphan_foreign_key",
            RuleKind::Uniqueness => "uniqueness",
            RuleKind::Completeness => "completeness",
            RuleKind::Range => "range",
            RuleKind::EmptyTable => "empty_table",
        }
    }

    pub fn default_severity(self) -> Severity {
        match self {
            RuleKind::OrphanForeignKey | RuleKind::Uniqueness => Severity::Fatal,
            RuleKind::Completeness | RuleKind::Range | RuleKind::EmptyTable => Severity::Warning,
        }
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One integrity violation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    pub rule: RuleKind,
    pub severity: Severity,
    pub table: String,
    pub column: Option<String>,
    /// Number of offending values (orphans, duplicates, out-of-range cells...).
    pub count: u64,
    pub message: String,
    /// A few offending values for diagnostics.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub examples: Vec<String>,
}

/// Violations of one rule kind, with totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleGroup {
    pub rule: RuleKind,
    pub fatal: usize,
    pub warnings: usize,
    pub occurrences: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// What was validated (a dataset id or `consolidated`).
    pub scope: String,
    pub violations: Vec<Violation>,
}

impl ValidationReport {
    pub fn new(scope: impl Into<String>) -> Self {
        Self {
            scope: scope.into(),
            violations: Vec::new(),
        }
    }

    pub fn add(&mut self, violation: Violation) {
        self.violations.push(violation);
    }

    pub fn extend(&mut self, violations: impl IntoIterator<Item = Violation>) {
        self.violations.extend(violations);
    }

    pub fn fatal_count(&self) -> usize {
        self.violations
            .iter()
            .filter(|violation| violation.severity == Severity::Fatal)
            .count()
    }

    pub fn warning_count(&self) -> usize {
        self.violations
            .iter()
            .filter(|violation| violation.severity == Severity::Warning)
            .count()
    }

    pub fn has_fatal(&self) -> bool {
        self.fatal_count() > 0
    }

    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn of_rule(&self, rule: RuleKind) -> impl Iterator<Item = &Violation> {
        self.violations
            .iter()
            .filter(move |violation| violation.rule == rule)
    }

    /// Violations grouped by rule kind, in rule order.
    pub fn groups(&self) -> Vec<RuleGroup> {
        let mut groups: BTreeMap<RuleKind, RuleGroup> = BTreeMap::new();
        for violation in &self.violations {
            let group = groups.entry(violation.rule).or_insert(RuleGroup {
                rule: violation.rule,
                fatal: 0,
                warnings: 0,
                occurrences: 0,
            });
            match violation.severity {
                Severity::Fatal => group.fatal += 1,
                Severity::Warning => group.warnings += 1,
            }
            group.occurrences += violation.count;
        }
        groups.into_values().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn violation(rule: RuleKind, count: u64) -> Violation {
        Violation {
            rule,
            severity: rule.default_severity(),
            table: "Fact_X".to_string(),
            column: None,
            count,
            message: String::new(),
            examples: Vec::new(),
        }
    }

    #[test]
    fn counts_and_groups() {
        let mut report = ValidationReport::new("consolidated");
        report.add(violation(RuleKind::OrphanForeignKey, 2));
        report.add(violation(RuleKind::Range, 1));
        report.add(violation(RuleKind::Range, 4));
        assert_eq!(report.fatal_count(), 1);
        assert_eq!(report.warning_count(), 2);
        assert!(report.has_fatal());

        let groups = report.groups();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].rule, RuleKind::OrphanForeignKey);
        assert_eq!(groups[1].warnings, 2);
        assert_eq!(groups[1].occurrences, 5);
    }

    #[test]
    fn default_severities() {
        assert_eq!(RuleKind::Uniqueness.default_severity(), Severity::Fatal);
        assert_eq!(RuleKind::Completeness.default_severity(), Severity::Warning);
    }
}
