//! Shared data models for scan inputs and outputs.

pub mod unit;

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

pub use unit::SourceUnit;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
/// Finding severity, ordered from least to most severe.
pub enum Severity {
    Info,
    #[serde(alias = "warn")]
    Warning,
    Error,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "info" => Ok(Severity::Info),
            "warning" | "warn" => Ok(Severity::Warning),
            "error" => Ok(Severity::Error),
            other => Err(format!("unknown severity '{}' (expected info|warning|error)", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
/// One reported occurrence of a detected pattern.
///
/// `line` is 1-indexed; `None` marks a unit-level finding.
pub struct Finding {
    pub rule: String,
    pub unit: String,
    pub line: Option<usize>,
    pub message: String,
    pub severity: Severity,
}

impl Finding {
    pub fn at_line(
        rule: &str,
        severity: Severity,
        unit: &SourceUnit,
        line: usize,
        message: impl Into<String>,
    ) -> Self {
        Finding {
            rule: rule.to_string(),
            unit: unit.id.clone(),
            line: Some(line),
            message: message.into(),
            severity,
        }
    }

    pub fn for_unit(
        rule: &str,
        severity: Severity,
        unit: &SourceUnit,
        message: impl Into<String>,
    ) -> Self {
        Finding {
            rule: rule.to_string(),
            unit: unit.id.clone(),
            line: None,
            message: message.into(),
            severity,
        }
    }
}

// Report order: unit, then line (unit-level first), then rule id.
impl Ord for Finding {
    fn cmp(&self, other: &Self) -> Ordering {
        self.unit
            .cmp(&other.unit)
            .then(self.line.cmp(&other.line))
            .then(self.rule.cmp(&other.rule))
            .then(self.message.cmp(&other.message))
            .then(self.severity.cmp(&other.severity))
    }
}

impl PartialOrd for Finding {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
/// Aggregated counts used by printers and exit-code logic.
pub struct Summary {
    pub errors: usize,
    pub warnings: usize,
    pub infos: usize,
    pub units: usize,
}

impl Summary {
    /// Number of findings at or above `threshold`.
    pub fn at_or_above(&self, threshold: Severity) -> usize {
        match threshold {
            Severity::Info => self.errors + self.warnings + self.infos,
            Severity::Warning => self.errors + self.warnings,
            Severity::Error => self.errors,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
/// Whether the scan ran to completion or stopped on a cancel signal.
pub enum ScanStatus {
    Complete,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// Finished scan results. Built once by [`ScanReport::new`]; never mutated.
pub struct ScanReport {
    findings: Vec<Finding>,
    summary: Summary,
    status: ScanStatus,
}

impl ScanReport {
    /// Sort, deduplicate and count `findings`.
    pub fn new(mut findings: Vec<Finding>, units: usize, status: ScanStatus) -> Self {
        findings.sort();
        findings.dedup();
        let mut summary = Summary {
            units,
            ..Summary::default()
        };
        for f in &findings {
            match f.severity {
                Severity::Error => summary.errors += 1,
                Severity::Warning => summary.warnings += 1,
                Severity::Info => summary.infos += 1,
            }
        }
        ScanReport {
            findings,
            summary,
            status,
        }
    }

    pub fn findings(&self) -> &[Finding] {
        &self.findings
    }

    pub fn summary(&self) -> &Summary {
        &self.summary
    }

    pub fn status(&self) -> ScanStatus {
        self.status
    }

    /// Findings produced by a single rule, in report order.
    pub fn by_rule<'a>(&'a self, rule: &'a str) -> impl Iterator<Item = &'a Finding> + 'a {
        self.findings.iter().filter(move |f| f.rule == rule)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn finding(unit: &str, line: Option<usize>, rule: &str, sev: Severity) -> Finding {
        Finding {
            rule: rule.into(),
            unit: unit.into(),
            line,
            message: "m".into(),
            severity: sev,
        }
    }

    #[test]
    fn test_report_sorts_by_unit_line_rule_and_dedups() {
        let report = ScanReport::new(
            vec![
                finding("b.ts", Some(3), "magic-number", Severity::Warning),
                finding("a.ts", Some(9), "z-rule", Severity::Info),
                finding("a.ts", Some(9), "a-rule", Severity::Error),
                finding("a.ts", None, "singleton-state", Severity::Warning),
                finding("b.ts", Some(3), "magic-number", Severity::Warning),
            ],
            2,
            ScanStatus::Complete,
        );
        let keys: Vec<_> = report
            .findings()
            .iter()
            .map(|f| (f.unit.as_str(), f.line, f.rule.as_str()))
            .collect();
        assert_eq!(
            keys,
            vec![
                ("a.ts", None, "singleton-state"),
                ("a.ts", Some(9), "a-rule"),
                ("a.ts", Some(9), "z-rule"),
                ("b.ts", Some(3), "magic-number"),
            ]
        );
        assert_eq!(report.summary().errors, 1);
        assert_eq!(report.summary().warnings, 2);
        assert_eq!(report.summary().infos, 1);
        assert_eq!(report.summary().at_or_above(Severity::Warning), 3);
    }

    #[test]
    fn test_severity_parse_accepts_warn_alias() {
        assert_eq!("warn".parse::<Severity>(), Ok(Severity::Warning));
        assert_eq!("ERROR".parse::<Severity>(), Ok(Severity::Error));
        assert!("fatal".parse::<Severity>().is_err());
        assert!(Severity::Info < Severity::Error);
    }
}
