//! Output rendering for scan reports and diagnostics.
//!
//! Supports `plain` (default) and `json` outputs. Every `format_*` function
//! is pure over its input so output can be compared against golden files;
//! only the `print_*` helpers touch stdout/stderr.

use crate::error::{LoadError, RuleExecutionError};
use crate::models::{Finding, ScanReport, ScanStatus};
use crate::registry::Registry;
use crate::utils;
use owo_colors::OwoColorize;
use serde_json::json;
use serde_json::Value as JsonVal;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputStyle {
    Plain,
    Json,
}

impl FromStr for OutputStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "plain" | "human" | "text" => Ok(OutputStyle::Plain),
            "json" => Ok(OutputStyle::Json),
            other => Err(format!("unknown format '{}' (expected plain|json)", other)),
        }
    }
}

impl fmt::Display for OutputStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OutputStyle::Plain => "plain",
            OutputStyle::Json => "json",
        })
    }
}

/// `path:line: [severity] rule-id - message`, or `path: ...` for unit-level findings.
pub fn format_finding(f: &Finding) -> String {
    match f.line {
        Some(line) => format!(
            "{}:{}: [{}] {} - {}",
            f.unit, line, f.severity, f.rule, f.message
        ),
        None => format!("{}: [{}] {} - {}", f.unit, f.severity, f.rule, f.message),
    }
}

/// Render a report in the requested style.
pub fn format_report(report: &ScanReport, style: OutputStyle) -> String {
    match style {
        OutputStyle::Json => {
            let mut s = serde_json::to_string_pretty(&compose_report_json(report))
                .unwrap_or_else(|_| "{}".to_string());
            s.push('\n');
            s
        }
        OutputStyle::Plain => {
            let mut out = String::new();
            for f in report.findings() {
                out.push_str(&format_finding(f));
                out.push('\n');
            }
            let s = report.summary();
            out.push_str(&format!(
                "summary: errors={} warnings={} infos={} units={}\n",
                s.errors, s.warnings, s.infos, s.units
            ));
            if report.status() == ScanStatus::Cancelled {
                out.push_str("status: cancelled\n");
            }
            out
        }
    }
}

/// Compose report JSON object (pure) for testing/snapshot purposes.
pub fn compose_report_json(report: &ScanReport) -> JsonVal {
    serde_json::to_value(report).unwrap_or(JsonVal::Null)
}

/// Plain lines for the error channel: load errors first, then rule errors.
pub fn format_diagnostics(load: &[LoadError], rules: &[RuleExecutionError]) -> Vec<String> {
    load.iter()
        .map(|e| e.to_string())
        .chain(rules.iter().map(|e| e.to_string()))
        .collect()
}

/// Diagnostics as JSON, for `--format json` runs.
pub fn compose_diagnostics_json(load: &[LoadError], rules: &[RuleExecutionError]) -> JsonVal {
    json!({ "loadErrors": load, "ruleErrors": rules })
}

/// Table of registered rules for `smellscan rules`.
pub fn format_rules(registry: &Registry) -> String {
    let width = registry
        .all()
        .iter()
        .map(|r| r.id().len())
        .max()
        .unwrap_or(0);
    let mut out = String::new();
    for r in registry.all() {
        let m = r.meta();
        out.push_str(&format!(
            "{:<width$}  {:<7}  {:<5}  {}\n",
            m.id,
            m.severity.as_str(),
            r.scope(),
            m.description,
            width = width
        ));
    }
    out
}

/// Print diagnostics to stderr, colored unless disabled.
pub fn print_diagnostics(load: &[LoadError], rules: &[RuleExecutionError], style: OutputStyle) {
    if style == OutputStyle::Json {
        if load.is_empty() && rules.is_empty() {
            return;
        }
        let v = compose_diagnostics_json(load, rules);
        eprintln!(
            "{}",
            serde_json::to_string_pretty(&v).unwrap_or_else(|_| "{}".to_string())
        );
        return;
    }
    let color = utils::use_colors(false);
    for line in format_diagnostics(load, rules) {
        eprintln!("{} {}", utils::warn_prefix(color), line);
    }
}

/// Print the report to stdout, coloring severities in plain mode.
pub fn print_report(report: &ScanReport, style: OutputStyle) {
    if style == OutputStyle::Json || !utils::use_colors(false) {
        print!("{}", format_report(report, style));
        return;
    }
    for f in report.findings() {
        let line = format_finding(f);
        let tag = format!("[{}]", f.severity);
        let colored = match f.severity {
            crate::models::Severity::Error => tag.red().bold().to_string(),
            crate::models::Severity::Warning => tag.yellow().bold().to_string(),
            crate::models::Severity::Info => tag.blue().bold().to_string(),
        };
        println!("{}", line.replacen(&tag, &colored, 1));
    }
    let s = report.summary();
    let summary = format!(
        "summary: errors={} warnings={} infos={} units={}",
        s.errors, s.warnings, s.infos, s.units
    );
    println!("{}", summary.bold());
    if report.status() == ScanStatus::Cancelled {
        println!("{}", "status: cancelled".yellow());
    }
}
