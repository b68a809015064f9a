//! `inconsistent-style`: naming and quoting conventions mixed within a unit.
//!
//! Function names are classified by case convention and any function that
//! departs from the unit's dominant convention is reported at its header.
//! Single-word lowercase names fit every convention and are not counted.
//! Separately, a unit whose string literals mix `'` and `"` quoting gets one
//! unit-level finding.

use super::{RuleMeta, UnitRule};
use crate::config::ScanConfig;
use crate::error::RuleFault;
use crate::lex;
use crate::models::{Finding, Severity, SourceUnit};
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

static META: RuleMeta = RuleMeta {
    id: "inconsistent-style",
    description: "function naming or quote style departs from the rest of the unit",
    severity: Severity::Info,
};

// Literals in masked code: quotes survive, contents are blank.
static SINGLE_QUOTED: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"' *'").unwrap());
static DOUBLE_QUOTED: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"" *""#).unwrap());

/// Fewest literals of the minority quote style that count as mixing.
const MIN_MINORITY_QUOTES: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Case {
    Camel,
    Snake,
    Pascal,
    Mixed,
}

impl fmt::Display for Case {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Case::Camel => "camelCase",
            Case::Snake => "snake_case",
            Case::Pascal => "PascalCase",
            Case::Mixed => "mixed case",
        })
    }
}

fn classify(name: &str) -> Option<Case> {
    let core = name.trim_start_matches(['_', '$']);
    let first = core.chars().next()?;
    let has_upper = core.chars().any(|c| c.is_ascii_uppercase());
    let has_underscore = core.contains('_');
    match (first.is_ascii_uppercase(), has_upper, has_underscore) {
        (false, false, false) => None,
        (false, true, false) => Some(Case::Camel),
        (false, false, true) => Some(Case::Snake),
        (true, _, false) => Some(Case::Pascal),
        // SCREAMING_CASE is a constant convention, not a function one.
        (true, _, true) if !core.chars().any(|c| c.is_ascii_lowercase()) => None,
        _ => Some(Case::Mixed),
    }
}

pub struct InconsistentStyle;

impl UnitRule for InconsistentStyle {
    fn meta(&self) -> &RuleMeta {
        &META
    }

    fn check(&self, unit: &SourceUnit, _config: &ScanConfig) -> Result<Vec<Finding>, RuleFault> {
        let mut out = Vec::new();

        let funcs = lex::functions(unit.code());
        let named: Vec<(usize, &str, Case)> = funcs
            .iter()
            .filter_map(|f| classify(&f.name).map(|case| (f.start, f.name.as_str(), case)))
            .collect();
        if let Some(dominant) = dominant_case(&named) {
            for &(line, name, case) in &named {
                if case != dominant {
                    out.push(Finding::at_line(
                        META.id,
                        META.severity,
                        unit,
                        line + 1,
                        format!(
                            "function '{}' uses {}; most functions here use {}",
                            name, case, dominant
                        ),
                    ));
                }
            }
        }

        let (single, double) = unit.code().iter().fold((0, 0), |(s, d), l| {
            (
                s + SINGLE_QUOTED.find_iter(l).count(),
                d + DOUBLE_QUOTED.find_iter(l).count(),
            )
        });
        if single.min(double) >= MIN_MINORITY_QUOTES {
            out.push(Finding::for_unit(
                META.id,
                META.severity,
                unit,
                format!(
                    "mixes quote styles: {} single-quoted and {} double-quoted strings",
                    single, double
                ),
            ));
        }
        Ok(out)
    }
}

/// Most frequent case; ties go to the one seen first. `None` when every
/// counted name agrees.
fn dominant_case(named: &[(usize, &str, Case)]) -> Option<Case> {
    let mut counts: Vec<(Case, usize)> = Vec::new();
    for &(_, _, case) in named {
        match counts.iter_mut().find(|(c, _)| *c == case) {
            Some((_, n)) => *n += 1,
            None => counts.push((case, 1)),
        }
    }
    if counts.len() < 2 {
        return None;
    }
    let best = counts.iter().map(|(_, n)| *n).max()?;
    counts.into_iter().find(|(_, n)| *n == best).map(|(c, _)| c)
}
