//! `magic-number`: unnamed numeric literals in arithmetic or comparisons.

use super::{RuleMeta, UnitRule};
use crate::config::ScanConfig;
use crate::error::RuleFault;
use crate::models::{Finding, Severity, SourceUnit};
use regex::Regex;
use std::sync::LazyLock;

static META: RuleMeta = RuleMeta {
    id: "magic-number",
    description: "numeric literal used in arithmetic/comparison outside a named constant",
    severity: Severity::Warning,
};

static NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+(?:\.\d+)?(?:[eE][+-]?\d+)?").unwrap());
static NAMED_CONST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^\s*(?:(?:export\s+)?const\s+|(?:(?:private|public|protected)\s+)?static\s+readonly\s+|(?:export\s+)?final\s+)?[A-Z][A-Z0-9_]*\s*(?::[^=]*)?=[^=]",
    )
    .unwrap()
});

const OPERATORS: &[char] = &['*', '/', '%', '+', '-', '<', '>', '='];
// Characters that turn a following `=` into a compound or comparison operator.
const EQ_PREFIX: &[char] = &['*', '/', '%', '+', '-', '<', '>', '=', '!', '&', '|', '^'];

pub struct MagicNumber;

impl UnitRule for MagicNumber {
    fn meta(&self) -> &RuleMeta {
        &META
    }

    fn check(&self, unit: &SourceUnit, _config: &ScanConfig) -> Result<Vec<Finding>, RuleFault> {
        let mut out = Vec::new();
        for (i, line) in unit.code().iter().enumerate() {
            if NAMED_CONST.is_match(line) {
                continue;
            }
            for (col, lit) in operator_literals(line) {
                out.push(Finding::at_line(
                    META.id,
                    META.severity,
                    unit,
                    i + 1,
                    format!(
                        "magic number {} at column {} in expression; extract a named constant",
                        lit, col
                    ),
                ));
            }
        }
        Ok(out)
    }
}

/// Literals on a masked line that sit next to an arithmetic/comparison
/// operator, with their 1-based column.
fn operator_literals(line: &str) -> Vec<(usize, &str)> {
    let mut out = Vec::new();
    for m in NUMBER.find_iter(line) {
        let before = &line[..m.start()];
        let after = &line[m.end()..];
        let glued_before = before
            .chars()
            .next_back()
            .is_some_and(|c| c.is_alphanumeric() || c == '_' || c == '$' || c == '.');
        let glued_after = after
            .chars()
            .next()
            .is_some_and(|c| c.is_alphanumeric() || c == '_' || c == '$');
        if glued_before || glued_after || in_type_args(before, after) {
            continue;
        }
        let lit = m.as_str();
        match lit.parse::<f64>() {
            Ok(v) if v == 0.0 || v == 1.0 => continue,
            Ok(_) => {}
            Err(_) => continue,
        }
        if operator_before(before) || operator_after(after) {
            out.push((before.chars().count() + 1, lit));
        }
    }
    out
}

// `Array<3>`, `Tuple<2, T>`: angle brackets glued to a type name.
fn in_type_args(before: &str, after: &str) -> bool {
    let mut rev = before.chars().rev();
    rev.next() == Some('<')
        && rev.next().is_some_and(|c| c.is_alphanumeric() || c == '_')
        && after.trim_start().starts_with(['>', ','])
}

fn operator_before(before: &str) -> bool {
    let trimmed = before.trim_end();
    let mut rev = trimmed.chars().rev();
    match rev.next() {
        Some('=') => rev.next().is_some_and(|c| EQ_PREFIX.contains(&c)),
        // `=>` and `->` are arrows.
        Some('>') => !matches!(rev.next(), Some('=') | Some('-')),
        Some(sign @ ('-' | '+')) => {
            let prev = trimmed[..trimmed.len() - sign.len_utf8()].trim_end();
            if ends_operand(prev) {
                true
            } else {
                // Unary sign: the literal belongs to whatever precedes it.
                operator_before(prev)
            }
        }
        Some(c) => OPERATORS.contains(&c),
        None => false,
    }
}

fn ends_operand(prev: &str) -> bool {
    if ["return", "case", "yield", "typeof"]
        .iter()
        .any(|kw| prev.ends_with(kw) && !prev[..prev.len() - kw.len()].ends_with(is_ident))
    {
        return false;
    }
    prev.chars().next_back().is_some_and(|c| is_ident(c) || c == ')' || c == ']')
}

fn is_ident(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

fn operator_after(after: &str) -> bool {
    let mut it = after.trim_start().chars();
    match it.next() {
        Some('=') => it.next() == Some('='),
        Some('!') => it.next() == Some('='),
        Some(c) => OPERATORS.contains(&c),
        None => false,
    }
}
