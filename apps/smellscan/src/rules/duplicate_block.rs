//! `duplicate-block`: runs of lines copied verbatim within one unit.
//!
//! Lines are compared on their masked, whitespace-collapsed form, so copies
//! that differ only in string contents, comments or indentation still match.
//! Blank lines, lone braces and import/package headers are ignored.

use super::{RuleMeta, UnitRule};
use crate::config::ScanConfig;
use crate::error::RuleFault;
use crate::models::{Finding, Severity, SourceUnit};
use std::collections::HashMap;

static META: RuleMeta = RuleMeta {
    id: "duplicate-block",
    description: "run of lines repeated elsewhere in the same unit",
    severity: Severity::Warning,
};

/// Significant lines a repeated run must span.
const MIN_LINES: usize = 6;

pub struct DuplicateBlock;

impl UnitRule for DuplicateBlock {
    fn meta(&self) -> &RuleMeta {
        &META
    }

    fn check(&self, unit: &SourceUnit, _config: &ScanConfig) -> Result<Vec<Finding>, RuleFault> {
        let (lines, texts): (Vec<usize>, Vec<String>) = unit
            .code()
            .iter()
            .enumerate()
            .filter_map(|(i, l)| normalize(l).map(|t| (i, t)))
            .unzip();

        let mut first: HashMap<&[String], usize> = HashMap::new();
        let mut out = Vec::new();
        let mut j = 0;
        while j + MIN_LINES <= texts.len() {
            let window = &texts[j..j + MIN_LINES];
            match first.get(window) {
                Some(&i) if i + MIN_LINES <= j => {
                    // Grow the match while both copies keep agreeing and the
                    // earlier one does not run into the later one.
                    let mut len = MIN_LINES;
                    while j + len < texts.len() && i + len < j && texts[i + len] == texts[j + len] {
                        len += 1;
                    }
                    let (start, end) = (lines[j] + 1, lines[j + len - 1] + 1);
                    out.push(Finding::at_line(
                        META.id,
                        META.severity,
                        unit,
                        start,
                        format!(
                            "lines {}-{} repeat lines {}-{}",
                            start,
                            end,
                            lines[i] + 1,
                            lines[i + len - 1] + 1
                        ),
                    ));
                    j += len;
                }
                Some(_) => j += 1,
                None => {
                    first.insert(window, j);
                    j += 1;
                }
            }
        }
        Ok(out)
    }
}

fn normalize(line: &str) -> Option<String> {
    let text = line.split_whitespace().collect::<Vec<_>>().join(" ");
    if text.chars().all(|c| "{}()[];,".contains(c)) {
        return None;
    }
    if text.starts_with("import ") || text.starts_with("package ") {
        return None;
    }
    Some(text)
}
