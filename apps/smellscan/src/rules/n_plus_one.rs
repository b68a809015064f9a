//! `n-plus-one-query`: a data-store query issued once per loop iteration.

use super::{RuleMeta, UnitRule};
use crate::config::ScanConfig;
use crate::error::RuleFault;
use crate::lex;
use crate::models::{Finding, Severity, SourceUnit};
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;

static META: RuleMeta = RuleMeta {
    id: "n-plus-one-query",
    description: "query call inside a loop body",
    severity: Severity::Warning,
};

static LOOP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:for|while)\b|\.(?:forEach|map|flatMap)\s*\(").unwrap()
});
static QUERY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b(?:db|database|conn|connection|cursor|session|repo|repository|prisma|knex)\s*\.\s*(?:query|execute|find\w*|get\w*|select|fetch\w*)\s*\(|\.(?:query|execute|findOne|findById|findUnique)\s*\(",
    )
    .unwrap()
});

pub struct NPlusOneQuery;

impl UnitRule for NPlusOneQuery {
    fn meta(&self) -> &RuleMeta {
        &META
    }

    fn check(&self, unit: &SourceUnit, _config: &ScanConfig) -> Result<Vec<Finding>, RuleFault> {
        let code = unit.code();
        // query line -> innermost loop header line
        let mut hits: BTreeMap<usize, usize> = BTreeMap::new();
        for (start, line) in code.iter().enumerate() {
            if !LOOP.is_match(line) {
                continue;
            }
            let Some(end) = lex::block_end(code, start) else {
                continue;
            };
            for i in start + 1..=end {
                if QUERY.is_match(&code[i]) {
                    let e = hits.entry(i).or_insert(start);
                    *e = (*e).max(start);
                }
            }
        }
        Ok(hits
            .into_iter()
            .map(|(line, header)| {
                Finding::at_line(
                    META.id,
                    META.severity,
                    unit,
                    line + 1,
                    format!(
                        "query runs once per iteration of the loop at line {}; batch it",
                        header + 1
                    ),
                )
            })
            .collect())
    }
}
