//! `missing-error-handling`: chains of asynchronous operations with no
//! failure handling in or around the enclosing function.

use super::{RuleMeta, UnitRule};
use crate::config::ScanConfig;
use crate::error::RuleFault;
use crate::lex::{self, Span};
use crate::models::{Finding, Severity, SourceUnit};
use regex::Regex;
use std::sync::LazyLock;

static META: RuleMeta = RuleMeta {
    id: "missing-error-handling",
    description: "two or more dependent async operations without try/catch or .catch()",
    severity: Severity::Error,
};

static AWAIT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\bawait\b").unwrap());
static THEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\.then\s*\(").unwrap());
static HANDLER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\btry\b|\.catch\s*\(|\bexcept\b").unwrap());
static TRY_OPEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\btry\s*(?:\{|:)").unwrap());

pub struct MissingErrorHandling;

impl UnitRule for MissingErrorHandling {
    fn meta(&self) -> &RuleMeta {
        &META
    }

    fn check(&self, unit: &SourceUnit, _config: &ScanConfig) -> Result<Vec<Finding>, RuleFault> {
        let code = unit.code();
        let funcs = lex::functions(code);
        let try_blocks: Vec<Span> = code
            .iter()
            .enumerate()
            .filter(|(_, l)| TRY_OPEN.is_match(l))
            .filter_map(|(i, _)| {
                lex::block_end(code, i).map(|end| Span {
                    name: "try".into(),
                    start: i,
                    end,
                })
            })
            .collect();

        // Async operations belong to the innermost function containing them.
        let mut ops = vec![0usize; funcs.len()];
        for (i, line) in code.iter().enumerate() {
            let n = async_ops(line);
            if n == 0 {
                continue;
            }
            if let Some(idx) = innermost_index(&funcs, i) {
                ops[idx] += n;
            }
        }

        let mut out = Vec::new();
        for (func, count) in funcs.iter().zip(ops) {
            if count < 2 {
                continue;
            }
            let handled_inside = own_lines(func, &funcs).any(|i| HANDLER.is_match(&code[i]));
            let wrapped = try_blocks.iter().any(|t| t.encloses(func));
            if !handled_inside && !wrapped {
                out.push(Finding::at_line(
                    META.id,
                    META.severity,
                    unit,
                    func.start + 1,
                    format!(
                        "'{}' chains {} async operations with no error handling",
                        func.name, count
                    ),
                ));
            }
        }
        Ok(out)
    }
}

/// Count of async steps on one masked line. A `.then(` chain not preceded
/// by `await` also counts the call that produced the promise.
fn async_ops(line: &str) -> usize {
    let awaits = AWAIT.find_iter(line).count();
    let thens = THEN.find_iter(line).count();
    let producer = usize::from(thens > 0 && awaits == 0);
    awaits + thens + producer
}

/// Lines of `func` outside the bodies of functions nested in it. Header and
/// closing lines of a nested callback still count, since `.catch(` there is
/// called by `func`.
fn own_lines<'a>(func: &'a Span, funcs: &'a [Span]) -> impl Iterator<Item = usize> + 'a {
    (func.start..=func.end)
        .filter(move |&i| !funcs.iter().any(|g| func.encloses(g) && g.start < i && i < g.end))
}

fn innermost_index(spans: &[Span], line: usize) -> Option<usize> {
    spans
        .iter()
        .enumerate()
        .filter(|(_, s)| s.contains(line))
        .max_by_key(|(_, s)| s.start)
        .map(|(i, _)| i)
}
