//! `singleton-state`: a static instance holder next to shared mutable
//! collections.

use super::{RuleMeta, UnitRule};
use crate::config::ScanConfig;
use crate::error::RuleFault;
use crate::lex;
use crate::models::{Finding, Severity, SourceUnit};
use regex::Regex;
use std::sync::LazyLock;

static META: RuleMeta = RuleMeta {
    id: "singleton-state",
    description: "module-level mutable collection combined with a static instance holder",
    severity: Severity::Warning,
};

static INSTANCE_HOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bstatic\s+(?:\w+\s+)*_?instance\b|\bgetInstance\s*\(|^\s*_instance\s*=").unwrap()
});
static MUTABLE_COLLECTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"=\s*new\s+(?:Map|Set|WeakMap|Array)\b|=\s*\[\s*\]|=\s*\{\s*\}\s*;?\s*$|=\s*(?:dict|list|set)\(\s*\)",
    )
    .unwrap()
});
static IMMUTABLE_DECL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\breadonly\b|Object\.freeze\(").unwrap());

pub struct SingletonState;

impl UnitRule for SingletonState {
    fn meta(&self) -> &RuleMeta {
        &META
    }

    fn check(&self, unit: &SourceUnit, _config: &ScanConfig) -> Result<Vec<Finding>, RuleFault> {
        let code = unit.code();
        let funcs = lex::functions(code);
        let holder = code.iter().position(|l| INSTANCE_HOLDER.is_match(l));
        // Collections declared inside a function body are locals, not shared state.
        let collections: Vec<usize> = code
            .iter()
            .enumerate()
            .filter(|(i, l)| {
                MUTABLE_COLLECTION.is_match(l)
                    && !IMMUTABLE_DECL.is_match(l)
                    && lex::innermost(&funcs, *i).is_none()
            })
            .map(|(i, _)| i + 1)
            .collect();
        let Some(holder) = holder else {
            return Ok(Vec::new());
        };
        if collections.is_empty() {
            return Ok(Vec::new());
        }
        let lines = collections
            .iter()
            .map(usize::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        Ok(vec![Finding::for_unit(
            META.id,
            META.severity,
            unit,
            format!(
                "static instance holder at line {} shares {} mutable collection(s) (lines {})",
                holder + 1,
                collections.len(),
                lines
            ),
        )])
    }
}
