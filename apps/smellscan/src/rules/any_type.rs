//! `any-type-usage`: explicit `any` annotations that opt out of type checking.

use super::{RuleMeta, UnitRule};
use crate::config::ScanConfig;
use crate::error::RuleFault;
use crate::models::{Finding, Severity, SourceUnit};
use regex::Regex;
use std::sync::LazyLock;

static META: RuleMeta = RuleMeta {
    id: "any-type-usage",
    description: "explicit `any` type annotation",
    severity: Severity::Info,
};

static ANY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?::\s*any\b|\bas\s+any\b|[<,]\s*any\s*[>,\[]|\bany\s*\[\s*\])").unwrap()
});

pub struct AnyTypeUsage;

impl UnitRule for AnyTypeUsage {
    fn meta(&self) -> &RuleMeta {
        &META
    }

    fn check(&self, unit: &SourceUnit, _config: &ScanConfig) -> Result<Vec<Finding>, RuleFault> {
        Ok(unit
            .code()
            .iter()
            .enumerate()
            .filter_map(|(i, line)| {
                let n = ANY.find_iter(line).count();
                (n > 0).then(|| {
                    Finding::at_line(
                        META.id,
                        META.severity,
                        unit,
                        i + 1,
                        if n == 1 {
                            "explicit 'any' type".to_string()
                        } else {
                            format!("{} explicit 'any' types", n)
                        },
                    )
                })
            })
            .collect())
    }
}
