//! `circular-import`: cycles in the import graph across all units.

use super::{GraphRule, RuleMeta};
use crate::config::ScanConfig;
use crate::error::RuleFault;
use crate::graph::ImportGraph;
use crate::models::{Finding, Severity, SourceUnit};
use std::sync::Arc;

static META: RuleMeta = RuleMeta {
    id: "circular-import",
    description: "units that transitively import each other",
    severity: Severity::Error,
};

pub struct CircularImport;

impl GraphRule for CircularImport {
    fn meta(&self) -> &RuleMeta {
        &META
    }

    fn check(
        &self,
        units: &[Arc<SourceUnit>],
        config: &ScanConfig,
    ) -> Result<Vec<Finding>, RuleFault> {
        let graph = ImportGraph::build(units, &config.extensions);
        let mut out = Vec::new();
        for cycle in graph.cycles() {
            let (Some(first), Some(second)) = (cycle.first(), cycle.get(1)) else {
                continue;
            };
            let line = graph.edge_line(first, second).ok_or_else(|| {
                RuleFault(format!("cycle edge {} -> {} has no import line", first, second))
            })?;
            let mut chain = cycle.clone();
            chain.push(first.clone());
            out.push(Finding {
                rule: META.id.to_string(),
                unit: first.clone(),
                line: Some(line),
                message: format!("import cycle: {}", chain.join(" -> ")),
                severity: META.severity,
            });
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn units(files: &[(&str, &str)]) -> Vec<Arc<SourceUnit>> {
        files
            .iter()
            .map(|(id, text)| Arc::new(SourceUnit::from_text(id, text)))
            .collect()
    }

    #[test]
    fn test_cycle_reported_once_regardless_of_unit_order() {
        let files = [
            ("a.ts", "import { b } from './b';\n"),
            ("b.ts", "// b\nimport { c } from './c';\n"),
            ("c.ts", "import { a } from './a';\n"),
        ];
        let forward = CircularImport
            .check(&units(&files), &ScanConfig::default())
            .unwrap();
        let mut reversed_files = files;
        reversed_files.reverse();
        let backward = CircularImport
            .check(&units(&reversed_files), &ScanConfig::default())
            .unwrap();
        assert_eq!(forward.len(), 1);
        assert_eq!(forward, backward);
        assert_eq!(forward[0].unit, "a.ts");
        assert_eq!(forward[0].line, Some(1));
        assert_eq!(forward[0].message, "import cycle: a.ts -> b.ts -> c.ts -> a.ts");
    }

    #[test]
    fn test_overlapping_cycles_are_reported_separately() {
        let found = CircularImport
            .check(
                &units(&[
                    ("a.ts", "import { b } from './b';\nimport { c } from './c';\n"),
                    ("b.ts", "import { c } from './c';\n"),
                    ("c.ts", "import { a } from './a';\n"),
                ]),
                &ScanConfig::default(),
            )
            .unwrap();
        let messages: Vec<_> = found.iter().map(|f| f.message.as_str()).collect();
        assert_eq!(
            messages,
            vec![
                "import cycle: a.ts -> b.ts -> c.ts -> a.ts",
                "import cycle: a.ts -> c.ts -> a.ts",
            ]
        );
        assert_eq!(found[1].line, Some(2));
    }

    #[test]
    fn test_two_way_cycle_uses_importing_line() {
        let found = CircularImport
            .check(
                &units(&[
                    ("user.ts", "import { Order } from './order';\n"),
                    ("order.ts", "const x = 1;\nimport { User } from './user';\n"),
                ]),
                &ScanConfig::default(),
            )
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].unit, "order.ts");
        assert_eq!(found[0].line, Some(2));
    }
}
