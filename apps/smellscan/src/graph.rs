//! Import graph over loaded units and cycle enumeration.
//!
//! Nodes are unit ids; edges come from relative import specifiers that
//! resolve to another loaded unit. Bare package imports and unresolvable
//! paths are dropped. Adjacency lists are kept sorted so traversal order,
//! and therefore the reported cycles, depend only on the unit set.

use crate::models::SourceUnit;
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::{Arc, LazyLock};

static ES_IMPORT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^\s*import\s+(?:type\s+)?(?:[^'"]*?\s*from\s*)?['"]([^'"]+)['"]"#).unwrap()
});
static ES_REEXPORT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^\s*export\s+(?:type\s+)?(?:\*|\{[^}]*\})(?:\s+as\s+[\w$]+)?\s*from\s*['"]([^'"]+)['"]"#)
        .unwrap()
});
static FROM_TAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^\s*\}\s*from\s*['"]([^'"]+)['"]"#).unwrap());
static REQUIRE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\brequire\s*\(\s*['"]([^'"]+)['"]\s*\)"#).unwrap()
});
static PY_FROM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*from\s+(\.+)([\w.]*)\s+import\b").unwrap());

#[derive(Debug, Clone, PartialEq, Eq)]
/// One import statement: the raw specifier and its 1-indexed line.
pub struct ImportRef {
    pub spec: String,
    pub line: usize,
}

/// Import specifiers found in `unit`, in line order.
///
/// Matching runs on raw lines, but a line only counts when its masked form
/// still holds the import keyword, so commented-out imports are skipped.
pub fn imports(unit: &SourceUnit) -> Vec<ImportRef> {
    let mut out = Vec::new();
    for (i, (raw, code)) in unit.lines().iter().zip(unit.code()).enumerate() {
        let code = code.trim_start();
        let mut push = |spec: String| out.push(ImportRef { spec, line: i + 1 });
        if code.starts_with("import") {
            if let Some(c) = ES_IMPORT.captures(raw) {
                push(c[1].to_string());
                continue;
            }
        }
        if code.starts_with("export") {
            if let Some(c) = ES_REEXPORT.captures(raw) {
                push(c[1].to_string());
                continue;
            }
        }
        if code.starts_with('}') {
            if let Some(c) = FROM_TAIL.captures(raw) {
                push(c[1].to_string());
                continue;
            }
        }
        if code.starts_with("from") {
            if let Some(c) = PY_FROM.captures(raw) {
                push(python_relative(&c[1], &c[2]));
                continue;
            }
        }
        if code.contains("require") {
            for c in REQUIRE.captures_iter(raw) {
                push(c[1].to_string());
            }
        }
    }
    out
}

// `..pkg.mod` -> `../pkg/mod`
fn python_relative(dots: &str, rest: &str) -> String {
    let mut s = String::from("./");
    for _ in 1..dots.len() {
        s.push_str("../");
    }
    s.push_str(&rest.replace('.', "/"));
    s
}

/// Normalize `dir/spec` into a root-relative id; `None` if it escapes the root.
pub fn join_relative(dir: &str, spec: &str) -> Option<String> {
    let mut parts: Vec<&str> = dir.split('/').filter(|p| !p.is_empty()).collect();
    for seg in spec.split('/') {
        match seg {
            "" | "." => {}
            ".." => {
                parts.pop()?;
            }
            s => parts.push(s),
        }
    }
    Some(parts.join("/"))
}

/// Resolve a relative specifier against the importing unit to a known id.
pub fn resolve(
    from: &SourceUnit,
    spec: &str,
    known: &BTreeSet<&str>,
    extensions: &[String],
) -> Option<String> {
    if !(spec.starts_with("./") || spec.starts_with("../")) {
        return None;
    }
    let base = join_relative(from.dir(), spec)?;
    if known.contains(base.as_str()) {
        return Some(base);
    }
    for ext in extensions {
        let cand = format!("{}{}", base, ext);
        if known.contains(cand.as_str()) {
            return Some(cand);
        }
    }
    for ext in extensions {
        let cand = format!("{}/index{}", base, ext);
        if known.contains(cand.as_str()) {
            return Some(cand);
        }
    }
    None
}

/// Upper bound on reported cycles for one graph.
pub const MAX_CYCLES: usize = 10_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    pub target: String,
    /// Line of the first import statement that produced the edge.
    pub line: usize,
}

#[derive(Debug, Default)]
/// Directed import graph keyed by unit id.
pub struct ImportGraph {
    edges: BTreeMap<String, Vec<Edge>>,
}

impl ImportGraph {
    pub fn build(units: &[Arc<SourceUnit>], extensions: &[String]) -> Self {
        let known: BTreeSet<&str> = units.iter().map(|u| u.id.as_str()).collect();
        let mut edges = BTreeMap::new();
        for unit in units {
            let mut out: BTreeMap<String, usize> = BTreeMap::new();
            for imp in imports(unit) {
                if let Some(target) = resolve(unit, &imp.spec, &known, extensions) {
                    if target != unit.id {
                        out.entry(target).or_insert(imp.line);
                    }
                }
            }
            let list = out
                .into_iter()
                .map(|(target, line)| Edge { target, line })
                .collect();
            edges.insert(unit.id.clone(), list);
        }
        ImportGraph { edges }
    }

    pub fn edges(&self, node: &str) -> &[Edge] {
        self.edges.get(node).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Line in `from` that imports `to`.
    pub fn edge_line(&self, from: &str, to: &str) -> Option<usize> {
        self.edges(from)
            .iter()
            .find(|e| e.target == to)
            .map(|e| e.line)
    }

    /// Every elementary cycle, sorted.
    ///
    /// For each start node, an iterative depth-first search walks only nodes
    /// ordered after the start and records a cycle whenever an edge returns
    /// to it. Each cycle is found exactly once, from its smallest id, so it
    /// already comes out in canonical rotation. On-path marks are reset per
    /// start; enumeration stops after `MAX_CYCLES`.
    pub fn cycles(&self) -> Vec<Vec<String>> {
        let mut found: Vec<Vec<String>> = Vec::new();
        'starts: for start in self.edges.keys() {
            let start = start.as_str();
            let mut stack: Vec<(&str, usize)> = vec![(start, 0)];
            let mut on_path: HashSet<&str> = HashSet::from([start]);

            while let Some(top) = stack.last_mut() {
                let (node, next) = *top;
                let out = self.edges(node);
                if next >= out.len() {
                    on_path.remove(node);
                    stack.pop();
                    continue;
                }
                top.1 += 1;
                let target = out[next].target.as_str();
                if target == start {
                    found.push(stack.iter().map(|(n, _)| n.to_string()).collect());
                    if found.len() >= MAX_CYCLES {
                        tracing::warn!(limit = MAX_CYCLES, "cycle enumeration truncated");
                        break 'starts;
                    }
                } else if target > start && on_path.insert(target) {
                    stack.push((target, 0));
                }
            }
        }
        found.sort();
        found
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

    fn exts() -> Vec<String> {
        vec![".ts".into(), ".js".into()]
    }

    #[test]
    fn test_imports_cover_es_reexport_require_and_python() {
        let u = SourceUnit::from_text(
            "a.ts",
            "import { A } from './a2';\nimport './side';\nexport * from \"./b\";\n// import { X } from './commented';\nconst fs = require('fs');\nimport {\n  C,\n} from '../c';\n",
        );
        let specs: Vec<_> = imports(&u).into_iter().map(|i| (i.spec, i.line)).collect();
        assert_eq!(
            specs,
            vec![
                ("./a2".to_string(), 1),
                ("./side".to_string(), 2),
                ("./b".to_string(), 3),
                ("fs".to_string(), 5),
                ("../c".to_string(), 8),
            ]
        );
        let py = SourceUnit::from_text("pkg/mod.py", "from ..core.models import Order\nfrom . import util\n");
        let specs: Vec<_> = imports(&py).into_iter().map(|i| i.spec).collect();
        assert_eq!(specs, vec!["./../core/models", "./"]);
    }

    #[test]
    fn test_resolve_tries_extensions_and_index() {
        let us = units(&[("src/user.ts", ""), ("src/lib/index.js", ""), ("src/order.ts", "")]);
        let known: BTreeSet<&str> = us.iter().map(|u| u.id.as_str()).collect();
        let from = &us[2];
        assert_eq!(resolve(from, "./user", &known, &exts()), Some("src/user.ts".into()));
        assert_eq!(resolve(from, "./lib", &known, &exts()), Some("src/lib/index.js".into()));
        assert_eq!(resolve(from, "./user.ts", &known, &exts()), Some("src/user.ts".into()));
        assert_eq!(resolve(from, "lodash", &known, &exts()), None);
        assert_eq!(resolve(from, "../../outside", &known, &exts()), None);
    }

    #[test]
    fn test_three_cycle_reported_once_in_canonical_form() {
        let g = ImportGraph::build(
            &units(&[
                ("c.ts", "import { a } from './a';\n"),
                ("a.ts", "import { b } from './b';\n"),
                ("b.ts", "import { c } from './c';\n"),
            ]),
            &exts(),
        );
        assert_eq!(g.cycles(), vec![vec!["a.ts", "b.ts", "c.ts"]]);
    }

    #[test]
    fn test_acyclic_graph_has_no_cycles() {
        let g = ImportGraph::build(
            &units(&[
                ("a.ts", "import './b';\nimport './c';\n"),
                ("b.ts", "import './c';\n"),
                ("c.ts", ""),
            ]),
            &exts(),
        );
        assert!(g.cycles().is_empty());
        assert_eq!(g.edge_line("a.ts", "c.ts"), Some(2));
    }

    #[test]
    fn test_cycle_through_finished_node_is_still_found() {
        let g = ImportGraph::build(
            &units(&[
                ("a.ts", "import './b';\nimport './c';\n"),
                ("b.ts", "import './c';\n"),
                ("c.ts", "import './a';\n"),
            ]),
            &exts(),
        );
        assert_eq!(
            g.cycles(),
            vec![vec!["a.ts", "b.ts", "c.ts"], vec!["a.ts", "c.ts"]]
        );
    }

    #[test]
    fn test_cycles_lead_with_smallest_id() {
        let g = ImportGraph::build(
            &units(&[
                ("user.ts", "import './order';\nimport './notification';\n"),
                ("order.ts", "import './user';\n"),
                ("notification.ts", "import './user';\n"),
            ]),
            &exts(),
        );
        assert_eq!(
            g.cycles(),
            vec![
                vec!["notification.ts", "user.ts"],
                vec!["order.ts", "user.ts"],
            ]
        );
    }
}
