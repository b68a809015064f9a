//! `god-object-size`: a type or module with too many methods, or whose
//! section headers span too many responsibility domains.

use super::{RuleMeta, UnitRule};
use crate::config::ScanConfig;
use crate::error::RuleFault;
use crate::lex::{self, Span};
use crate::models::{Finding, Severity, SourceUnit};
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::LazyLock;

static META: RuleMeta = RuleMeta {
    id: "god-object-size",
    description: "type/module with too many methods or too many responsibility sections",
    severity: Severity::Error,
};

/// Distinct header domains at which a type counts as doing too much.
const DOMAIN_LIMIT: usize = 3;

// `// ===== USER MANAGEMENT (should be UserService) =====`, `# ---- Orders ----`
static SECTION_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?://+|#+)\s*[=\-*#]{3,}\s*([A-Za-z][A-Za-z ]*[A-Za-z])").unwrap()
});

// Words that name the kind of section rather than its domain.
const GENERIC_WORDS: &[&str] = &[
    "MANAGEMENT", "PROCESSING", "METHODS", "METHOD", "SERVICE", "SERVICES", "HELPERS", "HELPER",
    "LOGIC", "HANDLING", "THE",
];

pub struct GodObjectSize;

impl UnitRule for GodObjectSize {
    fn meta(&self) -> &RuleMeta {
        &META
    }

    fn check(&self, unit: &SourceUnit, config: &ScanConfig) -> Result<Vec<Finding>, RuleFault> {
        let code = unit.code();
        let funcs = lex::functions(code);
        let classes = lex::classes(code);
        let threshold = config.god_object_threshold;
        let mut out = Vec::new();

        for class in &classes {
            let methods = funcs
                .iter()
                .filter(|f| class.encloses(f) && is_direct_member(f, class, &funcs))
                .count();
            let domains = section_domains(unit.lines(), class.start, class.end);
            if let Some(msg) = verdict("class", &class.name, methods, &domains, threshold) {
                out.push(Finding::at_line(
                    META.id,
                    META.severity,
                    unit,
                    class.start + 1,
                    msg,
                ));
            }
        }

        // Module level: functions and headers that sit outside every class.
        let top_level = funcs
            .iter()
            .filter(|f| !classes.iter().any(|c| c.encloses(f)))
            .filter(|f| !funcs.iter().any(|g| g.encloses(f)))
            .count();
        let module_domains: BTreeSet<String> = unit
            .lines()
            .iter()
            .enumerate()
            .filter(|(i, _)| !classes.iter().any(|c| c.contains(*i)))
            .filter_map(|(_, l)| header_domain(l))
            .collect();
        if let Some(msg) = verdict("module", &unit.id, top_level, &module_domains, threshold) {
            out.push(Finding::for_unit(META.id, META.severity, unit, msg));
        }
        Ok(out)
    }
}

fn verdict(
    kind: &str,
    name: &str,
    methods: usize,
    domains: &BTreeSet<String>,
    threshold: usize,
) -> Option<String> {
    let too_many = methods > threshold;
    let too_broad = domains.len() >= DOMAIN_LIMIT;
    let domain_list = || domains.iter().cloned().collect::<Vec<_>>().join(", ");
    match (too_many, too_broad) {
        (false, false) => None,
        (true, false) => Some(format!(
            "{} '{}' defines {} methods (threshold {})",
            kind, name, methods, threshold
        )),
        (false, true) => Some(format!(
            "{} '{}' spans {} responsibility domains: {}",
            kind,
            name,
            domains.len(),
            domain_list()
        )),
        (true, true) => Some(format!(
            "{} '{}' defines {} methods (threshold {}) across {} responsibility domains: {}",
            kind,
            name,
            methods,
            threshold,
            domains.len(),
            domain_list()
        )),
    }
}

// A method belongs directly to `class` when no other function inside the
// class wraps it.
fn is_direct_member(f: &Span, class: &Span, funcs: &[Span]) -> bool {
    !funcs
        .iter()
        .any(|g| class.encloses(g) && g.encloses(f))
}

fn section_domains(lines: &[String], start: usize, end: usize) -> BTreeSet<String> {
    lines
        .iter()
        .take(end + 1)
        .skip(start)
        .filter_map(|l| header_domain(l))
        .collect()
}

/// Domain noun of a section-header comment, uppercased.
fn header_domain(line: &str) -> Option<String> {
    let caps = SECTION_HEADER.captures(line)?;
    caps[1]
        .split_whitespace()
        .map(str::to_ascii_uppercase)
        .find(|w| !GENERIC_WORDS.contains(&w.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn class_with_methods(n: usize) -> String {
        let mut s = String::from("export class Manager {\n  private items = [];\n");
        for i in 0..n {
            s.push_str(&format!("  method{}(a: string): void {{\n    this.items.push(a);\n  }}\n", i));
        }
        s.push_str("}\n");
        s
    }

    fn run(src: &str) -> Vec<Finding> {
        GodObjectSize
            .check(&SourceUnit::from_text("manager.ts", src), &ScanConfig::default())
            .unwrap()
    }

    #[test]
    fn test_twenty_one_methods_trigger_once() {
        let found = run(&class_with_methods(21));
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].line, Some(1));
        assert!(found[0].message.contains("21 methods"));
    }

    #[test]
    fn test_nineteen_and_twenty_methods_pass() {
        assert!(run(&class_with_methods(19)).is_empty());
        assert!(run(&class_with_methods(20)).is_empty());
    }

    #[test]
    fn test_threshold_comes_from_config() {
        let cfg = ScanConfig {
            god_object_threshold: 5,
            ..ScanConfig::default()
        };
        let unit = SourceUnit::from_text("m.ts", &class_with_methods(6));
        assert_eq!(GodObjectSize.check(&unit, &cfg).unwrap().len(), 1);
    }

    #[test]
    fn test_section_headers_spanning_three_domains() {
        let src = r#"export class AppManager {
  // ========== USER MANAGEMENT (should be UserService) ==========
  createUser() {
  }
  // ========== ORDER MANAGEMENT ==========
  createOrder() {
  }
  // ========== PAYMENT PROCESSING ==========
  pay() {
  }
}
"#;
        let found = run(src);
        assert_eq!(found.len(), 1);
        assert!(found[0].message.contains("ORDER, PAYMENT, USER"));
    }

    #[test]
    fn test_nested_callbacks_are_not_methods() {
        let mut src = String::from("class Svc {\n");
        for i in 0..15 {
            src.push_str(&format!(
                "  run{}() {{\n    items.forEach(x => {{\n      go(x);\n    }});\n  }}\n",
                i
            ));
        }
        src.push_str("}\n");
        assert!(run(&src).is_empty());
    }

    #[test]
    fn test_module_with_many_functions() {
        let mut src = String::new();
        for i in 0..22 {
            src.push_str(&format!("export function f{}() {{\n  return {};\n}}\n", i, i));
        }
        let found = run(&src);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].line, None);
        assert!(found[0].message.contains("22 methods"));
    }

    #[test]
    fn test_header_domain_skips_generic_words() {
        assert_eq!(
            header_domain("  // ========== UTILITY METHODS (mixed concerns) =========="),
            Some("UTILITY".into())
        );
        assert_eq!(header_domain("// plain comment"), None);
    }
}
