//! `no-console-log`: direct console/print calls mixed with a structured
//! logger inside the same function.

use super::{RuleMeta, UnitRule};
use crate::config::ScanConfig;
use crate::error::RuleFault;
use crate::lex;
use crate::models::{Finding, Severity, SourceUnit};
use regex::Regex;
use std::sync::LazyLock;

static META: RuleMeta = RuleMeta {
    id: "no-console-log",
    description: "console/print call in a function that also uses a structured logger",
    severity: Severity::Warning,
};

static CONSOLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:\bconsole\.(log|warn|error|info|debug|trace)|^\s*(print))\s*\(").unwrap()
});
static LOGGER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:logger|log|logging)\.(?:info|warn|warning|error|debug|trace|fatal)\s*\(")
        .unwrap()
});

pub struct NoConsoleLog;

impl UnitRule for NoConsoleLog {
    fn meta(&self) -> &RuleMeta {
        &META
    }

    fn check(&self, unit: &SourceUnit, _config: &ScanConfig) -> Result<Vec<Finding>, RuleFault> {
        let code = unit.code();
        let funcs = lex::functions(code);
        let mut out = Vec::new();
        for (i, line) in code.iter().enumerate() {
            let Some(caps) = CONSOLE.captures(line) else {
                continue;
            };
            let Some(func) = lex::innermost(&funcs, i) else {
                continue;
            };
            let uses_logger = code[func.start..=func.end]
                .iter()
                .any(|l| LOGGER.is_match(l));
            if uses_logger {
                let call = caps
                    .get(1)
                    .map(|m| format!("console.{}", m.as_str()))
                    .unwrap_or_else(|| "print".to_string());
                out.push(Finding::at_line(
                    META.id,
                    META.severity,
                    unit,
                    i + 1,
                    format!(
                        "{} in '{}' which also uses the structured logger",
                        call, func.name
                    ),
                ));
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(src: &str) -> Vec<Finding> {
        NoConsoleLog
            .check(&SourceUnit::from_text("svc.ts", src), &ScanConfig::default())
            .unwrap()
    }

    #[test]
    fn test_flags_console_next_to_logger() {
        let src = r#"export class UserService {
  async createUser(email: string) {
    logger.info('Creating user');
    console.log('User created:', email);
  }

  async plain() {
    console.log('only console here');
  }
}
"#;
        let found = run(src);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].line, Some(4));
        assert!(found[0].message.contains("createUser"));
    }

    #[test]
    fn test_ignores_commented_and_string_console() {
        let src = "function f() {\n  logger.warn('x');\n  // console.log('old');\n  const s = 'console.log(1)';\n}\n";
        assert!(run(src).is_empty());
    }
}
