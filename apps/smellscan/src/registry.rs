//! Rule registry: an explicit value built at startup and handed to the engine.

use crate::config::ScanConfig;
use crate::error::{ConfigError, DuplicateRuleError};
use crate::rules::{self, Rule};
use std::collections::HashSet;

#[derive(Debug, Default, Clone)]
/// Rules keyed by id, iterated in insertion order.
pub struct Registry {
    rules: Vec<Rule>,
    ids: HashSet<&'static str>,
}

impl Registry {
    pub fn new() -> Self {
        Registry::default()
    }

    /// Registry holding every built-in rule.
    pub fn builtin() -> Result<Self, DuplicateRuleError> {
        let mut reg = Registry::new();
        for rule in rules::builtin() {
            reg.register(rule)?;
        }
        Ok(reg)
    }

    pub fn register(&mut self, rule: Rule) -> Result<(), DuplicateRuleError> {
        let id = rule.id();
        if !self.ids.insert(id) {
            return Err(DuplicateRuleError { id: id.to_string() });
        }
        self.rules.push(rule);
        Ok(())
    }

    pub fn all(&self) -> &[Rule] {
        &self.rules
    }

    pub fn get(&self, id: &str) -> Option<&Rule> {
        self.rules.iter().find(|r| r.id() == id)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Drop rules disabled by `[rules.<id>].enabled = false`.
    ///
    /// Fails when the config names a rule that is not registered.
    pub fn retain_enabled(&mut self, config: &ScanConfig) -> Result<(), ConfigError> {
        if let Some(unknown) = config.rules.keys().find(|id| !self.ids.contains(id.as_str())) {
            return Err(ConfigError::UnknownRule(unknown.clone()));
        }
        self.rules.retain(|r| config.rule_enabled(r.id()));
        self.ids = self.rules.iter().map(Rule::id).collect();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RuleFault;
    use crate::models::{Finding, Severity, SourceUnit};
    use crate::rules::{RuleMeta, UnitRule};

    static META: RuleMeta = RuleMeta {
        id: "magic-number",
        description: "impostor",
        severity: Severity::Info,
    };

    struct Impostor;

    impl UnitRule for Impostor {
        fn meta(&self) -> &RuleMeta {
            &META
        }

        fn check(&self, _: &SourceUnit, _: &ScanConfig) -> Result<Vec<Finding>, RuleFault> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn test_builtin_order_is_stable() {
        let reg = Registry::builtin().unwrap();
        let ids: Vec<_> = reg.all().iter().map(Rule::id).collect();
        assert_eq!(
            ids,
            vec![
                "no-console-log",
                "magic-number",
                "missing-error-handling",
                "god-object-size",
                "circular-import",
                "singleton-state",
                "any-type-usage",
                "n-plus-one-query",
                "duplicate-block",
                "inconsistent-style",
            ]
        );
        assert_eq!(reg.get("circular-import").unwrap().scope(), "graph");
    }

    #[test]
    fn test_duplicate_id_is_rejected() {
        let mut reg = Registry::builtin().unwrap();
        let before = reg.len();
        let err = reg.register(Rule::unit(Impostor)).unwrap_err();
        assert_eq!(err.id, "magic-number");
        assert_eq!(reg.len(), before);
    }

    #[test]
    fn test_retain_enabled_drops_disabled_and_rejects_unknown() {
        let mut reg = Registry::builtin().unwrap();
        let mut cfg = ScanConfig::default();
        cfg.rules.insert("any-type-usage".into(), false);
        reg.retain_enabled(&cfg).unwrap();
        assert!(reg.get("any-type-usage").is_none());
        assert!(reg.get("magic-number").is_some());

        cfg.rules.insert("no-such-rule".into(), true);
        let err = Registry::builtin().unwrap().retain_enabled(&cfg).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownRule(id) if id == "no-such-rule"));
    }
}
