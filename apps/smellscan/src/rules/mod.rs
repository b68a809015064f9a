//! Rule interfaces and the built-in rule set.
//!
//! Rules come in two shapes:
//! - [`UnitRule`]: one `SourceUnit` in, findings out. Run in parallel.
//! - [`GraphRule`]: the whole unit collection in, findings out. Run serially
//!   after unit-scoped work.
//!
//! Both are pure: no clock, randomness or I/O, and no mutation of their
//! inputs. A rule reports its own failures as `Err(RuleFault)`.

pub mod any_type;
pub mod circular_import;
pub mod console_log;
pub mod duplicate_block;
pub mod error_handling;
pub mod god_object;
pub mod inconsistent_style;
pub mod magic_number;
pub mod n_plus_one;
pub mod singleton;

use crate::config::ScanConfig;
use crate::error::RuleFault;
use crate::models::{Finding, Severity, SourceUnit};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
/// Static description of a rule.
pub struct RuleMeta {
    pub id: &'static str,
    pub description: &'static str,
    pub severity: Severity,
}

pub trait UnitRule: Send + Sync {
    fn meta(&self) -> &RuleMeta;
    fn check(&self, unit: &SourceUnit, config: &ScanConfig) -> Result<Vec<Finding>, RuleFault>;
}

pub trait GraphRule: Send + Sync {
    fn meta(&self) -> &RuleMeta;
    fn check(
        &self,
        units: &[Arc<SourceUnit>],
        config: &ScanConfig,
    ) -> Result<Vec<Finding>, RuleFault>;
}

#[derive(Clone)]
/// A registered rule of either shape.
pub enum Rule {
    Unit(Arc<dyn UnitRule>),
    Graph(Arc<dyn GraphRule>),
}

impl Rule {
    pub fn unit(rule: impl UnitRule + 'static) -> Self {
        Rule::Unit(Arc::new(rule))
    }

    pub fn graph(rule: impl GraphRule + 'static) -> Self {
        Rule::Graph(Arc::new(rule))
    }

    pub fn meta(&self) -> &RuleMeta {
        match self {
            Rule::Unit(r) => r.meta(),
            Rule::Graph(r) => r.meta(),
        }
    }

    pub fn id(&self) -> &'static str {
        self.meta().id
    }

    pub fn scope(&self) -> &'static str {
        match self {
            Rule::Unit(_) => "unit",
            Rule::Graph(_) => "graph",
        }
    }
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule")
            .field("id", &self.id())
            .field("scope", &self.scope())
            .finish()
    }
}

/// Built-in rules in registration order.
pub fn builtin() -> Vec<Rule> {
    vec![
        Rule::unit(console_log::NoConsoleLog),
        Rule::unit(magic_number::MagicNumber),
        Rule::unit(error_handling::MissingErrorHandling),
        Rule::unit(god_object::GodObjectSize),
        Rule::graph(circular_import::CircularImport),
        Rule::unit(singleton::SingletonState),
        Rule::unit(any_type::AnyTypeUsage),
        Rule::unit(n_plus_one::NPlusOneQuery),
        Rule::unit(duplicate_block::DuplicateBlock),
        Rule::unit(inconsistent_style::InconsistentStyle),
    ]
}
