//! Error taxonomy.
//!
//! `LoadError` and `RuleExecutionError` are recovered locally and surface as
//! diagnostics. `ConfigError` and `DuplicateRuleError` are fatal and abort
//! before any unit is scanned; the CLI maps them to exit code 2 through
//! `ScanError`.

use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("failed to load {}: {cause}", path.display())]
pub struct LoadError {
    pub path: PathBuf,
    pub cause: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "lowercase")]
pub enum RuleErrorCause {
    #[error("{0}")]
    Fault(String),
    #[error("panicked: {0}")]
    Panicked(String),
    #[error("timed out after {0}ms")]
    Timeout(u64),
}

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("rule '{rule}' failed on {unit}: {cause}")]
pub struct RuleExecutionError {
    pub rule: String,
    /// Unit id, or `*` for graph-scoped rules.
    pub unit: String,
    pub cause: RuleErrorCause,
}

/// Error value returned by a rule implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct RuleFault(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("rule '{id}' is already registered")]
pub struct DuplicateRuleError {
    pub id: String,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },
    #[error("invalid value for '{key}': {message}")]
    Invalid { key: &'static str, message: String },
    #[error("unknown rule '{0}' in [rules]")]
    UnknownRule(String),
}

/// Run-level failure. Anything here aborts the run before findings exist.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("scan root {} does not exist or is not a directory", .0.display())]
    Root(PathBuf),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Registry(#[from] DuplicateRuleError),
    #[error("failed to build worker pool: {0}")]
    Pool(String),
}
