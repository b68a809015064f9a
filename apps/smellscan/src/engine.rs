//! Scanner engine: applies registered rules to loaded units.
//!
//! Unit-scoped rules run per unit on a fixed-size `rayon` pool; each unit
//! writes into its own buffer and the buffers are merged by the report sort,
//! so thread scheduling never changes the output. Graph-scoped rules run
//! afterwards, serially, over the whole unit set.
//!
//! A rule that returns an error, panics or exceeds `ruleTimeoutMs` is
//! recorded as a `RuleExecutionError` and the scan carries on.

use crate::config::ScanConfig;
use crate::error::{RuleErrorCause, RuleExecutionError, RuleFault, ScanError};
use crate::models::{Finding, ScanReport, ScanStatus, SourceUnit};
use crate::registry::Registry;
use crate::rules::{GraphRule, Rule, UnitRule};
use crate::watchdog::{self, Outcome};
use rayon::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Rule-error unit id used for graph-scoped rules.
pub const ALL_UNITS: &str = "*";

#[derive(Debug, Clone, Default)]
/// External cancellation signal. Checked before each unit starts.
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        CancelToken::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug)]
pub struct ScanOutcome {
    pub report: ScanReport,
    /// Sorted by unit, then rule.
    pub rule_errors: Vec<RuleExecutionError>,
}

/// Fixed-size worker pool shared by loading and scanning.
pub fn worker_pool(jobs: usize) -> Result<rayon::ThreadPool, ScanError> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(jobs.max(1))
        .thread_name(|i| format!("smellscan-worker-{}", i))
        .build()
        .map_err(|e| ScanError::Pool(e.to_string()))
}

/// Run every rule in `registry` over `units`.
pub fn scan(
    units: &[Arc<SourceUnit>],
    registry: &Registry,
    config: &ScanConfig,
    cancel: &CancelToken,
) -> Result<ScanOutcome, ScanError> {
    let shared = Arc::new(config.clone());
    let unit_rules: Vec<Arc<dyn UnitRule>> = registry
        .all()
        .iter()
        .filter_map(|r| match r {
            Rule::Unit(u) => Some(Arc::clone(u)),
            Rule::Graph(_) => None,
        })
        .collect();
    let graph_rules: Vec<Arc<dyn GraphRule>> = registry
        .all()
        .iter()
        .filter_map(|r| match r {
            Rule::Graph(g) => Some(Arc::clone(g)),
            Rule::Unit(_) => None,
        })
        .collect();

    let pool = worker_pool(config.jobs)?;
    let per_unit: Vec<Option<(Vec<Finding>, Vec<RuleExecutionError>)>> = pool.install(|| {
        units
            .par_iter()
            .map(|unit| {
                if cancel.is_cancelled() {
                    return None;
                }
                Some(scan_unit(unit, &unit_rules, &shared))
            })
            .collect()
    });

    let scanned = per_unit.iter().filter(|r| r.is_some()).count();
    let mut findings = Vec::new();
    let mut rule_errors = Vec::new();
    for (mut f, mut e) in per_unit.into_iter().flatten() {
        findings.append(&mut f);
        rule_errors.append(&mut e);
    }

    let status = if cancel.is_cancelled() {
        tracing::info!(scanned, total = units.len(), "scan cancelled; skipping graph rules");
        ScanStatus::Cancelled
    } else {
        for rule in &graph_rules {
            match run_graph_rule(rule, units, &shared) {
                Ok(mut f) => findings.append(&mut f),
                Err(e) => rule_errors.push(e),
            }
        }
        ScanStatus::Complete
    };

    for e in &rule_errors {
        tracing::warn!(rule = %e.rule, unit = %e.unit, cause = %e.cause, "rule execution error");
    }
    rule_errors.sort_by(|a, b| a.unit.cmp(&b.unit).then(a.rule.cmp(&b.rule)));

    let report = ScanReport::new(findings, scanned, status);
    tracing::info!(
        units = scanned,
        findings = report.findings().len(),
        rule_errors = rule_errors.len(),
        "scan finished"
    );
    Ok(ScanOutcome {
        report,
        rule_errors,
    })
}

fn scan_unit(
    unit: &Arc<SourceUnit>,
    rules: &[Arc<dyn UnitRule>],
    config: &Arc<ScanConfig>,
) -> (Vec<Finding>, Vec<RuleExecutionError>) {
    let mut findings = Vec::new();
    let mut errors = Vec::new();
    for rule in rules {
        let id = rule.meta().id;
        let (r, u, c) = (Arc::clone(rule), Arc::clone(unit), Arc::clone(config));
        let outcome = watchdog::run_with_timeout(config.rule_timeout_ms, move || r.check(&u, &c));
        match settle(outcome, config.rule_timeout_ms) {
            Ok(mut f) => {
                tracing::debug!(rule = id, unit = %unit.id, findings = f.len(), "rule done");
                findings.append(&mut f);
            }
            Err(cause) => errors.push(RuleExecutionError {
                rule: id.to_string(),
                unit: unit.id.clone(),
                cause,
            }),
        }
    }
    (findings, errors)
}

fn run_graph_rule(
    rule: &Arc<dyn GraphRule>,
    units: &[Arc<SourceUnit>],
    config: &Arc<ScanConfig>,
) -> Result<Vec<Finding>, RuleExecutionError> {
    let id = rule.meta().id;
    let (r, all, c) = (Arc::clone(rule), units.to_vec(), Arc::clone(config));
    let outcome = watchdog::run_with_timeout(config.rule_timeout_ms, move || r.check(&all, &c));
    settle(outcome, config.rule_timeout_ms).map_err(|cause| RuleExecutionError {
        rule: id.to_string(),
        unit: ALL_UNITS.to_string(),
        cause,
    })
}

fn settle(
    outcome: Outcome<Result<Vec<Finding>, RuleFault>>,
    timeout_ms: u64,
) -> Result<Vec<Finding>, RuleErrorCause> {
    match outcome {
        Outcome::Done(Ok(f)) => Ok(f),
        Outcome::Done(Err(fault)) => Err(RuleErrorCause::Fault(fault.0)),
        Outcome::Panicked(msg) => Err(RuleErrorCause::Panicked(msg)),
        Outcome::TimedOut => Err(RuleErrorCause::Timeout(timeout_ms)),
    }
}
