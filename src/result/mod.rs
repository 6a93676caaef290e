//! Check results and the run-level result list.
//!
//! A `CheckResult` starts as `Pass` and flips to `Fail` on the first recorded
//! breach. Passes and failures accumulate independently of the status.

pub mod breach;

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

pub use breach::{Breach, BreachType, KeyValueBreach, KeyValuesBreach, ValueBreach};

use crate::types::{CheckType, Severity};

/// Outcome of a check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum Status {
    #[default]
    Pass,
    Fail,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pass => "Pass",
            Self::Fail => "Fail",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Result of running a single check.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct CheckResult {
    /// Name of the check.
    pub name: String,
    /// Type of the check that produced this result.
    pub check_type: CheckType,
    /// Severity of the check.
    pub severity: Severity,
    pub status: Status,
    /// Messages for sub-checks that passed, in evaluation order.
    pub passes: Vec<String>,
    /// Messages for sub-checks that failed, in evaluation order.
    pub failures: Vec<String>,
    /// Structured breaches behind `failures`.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub breaches: Vec<Breach>,
    /// Corrective actions applied while running the check.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub remediations: Vec<String>,
}

impl CheckResult {
    /// Create a new passing result with no messages.
    pub fn new(name: impl Into<String>, check_type: CheckType, severity: Severity) -> Self {
        Self {
            name: name.into(),
            check_type,
            severity,
            ..Default::default()
        }
    }

    /// Record a passing sub-check.
    pub fn add_pass(&mut self, msg: impl Into<String>) {
        self.passes.push(msg.into());
    }

    /// Record a breach; the result is failed from here on.
    pub fn add_breach(&mut self, breach: Breach) {
        self.status = Status::Fail;
        self.failures.push(breach.to_string());
        self.breaches.push(breach);
    }

    pub fn add_remediation(&mut self, msg: impl Into<String>) {
        self.remediations.push(msg.into());
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}

/// All results of one run, in check definition order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ResultList {
    pub results: Vec<CheckResult>,
    pub total_checks: usize,
    pub total_breaches: usize,
    pub total_remediations: usize,
    pub remediation_performed: bool,
}

impl ResultList {
    pub fn new(remediation_performed: bool) -> Self {
        Self {
            remediation_performed,
            ..Default::default()
        }
    }

    /// Append a finished result and update the run counters.
    pub fn add_result(&mut self, result: CheckResult) {
        self.total_checks += 1;
        self.total_breaches += result.failures.len();
        self.total_remediations += result.remediations.len();
        self.results.push(result);
    }

    /// `Fail` if any result failed.
    pub fn status(&self) -> Status {
        if self.results.iter().any(|r| r.status == Status::Fail) {
            Status::Fail
        } else {
            Status::Pass
        }
    }

    /// Whether a failed result reaches the given severity.
    pub fn should_fail(&self, threshold: Severity) -> bool {
        self.results
            .iter()
            .any(|r| r.status == Status::Fail && r.severity >= threshold)
    }

    /// All breaches across results, in result order.
    pub fn breaches(&self) -> impl Iterator<Item = &Breach> {
        self.results.iter().flat_map(|r| r.breaches.iter())
    }

    /// Number of breaches per severity.
    pub fn breaches_by_severity(&self) -> BTreeMap<Severity, usize> {
        let mut counts = BTreeMap::new();
        for breach in self.breaches() {
            *counts.entry(breach.severity()).or_insert(0) += 1;
        }
        counts
    }
}
