//! Check framework.
//!
//! Provides the infrastructure for defining and running checks:
//! - `Check` trait, the capability every check type implements
//! - `CheckBase` with the fields and behaviour shared by all checks
//! - `CheckRegistry` mapping check-type identifiers to constructors

pub mod registry;
pub mod yaml;

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use serde::Deserialize;

pub use registry::{CheckFactory, CheckRegistry};

use crate::merge::{Merge, merge_option, merge_string};
use crate::result::{Breach, CheckResult};
use crate::types::{CheckType, Severity};

/// Error type for check wiring.
#[derive(Debug, thiserror::Error)]
pub enum CheckError {
    #[error("unknown check type '{0}'")]
    UnknownType(String),
    #[error("invalid '{check_type}' check definition: {source}")]
    InvalidDefinition {
        check_type: String,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("cannot merge '{found}' check into '{expected}' check")]
    MergeMismatch { expected: String, found: String },
}

/// Checks grouped by type, in definition order within a type.
pub type CheckMap = BTreeMap<CheckType, Vec<Box<dyn Check>>>;

/// A runnable check.
///
/// The orchestrator drives every check through the same steps:
/// `init`, then `fetch_data` / `has_data` / `unmarshal_data_map` when
/// `requires_data`, then `run_check`.
pub trait Check: Send + fmt::Debug {
    fn base(&self) -> &CheckBase;

    fn base_mut(&mut self) -> &mut CheckBase;

    fn name(&self) -> &str {
        &self.base().name
    }

    fn check_type(&self) -> &CheckType {
        &self.base().check_type
    }

    fn severity(&self) -> Severity {
        self.base().severity()
    }

    fn result(&self) -> &CheckResult {
        &self.base().result
    }

    /// Reset the data and result for a new run.
    fn init(&mut self, check_type: &CheckType) {
        self.base_mut().init(check_type);
    }

    fn requires_data(&self) -> bool {
        true
    }

    /// Load raw documents into the data map.
    fn fetch_data(&mut self, _project_dir: &Path) {}

    /// Whether any document was loaded; records a breach when not and
    /// `fail_check` is set.
    fn has_data(&mut self, fail_check: bool) -> bool {
        self.base_mut().has_data(fail_check)
    }

    /// Parse the raw documents.
    fn unmarshal_data_map(&mut self) {}

    fn run_check(&mut self);

    /// Layer another definition of the same concrete type onto this one.
    fn merge(&mut self, other: &dyn Check) -> Result<(), CheckError>;

    fn as_any(&self) -> &dyn Any;
}

/// Fields shared by every check.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CheckBase {
    pub name: String,
    #[serde(default)]
    pub severity: Option<Severity>,
    #[serde(skip)]
    check_type: CheckType,
    /// Raw documents keyed by data key (e.g. file name).
    #[serde(skip)]
    pub data_map: BTreeMap<String, Vec<u8>>,
    #[serde(skip)]
    pub result: CheckResult,
}

impl CheckBase {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_data(mut self, key: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        self.data_map.insert(key.into(), data.into());
        self
    }

    pub fn severity(&self) -> Severity {
        self.severity.unwrap_or_default()
    }

    pub fn check_type(&self) -> &CheckType {
        &self.check_type
    }

    /// Set the type and start from an empty, passing result with no data.
    pub fn init(&mut self, check_type: &CheckType) {
        self.check_type = check_type.clone();
        self.data_map.clear();
        self.result = CheckResult::new(self.name.clone(), check_type.clone(), self.severity());
    }

    pub fn add_pass(&mut self, msg: impl Into<String>) {
        self.result.add_pass(msg);
    }

    /// Stamp the check's common fields on the breach and record it.
    pub fn add_breach(&mut self, mut breach: Breach) {
        breach.set_common_values(&self.check_type, &self.name, self.severity());
        self.result.add_breach(breach);
    }

    pub fn has_data(&mut self, fail_check: bool) -> bool {
        if !self.data_map.is_empty() {
            return true;
        }
        if fail_check && !self.result.has_failures() {
            self.add_breach(Breach::value("", "no data available"));
        }
        false
    }
}

impl Merge for CheckBase {
    type Error = CheckError;

    fn merge(&mut self, other: &Self) -> Result<(), CheckError> {
        merge_string(&mut self.name, &other.name);
        merge_option(&mut self.severity, &other.severity);
        Ok(())
    }
}

/// Downcast `other` to the concrete check type of `this`.
pub(crate) fn downcast_same<'a, T: Check + 'static>(
    this: &T,
    other: &'a dyn Check,
) -> Result<&'a T, CheckError> {
    other
        .as_any()
        .downcast_ref::<T>()
        .ok_or_else(|| CheckError::MergeMismatch {
            expected: this.check_type().to_string(),
            found: other.check_type().to_string(),
        })
}
