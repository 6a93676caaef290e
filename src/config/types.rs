use std::collections::BTreeMap;

use serde::Deserialize;
use serde_yaml::Value;

use crate::checks::CheckMap;
use crate::types::{CheckType, Severity};

/// Default checks file name
pub const DEFAULT_CHECKS_FILE: &str = "shipshape.yml";

/// One checks file, as written on disk.
///
/// Check definitions stay raw until the registry builds them.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ConfigFile {
    #[serde(default)]
    pub project_dir: Option<String>,
    #[serde(default)]
    pub fail_severity: Option<Severity>,
    #[serde(default)]
    pub checks: BTreeMap<CheckType, Vec<Value>>,
}

/// Layered configuration of a run
#[derive(Debug)]
pub struct Config {
    /// Directory the checks read their data from
    pub project_dir: String,
    /// Lowest severity of a failed check that fails the run
    pub fail_severity: Severity,
    pub checks: CheckMap,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            project_dir: String::new(),
            fail_severity: Severity::High,
            checks: CheckMap::new(),
        }
    }
}
