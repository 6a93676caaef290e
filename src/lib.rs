//! # Shipshape
//!
//! Validates the configuration files of a project against expected values.
//!
//! Checks are declared in one or more YAML checks files. Each `yaml` check
//! reads project files, resolves path expressions such as
//! `notification.emails[0]` or `*.permissions` in them, and records a breach
//! for every value that is missing, different from what is expected, or on a
//! disallowed list.
//!
//! ## Example
//!
//! ```rust,no_run
//! use shipshape::formatter::{OutputFormat, format_results};
//! use std::path::PathBuf;
//!
//! # fn main() -> shipshape::Result<()> {
//! let run = shipshape::run(&[PathBuf::from("shipshape.yml")], None)?;
//! print!("{}", format_results(&run.results, OutputFormat::Table));
//! # Ok(())
//! # }
//! ```

pub mod checks;
pub mod cli;
pub mod config;
pub mod error;
pub mod formatter;
pub mod merge;
pub mod result;
pub mod runner;
pub mod types;

use std::path::{Path, PathBuf};

// Re-export commonly used types and functions
pub use checks::{Check, CheckBase, CheckError, CheckRegistry};
pub use config::{Config, ConfigError, load_config};
pub use error::{Result, ShipshapeError};
pub use result::{Breach, CheckResult, ResultList, Status};
pub use runner::run_checks;
pub use types::{CheckType, Severity};

/// The current version of shipshape
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Outcome of a full run.
#[derive(Debug)]
pub struct Run {
    pub results: ResultList,
    /// Fail severity from the layered checks files
    pub fail_severity: Severity,
}

impl Run {
    /// Whether a failed check reaches the fail severity.
    pub fn should_fail(&self) -> bool {
        self.results.should_fail(self.fail_severity)
    }
}

/// Load the checks files, run every check with the built-in check types and
/// collect the results. `project_dir` overrides the one from the checks files.
pub fn run(checks_files: &[PathBuf], project_dir: Option<&Path>) -> Result<Run> {
    run_with_registry(&CheckRegistry::with_defaults(), checks_files, project_dir)
}

/// Like [`run`], with a caller-provided registry of check types.
pub fn run_with_registry(
    registry: &CheckRegistry,
    checks_files: &[PathBuf],
    project_dir: Option<&Path>,
) -> Result<Run> {
    let mut config = load_config(checks_files, registry)?;
    if let Some(dir) = project_dir {
        config.project_dir = dir.to_string_lossy().into_owned();
    }
    log::info!(
        "Loaded {} checks for {}",
        config.check_count(),
        config.project_dir().display()
    );

    let results = run_checks(&mut config);
    Ok(Run {
        results,
        fail_severity: config.fail_severity,
    })
}
