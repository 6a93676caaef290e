pub mod types;

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info};
use thiserror::Error;

pub use types::{Config, ConfigFile, DEFAULT_CHECKS_FILE};

use crate::checks::{CheckError, CheckRegistry};

/// Errors raised while loading checks files
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no checks file provided")]
    NoConfigFiles,

    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error(transparent)]
    Check(#[from] CheckError),
}

/// Parse the contents of one checks file
pub fn parse_config_file(contents: &str) -> Result<ConfigFile, serde_yaml::Error> {
    if contents.trim().is_empty() {
        return Ok(ConfigFile::default());
    }
    serde_yaml::from_str(contents)
}

/// Read and parse one checks file from disk
pub fn read_config_file(path: &Path) -> Result<ConfigFile, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config_file(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Load and layer the checks files in order; later files override earlier ones
pub fn load_config(paths: &[PathBuf], registry: &CheckRegistry) -> Result<Config, ConfigError> {
    if paths.is_empty() {
        return Err(ConfigError::NoConfigFiles);
    }

    let mut config = Config::default();
    for path in paths {
        info!("Loading checks file {}", path.display());
        let file = read_config_file(path)?;
        config.apply(file, registry)?;
    }
    Ok(config)
}

impl Config {
    /// Layer a checks file over this config.
    ///
    /// Definitions matching an existing check by type and name are merged into
    /// it; others are appended after the checks of their type.
    pub fn apply(&mut self, file: ConfigFile, registry: &CheckRegistry) -> Result<(), ConfigError> {
        if let Some(project_dir) = file.project_dir
            && !project_dir.is_empty()
        {
            self.project_dir = project_dir;
        }
        if let Some(fail_severity) = file.fail_severity {
            self.fail_severity = fail_severity;
        }

        for (check_type, definitions) in file.checks {
            for definition in definitions {
                let check = registry.create(&check_type, definition)?;
                let checks = self.checks.entry(check_type.clone()).or_default();
                match checks.iter_mut().find(|c| c.name() == check.name()) {
                    Some(existing) => {
                        debug!("Merging '{}' check '{}'", check_type, check.name());
                        existing.merge(check.as_ref())?;
                    }
                    None => {
                        debug!("Adding '{}' check '{}'", check_type, check.name());
                        checks.push(check);
                    }
                }
            }
        }
        Ok(())
    }

    /// Project directory, defaulting to the current directory
    pub fn project_dir(&self) -> &Path {
        if self.project_dir.is_empty() {
            Path::new(".")
        } else {
            Path::new(&self.project_dir)
        }
    }

    /// Total number of checks across types
    pub fn check_count(&self) -> usize {
        self.checks.values().map(Vec::len).sum()
    }
}
