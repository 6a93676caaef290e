//! Crate-level error type.

use thiserror::Error;

use crate::config::ConfigError;

/// Errors that can surface from a shipshape run.
///
/// Failures inside a check never end the run: they are recorded as breaches
/// on the check's result.
#[derive(Debug, Error)]
pub enum ShipshapeError {
    /// Loading or layering the checks files failed
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Result type alias using ShipshapeError
pub type Result<T> = std::result::Result<T, ShipshapeError>;
