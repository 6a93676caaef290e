//! Output formatters for check results.
//!
//! Provides various output formats for a run's results:
//! - Table - aligned NAME / STATUS / PASSES / FAILS columns (default)
//! - Simple - human-readable summary of breaches and remediations
//! - JSON - machine-readable dump of the result list
//! - JUnit - JUnit XML, one suite per check type
//! - Lagoon facts - JSON facts, one per breach

pub mod json;
pub mod junit;
pub mod lagoon;
pub mod simple;
pub mod table;

use clap::ValueEnum;

use crate::result::ResultList;

/// Printed when a run produced no result at all.
pub const NO_RESULT: &str =
    "No result available; ensure your shipshape.yml is configured correctly.\n";

/// Output format for results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Aligned table (default)
    #[default]
    Table,
    /// Human-readable summary
    Simple,
    /// JSON dump of the result list
    Json,
    /// JUnit XML
    #[value(name = "junit")]
    JUnit,
    /// Lagoon facts JSON
    LagoonFacts,
}

/// Format results according to the specified format.
pub fn format_results(results: &ResultList, format: OutputFormat) -> String {
    match format {
        OutputFormat::Table => table::format(results),
        OutputFormat::Simple => simple::format(results),
        OutputFormat::Json => json::format(results),
        OutputFormat::JUnit => junit::format(results),
        OutputFormat::LagoonFacts => lagoon::format(results),
    }
}

/// Escape XML special characters.
pub(crate) fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
