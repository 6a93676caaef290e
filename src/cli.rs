use clap::Parser;
use std::path::PathBuf;

use crate::config::DEFAULT_CHECKS_FILE;
use crate::formatter::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "shipshape")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Check project configuration files against expected values")]
#[command(long_about = "Runs the checks defined in one or more checks files against the configuration files of a project and reports every value that does not match what is expected.")]
pub struct Cli {
    /// Directory of the project to check (overrides project-dir from the checks file)
    #[arg(value_name = "PROJECT_DIR")]
    pub project_dir: Option<PathBuf>,

    /// Checks file; repeat to layer several files, later ones override earlier ones
    #[arg(short = 'f', long = "checks-file", value_name = "FILE", default_value = DEFAULT_CHECKS_FILE)]
    pub checks_file: Vec<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, env = "SHIPSHAPE_OUTPUT_FORMAT", default_value = "table")]
    pub output: OutputFormat,

    /// Exit with status 2 when a failed check reaches the configured fail-severity
    #[arg(long)]
    pub exit_code: bool,

    /// Enable verbose logging (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all logging
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    /// Initialize logging based on verbosity level
    pub fn init_logging(&self) {
        if self.quiet {
            return;
        }

        let level = match self.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        };

        env_logger::Builder::from_default_env()
            .filter_level(level)
            .init();
    }
}
