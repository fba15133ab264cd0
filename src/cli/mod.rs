//! CLI module for testmynb
//!
//! This module provides the command-line interface of the test runner.
//!
//! ## Usage
//!
//! - `testmynb` - run every `test_*.ipynb` under the working directory
//! - `testmynb <path>...` - run the given notebooks, searching given directories
//!
//! ## Modules
//!
//! - `discovery` - Finding test notebooks on disk
//!
//! ## Design
//!
//! The CLI uses clap for argument parsing with derive macros. Flags fall back to `TESTMYNB_*` environment variables.
//! Command functions return `CliResult<T>` instead of calling `process::exit`.
//! Only the top-level `run()` function handles errors and exits.

// Enforce explicit error handling - no panicking in production code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod discovery;

use std::fmt;
use std::path::PathBuf;
use std::process;

use clap::Parser;

use crate::config::{AdvisoryMode, ColorChoice, RunConfig};
use crate::handler::TestHandler;
use crate::interp::{CellExecutor, Interpreter};
use crate::notebook::{HmacNotary, Notebook};
use crate::report::{ConsoleReporter, ReportHeader, ReportOptions, Reporter};
use crate::version::TESTMYNB_VERSION;

// ============================================================================
// CLI Error handling
// ============================================================================

/// Exit code for CLI operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(pub i32);

impl ExitCode {
    /// Every test cell passed.
    pub const SUCCESS: ExitCode = ExitCode(0);
    /// At least one test cell failed or errored.
    pub const FAILURE: ExitCode = ExitCode(1);
    /// Nothing ran: bad arguments, missing paths or unreadable notebooks.
    pub const USAGE: ExitCode = ExitCode(2);
}

/// Error type for CLI operations.
///
/// Contains a user-facing message and an exit code. The CLI entry point
/// catches these errors, prints the message, and exits with the code.
#[derive(Debug)]
pub struct CliError {
    /// User-facing error message (already formatted for display)
    pub message: String,
    /// Exit code to return to the shell
    pub exit_code: ExitCode,
}

impl CliError {
    /// Create a new CLI error with a message and exit code.
    pub fn new(message: impl Into<String>, exit_code: ExitCode) -> Self {
        Self {
            message: message.into(),
            exit_code,
        }
    }

    /// Create a usage error (exit code 2).
    pub fn usage(message: impl Into<String>) -> Self {
        Self::new(message, ExitCode::USAGE)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

// ============================================================================
// Clap CLI definition
// ============================================================================

/// Run the `%%testcell` cells of Jupyter notebooks as tests
#[derive(Parser, Debug)]
#[command(name = "testmynb")]
#[command(version = TESTMYNB_VERSION)]
#[command(about = "Run the %%testcell cells of Jupyter notebooks as tests", long_about = None)]
pub struct Cli {
    /// Notebook files, or directories to search for test_*.ipynb (default: working directory)
    #[arg(value_name = "PATH")]
    pub paths: Vec<PathBuf>,

    /// When to colour the report
    #[arg(long, value_enum, default_value_t = ColorChoice::Auto, env = "TESTMYNB_COLOR")]
    pub color: ColorChoice,

    /// Report width in columns (default: terminal width)
    #[arg(long, value_name = "N", env = "TESTMYNB_WIDTH")]
    pub width: Option<usize>,

    /// Where to send missing-name and missing-assert warnings
    #[arg(long, value_enum, default_value_t = AdvisoryMode::Log, env = "TESTMYNB_ADVISORIES")]
    pub advisories: AdvisoryMode,

    /// Print only the final tally
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    /// Run configuration described by the parsed flags.
    pub fn config(&self) -> RunConfig {
        let config = RunConfig::new()
            .with_paths(self.paths.clone())
            .with_color(self.color)
            .with_advisories(self.advisories)
            .with_quiet(self.quiet);
        match self.width {
            Some(width) => config.with_width(width),
            None => config,
        }
    }
}

// ============================================================================
// CLI entry point
// ============================================================================

/// Main CLI entry point.
///
/// This is the only place where `process::exit` is called. All command
/// implementations return `CliResult` and errors are handled here.
pub fn run() {
    let cli = Cli::parse();

    match execute(&cli.config()) {
        Ok(exit_code) => {
            if exit_code.0 != 0 {
                process::exit(exit_code.0);
            }
        }
        Err(e) => {
            if !e.message.is_empty() {
                eprintln!("{}", e.message);
            }
            process::exit(e.exit_code.0);
        }
    }
}

/// Discover, load and run notebooks, then print the report.
///
/// ## Errors
/// A usage error when a path does not exist or a notebook cannot be loaded; nothing runs in that case.
pub fn execute(config: &RunConfig) -> CliResult<ExitCode> {
    let paths = discovery::find_notebooks(&config.paths).map_err(|e| CliError::usage(format!("Error: {e}")))?;
    tracing::debug!(notebooks = paths.len(), "loading notebooks");

    let notary = HmacNotary::from_environment();
    let notebooks = paths
        .iter()
        .map(|path| Notebook::open(path, &notary))
        .collect::<Result<Vec<Notebook>, _>>()
        .map_err(|e| CliError::usage(format!("{:?}", miette::Report::new(e))))?;

    let mut interpreter = Interpreter::new();
    let mut handler = TestHandler::new(notebooks).with_advisories(config.advisories);
    let summary = handler.run(&mut interpreter);

    let header = ReportHeader::detect(interpreter.dialect());
    let color = config.use_color(console::colors_enabled());
    let mut reporter = match config.width {
        Some(width) => ConsoleReporter::new(
            std::io::stdout(),
            header,
            ReportOptions {
                width,
                color,
                quiet: config.quiet,
            },
        ),
        None => ConsoleReporter::stdout(header, color, config.quiet),
    };
    reporter
        .report(&summary)
        .map_err(|e| CliError::usage(format!("Error writing report: {e}")))?;

    Ok(if summary.success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_defaults() {
        let cli = Cli::try_parse_from(["testmynb"]).unwrap();
        assert!(cli.paths.is_empty());
        assert_eq!(cli.color, ColorChoice::Auto);
        assert_eq!(cli.advisories, AdvisoryMode::Log);
        assert!(!cli.quiet);
    }

    #[test]
    fn test_cli_parse_paths_and_flags() {
        let cli = Cli::try_parse_from([
            "testmynb",
            "notebooks",
            "test_extra.ipynb",
            "--color",
            "never",
            "--width",
            "100",
            "--advisories",
            "report",
            "-q",
        ])
        .unwrap();
        let config = cli.config();
        assert_eq!(config.paths, vec![PathBuf::from("notebooks"), PathBuf::from("test_extra.ipynb")]);
        assert_eq!(config.color, ColorChoice::Never);
        assert_eq!(config.width, Some(100));
        assert_eq!(config.advisories, AdvisoryMode::Report);
        assert!(config.quiet);
    }

    #[test]
    fn test_cli_rejects_unknown_color() {
        assert!(Cli::try_parse_from(["testmynb", "--color", "sometimes"]).is_err());
    }

    #[test]
    fn test_missing_path_is_a_usage_error() {
        let config = RunConfig::new().with_paths(vec![PathBuf::from("/nonexistent/testmynb/notebooks")]);
        let err = execute(&config).unwrap_err();
        assert_eq!(err.exit_code, ExitCode::USAGE);
        assert!(err.message.contains("does not exist"));
    }
}
