//! CLI module for shapegen
//!
//! ## Commands
//!
//! - `generate <model>` - Generate a Go client module for a service
//! - `check <model>` - Load and validate a model
//! - `resolve <version>...` - Parse semantic versions and print them in ascending order
//!
//! ## Design
//!
//! The CLI uses clap for argument parsing with derive macros.
//! Command functions return `CliResult<T>` instead of calling `process::exit`.
//! Only the top-level `run()` function handles errors and exits.

// Enforce explicit error handling - no panicking in production code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod commands;

use std::fmt;
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

use crate::version::SHAPEGEN_VERSION;

// ============================================================================
// CLI Error handling
// ============================================================================

/// Exit code for CLI operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(pub i32);

impl ExitCode {
    pub const SUCCESS: ExitCode = ExitCode(0);
    pub const FAILURE: ExitCode = ExitCode(1);
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
    pub fn new(message: impl Into<String>, exit_code: ExitCode) -> Self {
        Self {
            message: message.into(),
            exit_code,
        }
    }

    /// Create a failure error (exit code 1).
    pub fn failure(message: impl Into<String>) -> Self {
        Self::new(message, ExitCode::FAILURE)
    }

    /// Render a diagnostic with miette's report handler.
    pub fn diagnostic<E>(err: E) -> Self
    where
        E: miette::Diagnostic + Send + Sync + 'static,
    {
        Self::failure(format!("{:?}", miette::Report::new(err)))
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

/// Generate Go client modules from shape models
#[derive(Parser, Debug)]
#[command(name = "shapegen")]
#[command(version = SHAPEGEN_VERSION)]
#[command(about = "Generate Go client modules from shape models", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate a Go client module for a service
    Generate {
        /// JSON shape model
        #[arg(value_name = "MODEL")]
        model: PathBuf,
        /// Go module path of the generated client (e.g. github.com/acme/weather)
        #[arg(long)]
        module: Option<String>,
        /// Service shape id (namespace#Name)
        #[arg(long)]
        service: Option<String>,
        /// Output directory
        #[arg(short, long, value_name = "DIR", default_value = "shapegen_output")]
        out: PathBuf,
        /// JSON settings file; flags override its values
        #[arg(long, value_name = "FILE")]
        settings: Option<PathBuf>,
        /// Minimum Go version written to go.mod (e.g. 1.18.0)
        #[arg(long, value_name = "VERSION")]
        go_version: Option<String>,
        /// Package name of the module root
        #[arg(long)]
        package_name: Option<String>,
    },

    /// Load and validate a model
    Check {
        /// JSON shape model
        #[arg(value_name = "MODEL")]
        model: PathBuf,
    },

    /// Parse semantic versions and print them in ascending order
    Resolve {
        /// Versions to sort (e.g. v1.2.0 1.10.0-rc.1)
        #[arg(value_name = "VERSION", required = true)]
        versions: Vec<String>,
    },
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

    match execute(cli) {
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

/// Execute the CLI command and return result.
fn execute(cli: Cli) -> CliResult<ExitCode> {
    match cli.command {
        Command::Generate {
            model,
            module,
            service,
            out,
            settings,
            go_version,
            package_name,
        } => commands::generate(&commands::GenerateOptions {
            model,
            module,
            service,
            out,
            settings,
            go_version,
            package_name,
        }),
        Command::Check { model } => commands::check(&model),
        Command::Resolve { versions } => commands::resolve(&versions),
    }
}

// ============================================================================
// Tests
// ============================================================================
