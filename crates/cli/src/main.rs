// Exelsior CLI - find names in comparison files that already exist in a reference file

mod check;
mod exit_codes;
mod inspect;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use exit_codes::{EXIT_ERROR, EXIT_SUCCESS};

#[derive(Parser)]
#[command(name = "exelsior")]
#[command(about = "Duplicate checker for CSV and Excel files, keyed on the 'Name' column")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Report comparison rows whose Name already appears in the reference file
    #[command(after_help = "\
Files may be .csv (semicolon- or comma-separated) or .xlsx (first sheet).
Matching trims surrounding whitespace and is case-sensitive.

Examples:
  exelsior check members.xlsx signups.csv
  exelsior check members.xlsx jan.csv feb.xlsx --out results/
  exelsior check members.xlsx signups.csv --clean
  exelsior check members.csv signups.csv --json --no-report-files
  exelsior check members.csv a.csv b.csv --strict --fail-on-duplicates")]
    Check(check::CheckArgs),

    /// Load a single file and show how it was read
    #[command(after_help = "\
Examples:
  exelsior inspect signups.csv
  exelsior inspect members.xlsx --json")]
    Inspect {
        /// File to load (.csv or .xlsx)
        file: PathBuf,

        /// Output JSON to stdout instead of a human summary
        #[arg(long)]
        json: bool,
    },
}

/// Logs go to stderr. `RUST_LOG` controls the level (default: errors only).
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("error"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> ExitCode {
    init_logging();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Check(args) => check::cmd_check(args),
        Commands::Inspect { file, json } => inspect::cmd_inspect(file, json),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn new(code: u8, msg: impl Into<String>) -> Self {
        Self { code, message: msg.into(), hint: None }
    }

    pub fn general(msg: impl Into<String>) -> Self {
        Self::new(EXIT_ERROR, msg)
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}
