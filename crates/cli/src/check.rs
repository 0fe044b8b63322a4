//! `exelsior check`: compare files against a reference and write reports.

use std::fs;
use std::path::PathBuf;

use clap::Args;
use tracing::debug;

use exelsior_config::Settings;
use exelsior_engine::{run, ArtifactSink, FileStatus, RunError, RunOptions, RunSummary, KEY_COLUMN};
use exelsior_io::{load_path, LoadErrorKind};

use crate::exit_codes::{
    run_exit_code, EXIT_DUPLICATES_FOUND, EXIT_FILES_SKIPPED, EXIT_INVALID_CONFIG,
};
use crate::CliError;

#[derive(Args)]
pub struct CheckArgs {
    /// Reference file (source of truth, never modified)
    reference: PathBuf,

    /// Files to check against the reference
    #[arg(required = true)]
    comparisons: Vec<PathBuf>,

    /// Directory for generated spreadsheets (default: config output_dir, else .)
    #[arg(long, short = 'o')]
    out: Option<PathBuf>,

    /// Also write cleaned_<file>.xlsx with duplicate rows removed
    #[arg(long)]
    clean: bool,

    /// Do not write duplicates_in_<file>.xlsx per comparison file
    #[arg(long)]
    no_report_files: bool,

    /// File name of the combined report
    #[arg(long, value_name = "NAME", conflicts_with = "no_combined")]
    combined: Option<String>,

    /// Do not write the combined report
    #[arg(long)]
    no_combined: bool,

    /// Print the run summary as JSON to stdout
    #[arg(long)]
    json: bool,

    /// Exit 3 when any duplicate is found
    #[arg(long)]
    fail_on_duplicates: bool,

    /// Exit 5 when any comparison file had to be skipped
    #[arg(long)]
    strict: bool,

    /// Settings file (default: <config dir>/exelsior/config.toml if present)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Suppress the human summary on stderr
    #[arg(long, short = 'q')]
    quiet: bool,
}

/// Writes artifacts into a directory, creating it on first use.
struct DirSink {
    dir: PathBuf,
}

impl ArtifactSink for DirSink {
    fn put(&mut self, name: &str, bytes: Vec<u8>) -> Result<(), String> {
        fs::create_dir_all(&self.dir)
            .map_err(|e| format!("cannot create {}: {e}", self.dir.display()))?;
        let path = self.dir.join(name);
        debug!(path = %path.display(), bytes = bytes.len(), "writing artifact");
        fs::write(&path, bytes).map_err(|e| format!("{}: {e}", path.display()))
    }
}

fn run_options(args: &CheckArgs, settings: &Settings) -> RunOptions {
    let combined_report = if args.no_combined {
        None
    } else {
        args.combined
            .clone()
            .or_else(|| settings.combined_report_name().map(str::to_string))
    };
    RunOptions {
        clean: args.clean || settings.clean,
        per_file_reports: settings.per_file_reports && !args.no_report_files,
        combined_report,
    }
}

fn run_error(err: RunError) -> CliError {
    let code = run_exit_code(&err);
    let hint = match &err {
        RunError::ReferenceMissingColumn { .. } => {
            Some(format!("the reference file needs a '{KEY_COLUMN}' column (case-sensitive)"))
        }
        RunError::ReferenceLoad(e) if matches!(e.kind, LoadErrorKind::UnsupportedFormat(_)) => {
            Some("supported formats: .csv, .xlsx".to_string())
        }
        _ => None,
    };
    let cli_err = CliError::new(code, err.to_string());
    match hint {
        Some(h) => cli_err.with_hint(h),
        None => cli_err,
    }
}

pub fn cmd_check(args: CheckArgs) -> Result<(), CliError> {
    let settings = Settings::load(args.config.as_deref())
        .map_err(|e| CliError::new(EXIT_INVALID_CONFIG, e.to_string()))?;

    let options = run_options(&args, &settings);
    debug!(?options, "resolved run options");
    let out_dir = args.out.clone().unwrap_or_else(|| settings.output_dir.clone());
    let mut sink = DirSink { dir: out_dir.clone() };

    // Comparison files are loaded lazily, one at a time, as the run reaches them
    let comparisons = args.comparisons.iter().map(|p| load_path(p));
    let summary = run(load_path(&args.reference), comparisons, &options, &mut sink)
        .map_err(run_error)?;

    if args.json {
        let json = serde_json::to_string_pretty(&summary)
            .map_err(|e| CliError::general(format!("JSON serialization error: {e}")))?;
        println!("{json}");
    }

    if !args.quiet {
        print_summary(&summary, &out_dir);
    }

    let skipped = summary.skipped_files();
    if args.strict && skipped > 0 {
        return Err(CliError::new(
            EXIT_FILES_SKIPPED,
            format!("{skipped} comparison file(s) skipped (--strict)"),
        ));
    }
    if args.fail_on_duplicates && summary.has_duplicates() {
        return Err(CliError::new(
            EXIT_DUPLICATES_FOUND,
            format!("{} duplicate name(s) found (--fail-on-duplicates)", summary.total_duplicates),
        ));
    }

    Ok(())
}

/// Human summary to stderr.
fn print_summary(summary: &RunSummary, out_dir: &std::path::Path) {
    eprintln!(
        "reference {}: {} rows, {} distinct '{}' values",
        summary.meta.reference,
        summary.meta.reference_rows,
        summary.meta.reference_keys,
        summary.meta.key_column,
    );

    for file in &summary.files {
        match file.status {
            FileStatus::Duplicates => {
                eprintln!(
                    "  {}: {} duplicate name(s) in {} row(s): {}",
                    file.file,
                    file.duplicates.len(),
                    file.rows_matched,
                    file.duplicates.join(", "),
                );
                if let Some(removed) = file.rows_removed {
                    eprintln!("  {}: removed {} row(s)", file.file, removed);
                }
            }
            FileStatus::NoDuplicates => eprintln!("  {}: no duplicates", file.file),
            FileStatus::MissingColumn | FileStatus::LoadFailed => {}
        }
        for warning in &file.warnings {
            eprintln!("warning: {}", warning);
        }
        for artifact in &file.artifacts {
            eprintln!("wrote {}", out_dir.join(artifact).display());
        }
    }

    if let Some(ref combined) = summary.combined_report {
        eprintln!("wrote {}", out_dir.join(combined).display());
    }

    if summary.has_duplicates() {
        eprintln!("{} duplicate name(s) found", summary.total_duplicates);
    } else {
        eprintln!("no duplicates found in the comparison files");
    }
}
