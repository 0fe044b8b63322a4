//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract; scripts rely on them.
//!
//! | Code | Description                                                  |
//! |------|--------------------------------------------------------------|
//! | 0    | Success (duplicates may have been found and reported)        |
//! | 1    | General error (unspecified)                                  |
//! | 2    | CLI usage error (bad args), emitted by clap                  |
//! | 3    | Duplicates found (only with `--fail-on-duplicates`)          |
//! | 4    | Input file failed to load or lacks the key column            |
//! | 5    | Comparison file(s) skipped (only with `--strict`)            |
//! | 6    | Invalid config file                                          |
//! | 7    | Cannot write an output spreadsheet                           |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into the relevant command's error handling

use exelsior_engine::RunError;

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Duplicates found and `--fail-on-duplicates` was given.
pub const EXIT_DUPLICATES_FOUND: u8 = 3;

/// The reference file could not be loaded or has no `Name` column.
/// Also used by `inspect` when its file cannot be loaded.
pub const EXIT_INPUT_FAILED: u8 = 4;

/// At least one comparison file was skipped and `--strict` was given.
pub const EXIT_FILES_SKIPPED: u8 = 5;

/// Config file missing (when given explicitly), unreadable or invalid.
pub const EXIT_INVALID_CONFIG: u8 = 6;

/// An output spreadsheet could not be built or written.
pub const EXIT_WRITE_FAILED: u8 = 7;

/// Map a fatal run error to its exit code.
pub fn run_exit_code(err: &RunError) -> u8 {
    match err {
        RunError::ReferenceLoad(_) | RunError::ReferenceMissingColumn { .. } => EXIT_INPUT_FAILED,
        RunError::Export { .. } | RunError::Sink { .. } => EXIT_WRITE_FAILED,
    }
}
