//! `exelsior-engine`: duplicate detection between a reference table and
//! comparison tables.
//!
//! Pure functions over pre-loaded tables. File access stays with the caller;
//! generated spreadsheets are handed to an [`ArtifactSink`].

pub mod clean;
pub mod error;
pub mod keys;
pub mod matcher;
pub mod report;
pub mod run;

pub use clean::{remove_matches, Cleaned};
pub use error::{EngineError, RunError};
pub use keys::{extract_keys, normalize_key, KeySet};
pub use matcher::{find_duplicates, Duplicates};
pub use report::DuplicateReport;
pub use run::{run, ArtifactSink, FileOutcome, FileStatus, MemorySink, RunOptions, RunSummary};

/// Column holding the comparison key. Case-sensitive and not configurable.
pub const KEY_COLUMN: &str = "Name";
