use std::fmt;

use exelsior_io::{ExportError, LoadError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// The key column is not in the table's header.
    MissingColumn { column: String },
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingColumn { column } => write!(f, "'{column}' column not found"),
        }
    }
}

impl std::error::Error for EngineError {}

/// Errors that abort a whole run. Per-file problems on comparison tables are
/// recorded in the run summary instead.
#[derive(Debug)]
pub enum RunError {
    /// The reference file could not be loaded.
    ReferenceLoad(LoadError),
    /// The reference table has no key column.
    ReferenceMissingColumn { file: String, column: String },
    /// A generated spreadsheet could not be serialized.
    Export { artifact: String, source: ExportError },
    /// The sink rejected a generated spreadsheet.
    Sink { artifact: String, message: String },
}

impl fmt::Display for RunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReferenceLoad(e) => write!(f, "reference file: {e}"),
            Self::ReferenceMissingColumn { file, column } => {
                write!(f, "'{column}' column not found in the reference file {file}")
            }
            Self::Export { artifact, source } => write!(f, "cannot build {artifact}: {source}"),
            Self::Sink { artifact, message } => write!(f, "cannot write {artifact}: {message}"),
        }
    }
}

impl std::error::Error for RunError {}
