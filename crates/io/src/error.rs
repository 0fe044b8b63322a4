use std::fmt;

/// Why a file could not be turned into a table. Always names the file.
#[derive(Debug, Clone)]
pub struct LoadError {
    pub file: String,
    pub kind: LoadErrorKind,
}

#[derive(Debug, Clone)]
pub enum LoadErrorKind {
    /// File could not be read.
    Io(String),
    /// Extension is neither `.csv` nor `.xlsx`.
    UnsupportedFormat(String),
    /// No header row to take column names from.
    Empty,
    /// Delimited text could not be parsed with any delimiter.
    Csv(String),
    /// Spreadsheet container could not be opened or read.
    Workbook(String),
    /// Spreadsheet has no worksheets.
    NoSheets,
}

impl LoadError {
    pub fn new(file: impl Into<String>, kind: LoadErrorKind) -> Self {
        Self { file: file.into(), kind }
    }
}

impl fmt::Display for LoadErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(msg) => write!(f, "IO error: {msg}"),
            Self::UnsupportedFormat(ext) if ext.is_empty() => {
                write!(f, "unsupported file type (no extension; expected .csv or .xlsx)")
            }
            Self::UnsupportedFormat(ext) => {
                write!(f, "unsupported file type '.{ext}' (expected .csv or .xlsx)")
            }
            Self::Empty => write!(f, "no header row found"),
            Self::Csv(msg) => write!(f, "CSV parse error: {msg}"),
            Self::Workbook(msg) => write!(f, "Excel read error: {msg}"),
            Self::NoSheets => write!(f, "Excel file contains no sheets"),
        }
    }
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "error loading file {}: {}", self.file, self.kind)
    }
}

impl std::error::Error for LoadError {}

/// Failure to serialize a table as a spreadsheet.
#[derive(Debug, Clone)]
pub enum ExportError {
    TooManyRows { rows: usize },
    TooManyColumns { columns: usize },
    Xlsx(String),
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooManyRows { rows } => {
                write!(f, "{rows} rows exceed the Excel sheet limit")
            }
            Self::TooManyColumns { columns } => {
                write!(f, "{columns} columns exceed the Excel sheet limit")
            }
            Self::Xlsx(msg) => write!(f, "Excel write error: {msg}"),
        }
    }
}

impl std::error::Error for ExportError {}
