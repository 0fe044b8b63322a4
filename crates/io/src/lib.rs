//! `exelsior-io`: loading tabular files and writing spreadsheets.
//!
//! Loading never touches caller state: bytes in, [`Table`] out.

pub mod csv;
pub mod error;
pub mod table;
pub mod xlsx;

use std::path::Path;

use tracing::debug;

pub use error::{ExportError, LoadError, LoadErrorKind};
pub use table::{Cell, Dataset, LoadReport, Table};
pub use xlsx::serialize_as_spreadsheet;

/// Container format, derived from the file name's extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Csv,
    Xlsx,
}

impl SourceFormat {
    /// `.csv` or `.xlsx`, case-insensitive. Anything else is unsupported.
    pub fn from_filename(filename: &str) -> Result<Self, LoadErrorKind> {
        let ext = Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "csv" => Ok(Self::Csv),
            "xlsx" => Ok(Self::Xlsx),
            _ => Err(LoadErrorKind::UnsupportedFormat(ext)),
        }
    }
}

/// Parse `bytes` as `format`. `filename` only labels errors.
pub fn load(bytes: &[u8], format: SourceFormat, filename: &str) -> Result<Table, LoadError> {
    load_with_report(bytes, format, filename).map(|(table, _)| table)
}

/// Like [`load`], also returning how the file was read.
pub fn load_with_report(
    bytes: &[u8],
    format: SourceFormat,
    filename: &str,
) -> Result<(Table, LoadReport), LoadError> {
    let result = match format {
        SourceFormat::Csv => crate::csv::parse(&crate::csv::decode(bytes)),
        SourceFormat::Xlsx => xlsx::import_bytes(bytes),
    };
    let (table, report) = result.map_err(|kind| LoadError::new(filename, kind))?;
    debug!(
        file = filename,
        columns = table.columns().len(),
        rows = table.len(),
        skipped = report.rows_skipped,
        "loaded table"
    );
    Ok((table, report))
}

/// Read a file from disk and load it, labelled with its file name.
/// The file handle is released before parsing starts.
pub fn load_path(path: &Path) -> Result<Dataset, LoadError> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let format = SourceFormat::from_filename(&name).map_err(|kind| LoadError::new(&name, kind))?;
    let bytes = std::fs::read(path)
        .map_err(|e| LoadError::new(&name, LoadErrorKind::Io(e.to_string())))?;

    let (table, report) = load_with_report(&bytes, format, &name)?;
    Ok(Dataset { name, table, report })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn format_from_extension() {
        assert_eq!(SourceFormat::from_filename("a.csv").unwrap(), SourceFormat::Csv);
        assert_eq!(SourceFormat::from_filename("B.XLSX").unwrap(), SourceFormat::Xlsx);
        assert!(matches!(
            SourceFormat::from_filename("notes.txt"),
            Err(LoadErrorKind::UnsupportedFormat(ext)) if ext == "txt"
        ));
        assert!(SourceFormat::from_filename("README").is_err());
    }

    #[test]
    fn load_error_names_the_file() {
        let err = load(b"", SourceFormat::Csv, "empty.csv").unwrap_err();
        assert_eq!(err.file, "empty.csv");
        assert!(err.to_string().contains("empty.csv"));
    }

    #[test]
    fn load_path_csv() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("people.csv");
        fs::write(&path, "Name,Age\nAlice,30\n").unwrap();

        let ds = load_path(&path).unwrap();
        assert_eq!(ds.name, "people.csv");
        assert_eq!(ds.table.len(), 1);
        assert_eq!(ds.report.delimiter, Some(','));
    }

    #[test]
    fn load_path_xlsx() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("people.xlsx");
        let mut t = Table::new(vec!["Name".into()]);
        t.push_row(vec![Cell::text("Alice")]);
        fs::write(&path, serialize_as_spreadsheet(&t).unwrap()).unwrap();

        let ds = load_path(&path).unwrap();
        assert_eq!(ds.table, t);
        assert_eq!(ds.report.sheet.as_deref(), Some("Sheet1"));
    }

    #[test]
    fn load_path_missing_file() {
        let dir = tempdir().unwrap();
        let err = load_path(&dir.path().join("nope.csv")).unwrap_err();
        assert_eq!(err.file, "nope.csv");
        assert!(matches!(err.kind, LoadErrorKind::Io(_)));
    }

    #[test]
    fn load_path_unsupported_extension() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data.json");
        fs::write(&path, "{}").unwrap();
        let err = load_path(&path).unwrap_err();
        assert!(matches!(err.kind, LoadErrorKind::UnsupportedFormat(_)));
    }
}
