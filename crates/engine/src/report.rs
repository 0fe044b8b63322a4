// Duplicate reports and the file names generated artifacts are stored under.

use std::path::Path;

use exelsior_io::{Cell, Table};

use crate::matcher::Duplicates;

pub const DUPLICATE_NAME_COLUMN: &str = "Duplicate Name";
pub const SOURCE_FILE_COLUMN: &str = "Source File";

/// Default name of the report covering every comparison file.
pub const COMBINED_REPORT_NAME: &str = "duplicate_names_result.xlsx";

/// Duplicates found in one comparison file, paired with that file's name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateReport {
    pub source: String,
    pub entries: Vec<String>,
}

impl DuplicateReport {
    pub fn new(source: impl Into<String>, duplicates: &Duplicates) -> Self {
        Self {
            source: source.into(),
            entries: duplicates.matches.clone(),
        }
    }

    /// (key value, source file) pairs in report order.
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(move |e| (e.as_str(), self.source.as_str()))
    }

    /// Two-column table: `Duplicate Name`, `Source File`.
    pub fn to_table(&self) -> Table {
        Self::combine(std::iter::once(self))
    }

    /// Concatenate several reports into one table, in the order given.
    pub fn combine<'a, I>(reports: I) -> Table
    where
        I: IntoIterator<Item = &'a DuplicateReport>,
    {
        let mut table = Table::new(vec![
            DUPLICATE_NAME_COLUMN.to_string(),
            SOURCE_FILE_COLUMN.to_string(),
        ]);
        for report in reports {
            for (name, source) in report.pairs() {
                table.push_row(vec![Cell::text(name), Cell::text(source)]);
            }
        }
        table
    }
}

fn file_stem(source: &str) -> String {
    Path::new(source)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| source.to_string())
}

/// `duplicates_in_<stem>.xlsx`
pub fn report_file_name(source: &str) -> String {
    format!("duplicates_in_{}.xlsx", file_stem(source))
}

/// `cleaned_<stem>.xlsx`
pub fn cleaned_file_name(source: &str) -> String {
    format!("cleaned_{}.xlsx", file_stem(source))
}
