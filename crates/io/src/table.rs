// In-memory tabular data: named columns, rows of typed cells.

use serde::Serialize;

/// A single cell value as it came out of the source file.
///
/// CSV fields are always `Text` (or `Blank` when empty); spreadsheet cells keep
/// their stored type.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Blank,
    Text(String),
    Number(f64),
    Bool(bool),
    /// Spreadsheet date or time, as its Excel serial number.
    Date(f64),
}

impl Cell {
    pub fn text(s: impl Into<String>) -> Self {
        Cell::Text(s.into())
    }

    /// Blank cells and empty strings both count as blank.
    pub fn is_blank(&self) -> bool {
        match self {
            Cell::Blank => true,
            Cell::Text(s) => s.is_empty(),
            Cell::Number(_) | Cell::Bool(_) | Cell::Date(_) => false,
        }
    }

    /// Display-safe string form of the value.
    ///
    /// Integral numbers render without decimals so that `42` read from a
    /// spreadsheet and `"42"` read from a CSV look the same. Dates render as
    /// their serial number.
    pub fn display(&self) -> String {
        match self {
            Cell::Blank => String::new(),
            Cell::Text(s) => s.clone(),
            Cell::Number(n) | Cell::Date(n) => format_number(*n),
            Cell::Bool(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
        }
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        if s.is_empty() {
            Cell::Blank
        } else {
            Cell::Text(s.to_string())
        }
    }
}

impl From<f64> for Cell {
    fn from(n: f64) -> Self {
        Cell::Number(n)
    }
}

/// Turn a raw header row into unique column names.
///
/// Blank names become `Unnamed: <index>`; repeats get a `.1`, `.2`, ... suffix.
pub(crate) fn header_names<I>(raw: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut names: Vec<String> = Vec::new();
    for (idx, name) in raw.into_iter().enumerate() {
        let base = if name.trim().is_empty() { format!("Unnamed: {idx}") } else { name };
        let mut candidate = base.clone();
        let mut n = 1;
        while names.contains(&candidate) {
            candidate = format!("{base}.{n}");
            n += 1;
        }
        names.push(candidate);
    }
    names
}

pub(crate) fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

/// Ordered rows under a fixed header.
///
/// Every row holds exactly `columns().len()` cells.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Self { columns, rows: Vec::new() }
    }

    /// Append a row. Short rows are padded with blanks; cells past the last
    /// column are dropped.
    pub fn push_row(&mut self, mut row: Vec<Cell>) {
        row.resize(self.columns.len(), Cell::Blank);
        self.rows.push(row);
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cells of one column in row order, or `None` if the column is absent.
    pub fn column(&self, name: &str) -> Option<impl Iterator<Item = &Cell> + '_> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(move |row| &row[idx]))
    }

    /// New table with the same header and only the rows `keep` accepts.
    pub fn filter_rows<F>(&self, mut keep: F) -> Table
    where
        F: FnMut(&[Cell]) -> bool,
    {
        Table {
            columns: self.columns.clone(),
            rows: self.rows.iter().filter(|r| keep(r.as_slice())).cloned().collect(),
        }
    }
}

/// How a file was read, for diagnostics.
#[derive(Debug, Clone, Default, Serialize)]
pub struct LoadReport {
    /// Field delimiter actually used (CSV only).
    pub delimiter: Option<char>,
    /// True when the semicolon pass was abandoned for a comma pass.
    pub delimiter_retried: bool,
    /// Data rows dropped because they had more fields than the header.
    pub rows_skipped: usize,
    /// Sheet that was read (spreadsheets only).
    pub sheet: Option<String>,
}

/// A loaded table labelled with the file it came from.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub name: String,
    pub table: Table,
    pub report: LoadReport,
}
