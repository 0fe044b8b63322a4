use std::collections::HashSet;

use exelsior_io::Table;

use crate::error::EngineError;
use crate::keys::{missing_column, normalize_key};

/// A comparison table with matched rows removed.
#[derive(Debug, Clone)]
pub struct Cleaned {
    pub table: Table,
    /// `original.len() - table.len()`
    pub removed: usize,
}

/// Copy `table` without the rows whose normalized key is in `matched`.
/// Rows with a blank key are kept. The input is left untouched.
pub fn remove_matches(
    table: &Table,
    column: &str,
    matched: &[String],
) -> Result<Cleaned, EngineError> {
    let idx = table.column_index(column).ok_or_else(|| missing_column(column))?;
    let matched: HashSet<&str> = matched.iter().map(String::as_str).collect();

    let cleaned = table.filter_rows(|row| match normalize_key(&row[idx]) {
        Some(key) => !matched.contains(key.as_str()),
        None => true,
    });
    let removed = table.len() - cleaned.len();

    Ok(Cleaned { table: cleaned, removed })
}
