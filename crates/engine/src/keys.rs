use std::collections::BTreeSet;

use exelsior_io::{Cell, Table};

use crate::error::EngineError;

/// Trim-and-stringify a key cell. Blank and whitespace-only values have no key.
///
/// Case is preserved: `"alice"` and `"Alice"` are different keys.
pub fn normalize_key(cell: &Cell) -> Option<String> {
    if cell.is_blank() {
        return None;
    }
    let text = cell.display();
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Distinct normalized keys of one table. Read-only once built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeySet {
    keys: BTreeSet<String>,
}

impl KeySet {
    pub fn contains(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Keys in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.keys.iter().map(String::as_str)
    }
}

impl FromIterator<String> for KeySet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self { keys: iter.into_iter().collect() }
    }
}

pub(crate) fn missing_column(column: &str) -> EngineError {
    EngineError::MissingColumn { column: column.to_string() }
}

/// Collect the normalized, deduplicated values of `column`.
pub fn extract_keys(table: &Table, column: &str) -> Result<KeySet, EngineError> {
    let cells = table.column(column).ok_or_else(|| missing_column(column))?;
    Ok(cells.filter_map(normalize_key).collect())
}
