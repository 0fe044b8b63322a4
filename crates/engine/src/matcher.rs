use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use exelsior_io::Table;

use crate::error::EngineError;
use crate::keys::{missing_column, normalize_key, KeySet};

/// Keys of a comparison table that also appear in the reference set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Duplicates {
    /// Distinct matching keys, in order of first occurrence.
    pub matches: Vec<String>,
    /// 0-based data-row indices carrying each matching key.
    pub positions: BTreeMap<String, Vec<usize>>,
}

impl Duplicates {
    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    pub fn len(&self) -> usize {
        self.matches.len()
    }

    /// Number of rows whose key matched (counting repeats).
    pub fn matched_rows(&self) -> usize {
        self.positions.values().map(Vec::len).sum()
    }
}

/// Intersect the normalized keys of `table` with `reference`.
pub fn find_duplicates(
    table: &Table,
    column: &str,
    reference: &KeySet,
) -> Result<Duplicates, EngineError> {
    let cells = table.column(column).ok_or_else(|| missing_column(column))?;

    let mut out = Duplicates::default();
    for (row, cell) in cells.enumerate() {
        let Some(key) = normalize_key(cell) else {
            continue;
        };
        if !reference.contains(&key) {
            continue;
        }
        match out.positions.entry(key) {
            Entry::Vacant(slot) => {
                out.matches.push(slot.key().clone());
                slot.insert(vec![row]);
            }
            Entry::Occupied(mut slot) => slot.get_mut().push(row),
        }
    }

    Ok(out)
}
