// Property-based tests for key extraction, matching and cleaning.
// CI: 256 cases (default). Soak: PROPTEST_CASES=10000 cargo test --release

use std::collections::HashSet;

use exelsior_engine::{extract_keys, find_duplicates, normalize_key, remove_matches, KEY_COLUMN};
use exelsior_io::{Cell, Table};
use proptest::prelude::*;

fn config() -> ProptestConfig {
    ProptestConfig {
        cases: std::env::var("PROPTEST_CASES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(256),
        failure_persistence: None,
        ..ProptestConfig::default()
    }
}

// ---------------------------------------------------------------------------
// Generators
// ---------------------------------------------------------------------------

/// Key cell drawn from a small alphabet so that tables overlap often.
fn arb_key() -> impl Strategy<Value = Cell> {
    prop_oneof![
        4 => r" {0,2}[A-Da-d]{1,2} {0,2}".prop_map(Cell::Text),
        1 => (0u8..5).prop_map(|n| Cell::Number(n as f64)),
        1 => Just(Cell::Blank),
        1 => Just(Cell::text("   ")),
    ]
}

fn arb_table() -> impl Strategy<Value = Table> {
    prop::collection::vec(arb_key(), 0..40).prop_map(|keys| {
        let mut t = Table::new(vec!["Id".to_string(), KEY_COLUMN.to_string()]);
        for (i, key) in keys.into_iter().enumerate() {
            t.push_row(vec![Cell::Number(i as f64), key]);
        }
        t
    })
}

fn normalized(table: &Table) -> HashSet<String> {
    table.column(KEY_COLUMN).unwrap().filter_map(normalize_key).collect()
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(config())]

    #[test]
    fn matches_are_the_ordered_intersection(reference in arb_table(), comparison in arb_table()) {
        let keys = extract_keys(&reference, KEY_COLUMN).unwrap();
        let dups = find_duplicates(&comparison, KEY_COLUMN, &keys).unwrap();

        let ref_set = normalized(&reference);
        let mut seen = HashSet::new();
        let mut expected = Vec::new();
        for cell in comparison.column(KEY_COLUMN).unwrap() {
            if let Some(k) = normalize_key(cell) {
                if ref_set.contains(&k) && seen.insert(k.clone()) {
                    expected.push(k);
                }
            }
        }
        prop_assert_eq!(&dups.matches, &expected);
    }

    #[test]
    fn extraction_ignores_row_order(table in arb_table(), seed in any::<u64>()) {
        let mut rows: Vec<Vec<Cell>> = table.rows().to_vec();
        // Deterministic shuffle from the seed
        let mut state = seed | 1;
        for i in (1..rows.len()).rev() {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            rows.swap(i, (state % (i as u64 + 1)) as usize);
        }
        let mut shuffled = Table::new(table.columns().to_vec());
        for row in rows {
            shuffled.push_row(row);
        }

        prop_assert_eq!(
            extract_keys(&table, KEY_COLUMN).unwrap(),
            extract_keys(&shuffled, KEY_COLUMN).unwrap()
        );
    }

    #[test]
    fn cleaned_table_has_no_matched_keys(reference in arb_table(), comparison in arb_table()) {
        let keys = extract_keys(&reference, KEY_COLUMN).unwrap();
        let dups = find_duplicates(&comparison, KEY_COLUMN, &keys).unwrap();
        let cleaned = remove_matches(&comparison, KEY_COLUMN, &dups.matches).unwrap();

        let left = extract_keys(&cleaned.table, KEY_COLUMN).unwrap();
        for m in &dups.matches {
            prop_assert!(!left.contains(m));
        }
    }

    #[test]
    fn row_count_law(reference in arb_table(), comparison in arb_table()) {
        let keys = extract_keys(&reference, KEY_COLUMN).unwrap();
        let dups = find_duplicates(&comparison, KEY_COLUMN, &keys).unwrap();
        let cleaned = remove_matches(&comparison, KEY_COLUMN, &dups.matches).unwrap();

        prop_assert_eq!(cleaned.table.len() + dups.matched_rows(), comparison.len());
        prop_assert_eq!(cleaned.removed, dups.matched_rows());
        prop_assert_eq!(cleaned.table.columns(), comparison.columns());
    }
}
