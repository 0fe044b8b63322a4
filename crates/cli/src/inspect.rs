//! `exelsior inspect`: describe how one file is read.

use std::path::PathBuf;

use serde::Serialize;

use exelsior_engine::{extract_keys, KEY_COLUMN};
use exelsior_io::{load_path, LoadReport};

use crate::exit_codes::EXIT_INPUT_FAILED;
use crate::CliError;

#[derive(Debug, Serialize)]
struct Inspection<'a> {
    file: &'a str,
    columns: &'a [String],
    rows: usize,
    #[serde(flatten)]
    load: &'a LoadReport,
    has_key_column: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    distinct_keys: Option<usize>,
}

pub fn cmd_inspect(file: PathBuf, json: bool) -> Result<(), CliError> {
    let dataset = load_path(&file).map_err(|e| CliError::new(EXIT_INPUT_FAILED, e.to_string()))?;

    let distinct_keys = extract_keys(&dataset.table, KEY_COLUMN).ok().map(|k| k.len());
    let inspection = Inspection {
        file: &dataset.name,
        columns: dataset.table.columns(),
        rows: dataset.table.len(),
        load: &dataset.report,
        has_key_column: distinct_keys.is_some(),
        distinct_keys,
    };

    if json {
        let out = serde_json::to_string_pretty(&inspection)
            .map_err(|e| CliError::general(format!("JSON serialization error: {e}")))?;
        println!("{out}");
        return Ok(());
    }

    println!("file:      {}", inspection.file);
    println!("columns:   {}", inspection.columns.join(", "));
    println!("rows:      {}", inspection.rows);
    if let Some(delim) = inspection.load.delimiter {
        let note = if inspection.load.delimiter_retried { " (after semicolon retry)" } else { "" };
        println!("delimiter: '{}'{}", delim, note);
        println!("skipped:   {} row(s)", inspection.load.rows_skipped);
    }
    if let Some(ref sheet) = inspection.load.sheet {
        println!("sheet:     {}", sheet);
    }
    match inspection.distinct_keys {
        Some(n) => println!("{}:      {} distinct value(s)", KEY_COLUMN, n),
        None => println!("{}:      column not found", KEY_COLUMN),
    }

    Ok(())
}
