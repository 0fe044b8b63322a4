// CSV import: semicolon-separated first, comma-separated as a fallback.

use tracing::debug;

use crate::error::LoadErrorKind;
use crate::table::{format_number, header_names, Cell, LoadReport, Table};

/// Delimiter tried first. Most files this tool sees come from European Excel
/// exports, which separate fields with semicolons.
pub const PRIMARY_DELIMITER: u8 = b';';

/// Delimiter tried when the semicolon pass fails or finds only one column.
pub const FALLBACK_DELIMITER: u8 = b',';

/// Decode raw bytes to UTF-8, stripping a BOM.
/// Invalid UTF-8 falls back to Windows-1252 (common for Excel-exported CSVs).
pub fn decode(bytes: &[u8]) -> String {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => {
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
            decoded.into_owned()
        }
    }
}

/// Parse delimited text into a table.
///
/// The semicolon pass wins whenever it yields more than one column. Otherwise
/// the text is re-read from the start with commas, and the comma result is
/// used if it yields more than one column or the semicolon pass failed.
pub fn parse(content: &str) -> Result<(Table, LoadReport), LoadErrorKind> {
    let primary = parse_with_delimiter(content, PRIMARY_DELIMITER);
    if matches!(&primary, Ok((table, _)) if table.columns().len() > 1) {
        return primary;
    }

    let fallback = parse_with_delimiter(content, FALLBACK_DELIMITER);
    match (primary, fallback) {
        (Ok(_), Ok((table, report))) if table.columns().len() > 1 => {
            debug!(columns = table.columns().len(), "semicolon pass found one column, using comma");
            Ok((table, retried(report)))
        }
        (Ok(first), _) => Ok(first),
        (Err(e), Ok((table, report))) => {
            debug!(error = %e, "semicolon pass failed, using comma");
            Ok((table, retried(report)))
        }
        (Err(e), Err(_)) => Err(e),
    }
}

fn retried(mut report: LoadReport) -> LoadReport {
    report.delimiter_retried = true;
    report
}

/// Single pass with a fixed delimiter. Rows with more fields than the header
/// are skipped; short rows are padded with blanks.
pub fn parse_with_delimiter(
    content: &str,
    delimiter: u8,
) -> Result<(Table, LoadReport), LoadErrorKind> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut records = reader.records();
    let header = match records.next() {
        Some(result) => result.map_err(|e| LoadErrorKind::Csv(e.to_string()))?,
        None => return Err(LoadErrorKind::Empty),
    };

    let mut table = Table::new(header_names(header.iter().map(str::to_string)));
    let width = table.columns().len();
    let mut report = LoadReport {
        delimiter: Some(delimiter as char),
        ..LoadReport::default()
    };

    for result in records {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                debug!(error = %e, "skipping unreadable row");
                report.rows_skipped += 1;
                continue;
            }
        };

        if record.len() > width {
            debug!(
                line = record.position().map(|p| p.line()),
                expected = width,
                found = record.len(),
                "skipping row with too many fields"
            );
            report.rows_skipped += 1;
            continue;
        }

        table.push_row(record.iter().map(field_cell).collect());
    }

    Ok((table, report))
}

/// A field is a number only when it is exactly the canonical text of a finite
/// number (`42`, `-3.5`), so its display form, and any key built from it, is
/// unchanged. `007`, `1e3` and ` 42` stay text.
fn field_cell(field: &str) -> Cell {
    match field.parse::<f64>() {
        Ok(n) if n.is_finite() && format_number(n) == field => Cell::Number(n),
        _ => Cell::from(field),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(table: &Table) -> Vec<String> {
        table.column("Name").unwrap().map(|c| c.display()).collect()
    }

    #[test]
    fn test_semicolon_csv_import() {
        let (table, report) = parse("Name;Age;City\nAlice;30;Paris\nBob;25;London\n").unwrap();
        assert_eq!(table.columns(), ["Name", "Age", "City"]);
        assert_eq!(names(&table), vec!["Alice", "Bob"]);
        assert_eq!(table.rows()[0][1], Cell::Number(30.0));
        assert_eq!(report.delimiter, Some(';'));
        assert!(!report.delimiter_retried);
    }

    #[test]
    fn test_comma_file_retried_with_comma() {
        let content = "Name,Age\nAlice,30\nBob,25\nCarol,41\n";
        let (table, report) = parse(content).unwrap();
        assert_eq!(table.columns(), ["Name", "Age"]);
        assert_eq!(table.len(), 3);
        assert_eq!(report.delimiter, Some(','));
        assert!(report.delimiter_retried);
    }

    #[test]
    fn test_comma_file_with_semicolons_in_values() {
        // Under ';' the header is one column and the data row splits in two,
        // so the row would be dropped. The comma pass must win.
        let content = "Name,Note\nAlice,\"a;b\"\nBob,plain\n";
        let (table, report) = parse(content).unwrap();
        assert_eq!(table.columns(), ["Name", "Note"]);
        assert_eq!(table.rows()[0][1], Cell::text("a;b"));
        assert_eq!(report.rows_skipped, 0);
    }

    #[test]
    fn test_single_column_keeps_semicolon_pass() {
        let (table, report) = parse("Name\nAlice\nBob\n").unwrap();
        assert_eq!(table.columns(), ["Name"]);
        assert_eq!(table.len(), 2);
        assert_eq!(report.delimiter, Some(';'));
        assert!(!report.delimiter_retried);
    }

    #[test]
    fn test_long_rows_skipped_short_rows_padded() {
        let content = "Name;Age\nAlice;30\nBob;25;extra;fields\nCarol\n";
        let (table, report) = parse(content).unwrap();
        assert_eq!(names(&table), vec!["Alice", "Carol"]);
        assert_eq!(table.rows()[1][1], Cell::Blank);
        assert_eq!(report.rows_skipped, 1);
    }

    #[test]
    fn test_only_canonical_numbers_are_numeric() {
        let (table, _) = parse("Name;Value
A;42
B;-3.5
C;007
D;1e3
E; 42
F;NaN
G;0.10
").unwrap();
        let values: Vec<&Cell> = table.column("Value").unwrap().collect();
        assert_eq!(values[0], &Cell::Number(42.0));
        assert_eq!(values[1], &Cell::Number(-3.5));
        for (cell, text) in values[2..].iter().zip(["007", "1e3", " 42", "NaN", "0.10"]) {
            assert_eq!(*cell, &Cell::text(text));
            assert_eq!(cell.display(), text);
        }
    }

    #[test]
    fn test_empty_fields_are_blank() {
        let (table, _) = parse("Name;Age\n;30\n").unwrap();
        assert_eq!(table.rows()[0][0], Cell::Blank);
    }

    #[test]
    fn test_empty_input_is_error() {
        assert!(matches!(parse(""), Err(LoadErrorKind::Empty)));
    }

    #[test]
    fn test_header_only_gives_empty_table() {
        let (table, _) = parse("Name;Age\n").unwrap();
        assert_eq!(table.columns().len(), 2);
        assert!(table.is_empty());
    }

    #[test]
    fn test_quoted_semicolon_values() {
        let content = "Name;Address\n\"Doe; Jane\";\"1 Main St, Apt 4\"\n";
        let (table, _) = parse(content).unwrap();
        assert_eq!(names(&table), vec!["Doe; Jane"]);
        assert_eq!(table.rows()[0][1], Cell::text("1 Main St, Apt 4"));
    }

    #[test]
    fn test_decode_strips_bom() {
        assert_eq!(decode(b"\xEF\xBB\xBFName;Age"), "Name;Age");
    }

    #[test]
    fn test_decode_windows_1252_fallback() {
        // 0xE9 is 'é' in Windows-1252 and invalid as a lone UTF-8 byte
        assert_eq!(decode(b"Ren\xE9"), "René");
    }
}
