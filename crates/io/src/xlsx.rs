// Excel import (first sheet via calamine) and export (rust_xlsxwriter).

use std::io::Cursor;

use calamine::{Data, Reader, Xlsx};
use rust_xlsxwriter::{Format, Workbook};
use tracing::debug;

use crate::error::{ExportError, LoadErrorKind};
use crate::table::{header_names, Cell, LoadReport, Table};

/// Excel sheet limits.
pub const MAX_ROWS: usize = 1_048_576;
pub const MAX_COLS: usize = 16_384;
/// Longest string Excel stores in a single cell.
pub const MAX_CELL_CHARS: usize = 32_767;

/// Read the first worksheet of an xlsx container. The first row of the used
/// range supplies the column names.
pub fn import_bytes(bytes: &[u8]) -> Result<(Table, LoadReport), LoadErrorKind> {
    let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes))
        .map_err(|e| LoadErrorKind::Workbook(format!("Failed to open Excel file: {e}")))?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or(LoadErrorKind::NoSheets)?;

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| LoadErrorKind::Workbook(format!("Failed to read sheet '{sheet_name}': {e}")))?;

    let mut rows = range.rows();
    let header = rows.next().ok_or(LoadErrorKind::Empty)?;
    let mut table = Table::new(header_names(header.iter().map(|d| cell_from_data(d).display())));

    for row in rows {
        table.push_row(row.iter().map(cell_from_data).collect());
    }

    debug!(sheet = %sheet_name, rows = table.len(), "read Excel sheet");

    let report = LoadReport {
        sheet: Some(sheet_name),
        ..LoadReport::default()
    };
    Ok((table, report))
}

fn cell_from_data(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Blank,
        Data::String(s) => Cell::from(s.as_str()),
        Data::Float(n) => Cell::Number(*n),
        Data::Int(n) => Cell::Number(*n as f64),
        Data::Bool(b) => Cell::Bool(*b),
        Data::Error(e) => Cell::Text(e.to_string()),
        // Serial numbers assume the 1900 date system. Durations stay plain numbers.
        Data::DateTime(dt) if dt.is_duration() => Cell::Number(dt.as_f64()),
        Data::DateTime(dt) => Cell::Date(dt.as_f64()),
        Data::DateTimeIso(s) => Cell::from(s.as_str()),
        Data::DurationIso(s) => Cell::from(s.as_str()),
    }
}

/// Serialize a table as an xlsx byte stream: one sheet, header row first,
/// no row-index column.
///
/// Values Excel cannot store natively are written as their display string
/// instead of failing the export: non-finite numbers become text and text
/// longer than the cell limit is truncated.
pub fn serialize_as_spreadsheet(table: &Table) -> Result<Vec<u8>, ExportError> {
    if table.len() + 1 > MAX_ROWS {
        return Err(ExportError::TooManyRows { rows: table.len() });
    }
    if table.columns().len() > MAX_COLS {
        return Err(ExportError::TooManyColumns { columns: table.columns().len() });
    }

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    let xlsx_err = |e: rust_xlsxwriter::XlsxError| ExportError::Xlsx(e.to_string());

    for (col, name) in table.columns().iter().enumerate() {
        worksheet
            .write_string(0, col as u16, clamp_text(name))
            .map_err(xlsx_err)?;
    }

    let date_format = Format::new().set_num_format("yyyy-mm-dd");
    let datetime_format = Format::new().set_num_format("yyyy-mm-dd hh:mm:ss");
    let time_format = Format::new().set_num_format("hh:mm:ss");

    let mut degraded = 0usize;
    for (row_idx, row) in table.rows().iter().enumerate() {
        // rust_xlsxwriter uses 0-based row/col as u32/u16
        let r = (row_idx + 1) as u32;
        for (col, cell) in row.iter().enumerate() {
            let c = col as u16;
            match cell {
                Cell::Blank => {}
                Cell::Number(n) if n.is_finite() => {
                    worksheet.write_number(r, c, *n).map_err(xlsx_err)?;
                }
                Cell::Bool(b) => {
                    worksheet.write_boolean(r, c, *b).map_err(xlsx_err)?;
                }
                Cell::Date(serial) if serial.is_finite() && *serial >= 0.0 => {
                    let format = if *serial < 1.0 {
                        &time_format
                    } else if serial.fract() == 0.0 {
                        &date_format
                    } else {
                        &datetime_format
                    };
                    worksheet
                        .write_number_with_format(r, c, *serial, format)
                        .map_err(xlsx_err)?;
                }
                other => {
                    let text = other.display();
                    if matches!(other, Cell::Number(_) | Cell::Date(_)) || text.chars().count() > MAX_CELL_CHARS {
                        degraded += 1;
                    }
                    worksheet.write_string(r, c, clamp_text(&text)).map_err(xlsx_err)?;
                }
            }
        }
    }

    if degraded > 0 {
        debug!(cells = degraded, "wrote cells as clamped text");
    }

    workbook.save_to_buffer().map_err(xlsx_err)
}

fn clamp_text(s: &str) -> String {
    if s.chars().count() <= MAX_CELL_CHARS {
        s.to_string()
    } else {
        s.chars().take(MAX_CELL_CHARS).collect()
    }
}
