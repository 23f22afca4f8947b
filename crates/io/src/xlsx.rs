// Excel header and row-count extraction (xlsx, xls, xlsm, xlsb, ods)

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader, Sheets};

/// Header cells and data-row count of the first worksheet.
///
/// The first row of the used range is the header. Rows with no non-empty
/// cell are not counted.
pub fn summarize(path: &Path) -> Result<(Vec<String>, usize), String> {
    let mut workbook: Sheets<_> = open_workbook_auto(path)
        .map_err(|e| format!("Failed to open Excel file: {}", e))?;

    let first = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| "Excel file contains no sheets".to_string())?;

    let range = workbook
        .worksheet_range(&first)
        .map_err(|e| format!("Failed to read sheet '{}': {}", first, e))?;

    let mut rows = range.rows();
    let Some(header_row) = rows.next() else {
        return Ok((Vec::new(), 0));
    };

    let header: Vec<String> = header_row.iter().map(cell_text).collect();
    let count = rows
        .filter(|row| row.iter().any(|cell| !matches!(cell, Data::Empty)))
        .count();

    Ok((header, count))
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        // Integral floats as "2024", not "2024.0"
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        other => other.to_string(),
    }
}
