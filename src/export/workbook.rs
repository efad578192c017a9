//! `.xlsx` encoding and decoding.
//!
//! Writing goes through `rust_xlsxwriter`, reading through `calamine`. Every
//! cell is written as a string; the header row is bold and there is no index
//! column. Files are written to a temporary file next to the target and then
//! renamed into place, so a failed export never leaves a truncated workbook.

use std::io::{Cursor, Write};
use std::path::Path;

use calamine::{Data, Reader, Xlsx};
use rust_xlsxwriter::{Format, Workbook};
use tracing::debug;

use super::table::Sheet;
use super::ExportError;

/// Excel's hard limit on columns per sheet
const MAX_COLUMNS: usize = 16_384;

/// Excel's hard limit on rows per sheet (including the header)
const MAX_ROWS: usize = 1_048_576;

/// Serialize one sheet into an in-memory workbook
pub fn encode(sheet: &Sheet, sheet_name: &str) -> Result<Vec<u8>, ExportError> {
    if sheet.headers.len() > MAX_COLUMNS || sheet.rows.len() + 1 > MAX_ROWS {
        return Err(ExportError::TooLarge {
            rows: sheet.rows.len(),
            columns: sheet.headers.len(),
        });
    }

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(sheet_name)?;

    let bold = Format::new().set_bold();
    for (col, header) in sheet.headers.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, header, &bold)?;
    }

    for (row_idx, row) in sheet.rows.iter().enumerate() {
        let row_num = (row_idx + 1) as u32;
        for (col, value) in row.iter().enumerate().take(sheet.headers.len()) {
            // Blank cells stay blank
            if value.is_empty() {
                continue;
            }
            worksheet.write_string(row_num, col as u16, value)?;
        }
    }

    let bytes = workbook.save_to_buffer()?;
    debug!(rows = sheet.rows.len(), bytes = bytes.len(), "Workbook encoded");
    Ok(bytes)
}

/// Parse the first worksheet of an in-memory workbook
pub fn decode(bytes: &[u8]) -> Result<Sheet, ExportError> {
    let workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes.to_vec()))?;
    read_first_sheet(workbook)
}

/// Read the first worksheet of a workbook on disk
pub fn read_file(path: &Path) -> Result<Sheet, ExportError> {
    let workbook: Xlsx<_> = calamine::open_workbook(path)?;
    read_first_sheet(workbook)
}

/// Encode and write a workbook, replacing `path` atomically
pub fn write_file(path: &Path, sheet: &Sheet, sheet_name: &str) -> Result<(), ExportError> {
    let bytes = encode(sheet, sheet_name)?;
    write_bytes(path, &bytes)
}

/// Write already-encoded workbook bytes, replacing `path` atomically
pub fn write_bytes(path: &Path, bytes: &[u8]) -> Result<(), ExportError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut temp = tempfile::NamedTempFile::new_in(dir)?;
    temp.write_all(bytes)?;
    temp.flush()?;
    temp.persist(path).map_err(|e| e.error)?;

    debug!(path = %path.display(), bytes = bytes.len(), "Workbook written");
    Ok(())
}

fn read_first_sheet<RS>(mut workbook: Xlsx<RS>) -> Result<Sheet, ExportError>
where
    RS: std::io::Read + std::io::Seek,
{
    let name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or(ExportError::NoWorksheet)?;

    let range = workbook.worksheet_range(&name)?;
    let mut rows = range.rows();

    let headers: Vec<String> = match rows.next() {
        Some(header_row) => header_row.iter().map(cell_text).collect(),
        None => return Ok(Sheet::default()),
    };

    let mut sheet = Sheet::new(headers);
    for row in rows {
        let mut cells: Vec<String> = row.iter().map(cell_text).collect();
        cells.resize(sheet.headers.len().max(cells.len()), String::new());
        sheet.rows.push(cells);
    }

    Ok(sheet)
}

/// Render a cell as the text the user sees
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        // Codes typed into Excel by hand come back as floats
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        other => other.to_string(),
    }
}
