use bytes::Bytes;
use calamine::{open_workbook_from_rs, Data, Range, Reader, Xlsx, XlsxError};
use std::io::{Cursor, ErrorKind};
use std::path::Path;

use super::types::RawTable;
use crate::error::LoadError;

/// Reads `sheet` from the workbook at `path`, skips `skip_rows` leading rows
/// and splits the next row off as the header.
pub fn load_table(path: &Path, sheet: &str, skip_rows: usize) -> Result<RawTable, LoadError> {
    let start = std::time::Instant::now();
    tracing::info!(path = %path.display(), sheet, skip_rows, "Loading worksheet");

    let file_data = read_workbook(path)?;
    let cursor = Cursor::new(file_data);
    let mut workbook: Xlsx<_> = open_workbook_from_rs(cursor).map_err(|e: XlsxError| {
        tracing::error!("Failed to open Excel file {}: {}", path.display(), e);
        LoadError::Unreadable {
            path: path.to_path_buf(),
            reason: e.to_string(),
        }
    })?;

    let sheet_names = workbook.sheet_names().to_vec();
    if !sheet_names.iter().any(|name| name == sheet) {
        tracing::error!("Sheet {} not found, workbook has {:?}", sheet, sheet_names);
        return Err(LoadError::SheetMissing {
            path: path.to_path_buf(),
            sheet: sheet.to_string(),
            available: sheet_names,
        });
    }

    let range = workbook
        .worksheet_range(sheet)
        .map_err(|e| LoadError::Unreadable {
            path: path.to_path_buf(),
            reason: format!("failed to read worksheet {}: {}", sheet, e),
        })?;

    let table = table_from_range(&range, skip_rows);
    tracing::info!(
        "Loaded sheet {} with {} rows x {} columns in {:?}",
        sheet,
        table.height(),
        table.width(),
        start.elapsed()
    );
    Ok(table)
}

fn read_workbook(path: &Path) -> Result<Bytes, LoadError> {
    std::fs::read(path)
        .map(Bytes::from)
        .map_err(|source| match source.kind() {
            ErrorKind::NotFound => LoadError::FileMissing(path.to_path_buf()),
            _ => LoadError::Io {
                path: path.to_path_buf(),
                source,
            },
        })
}

/// Re-anchors a used range at A1 so positions stay absolute even when the
/// sheet starts with blank rows or columns.
pub fn table_from_range(range: &Range<Data>, skip_rows: usize) -> RawTable {
    let (row_offset, col_offset) = range
        .start()
        .map(|(row, col)| (row as usize, col as usize))
        .unwrap_or((0, 0));

    let leading = std::iter::repeat_with(Vec::new).take(row_offset);
    let rows = range.rows().map(|row| {
        let mut cells = vec![Data::Empty; col_offset];
        cells.extend_from_slice(row);
        cells
    });

    table_from_rows(leading.chain(rows), skip_rows)
}

/// Splits header and data rows. Blank data rows are dropped; a sheet with
/// nothing after the skipped rows yields an empty table.
pub fn table_from_rows<I>(rows: I, skip_rows: usize) -> RawTable
where
    I: IntoIterator<Item = Vec<Data>>,
{
    let mut rows = rows.into_iter().skip(skip_rows);

    let headers = match rows.next() {
        Some(header) => header.iter().map(|cell| cell.to_string()).collect(),
        None => return RawTable::default(),
    };

    let data = rows
        .filter(|row| row.iter().any(|cell| !matches!(cell, Data::Empty)))
        .collect();

    RawTable::new(headers, data)
}
