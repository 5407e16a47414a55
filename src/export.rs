use anyhow::{Context, Result};
use rust_xlsxwriter::{Workbook, Worksheet};
use std::path::Path;
use tracing::info;

use crate::table::{Table, Value};

/// Sheet name used for the exported workbook.
pub const SHEET_NAME: &str = "FilteredData";

/// Write `table` as a single-sheet workbook to `path`: header row from the
/// schema, one row per table row, no index column.
pub fn write_xlsx(table: &Table, path: &Path) -> Result<()> {
    let mut workbook = build_workbook(table)?;
    workbook
        .save(path)
        .with_context(|| format!("failed to write workbook {}", path.display()))?;
    info!(path = %path.display(), rows = table.num_rows(), "workbook written");
    Ok(())
}

/// Same workbook, rendered into an in-memory buffer.
pub fn to_xlsx_bytes(table: &Table) -> Result<Vec<u8>> {
    let mut workbook = build_workbook(table)?;
    workbook
        .save_to_buffer()
        .context("failed to render workbook to buffer")
}

fn build_workbook(table: &Table) -> Result<Workbook> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME).context("naming worksheet")?;
    fill_worksheet(worksheet, table)?;
    Ok(workbook)
}

fn fill_worksheet(worksheet: &mut Worksheet, table: &Table) -> Result<()> {
    for (col, name) in table.columns().iter().enumerate() {
        worksheet
            .write_string(0, col as u16, name)
            .context("writing header row")?;
    }
    for (r, row) in table.rows().iter().enumerate() {
        let excel_row = (r + 1) as u32;
        for (c, value) in row.iter().enumerate() {
            let col = c as u16;
            match value {
                Value::Empty => {}
                Value::Number(n) => {
                    worksheet
                        .write_number(excel_row, col, *n)
                        .with_context(|| format!("writing cell ({}, {})", excel_row, col))?;
                }
                Value::Text(s) => {
                    worksheet
                        .write_string(excel_row, col, s)
                        .with_context(|| format!("writing cell ({}, {})", excel_row, col))?;
                }
            }
        }
    }
    Ok(())
}
