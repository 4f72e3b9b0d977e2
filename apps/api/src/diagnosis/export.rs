//! In-memory Excel export of a diagnosis's attribute lines.

use rust_xlsxwriter::Workbook;

use crate::errors::AppError;
use crate::models::diagnosis::AttributeLineDetail;

const SHEET_NAME: &str = "Diagnosis Report";
const HEADERS: [&str; 3] = ["Attribute Set", "Attribute", "Values"];

/// Flattens attribute lines into spreadsheet rows: one header row, then one
/// row per line with its values comma-joined.
pub fn report_rows(lines: &[AttributeLineDetail]) -> Vec<[String; 3]> {
    let mut rows = Vec::with_capacity(lines.len() + 1);
    rows.push(HEADERS.map(String::from));
    for line in lines {
        rows.push([
            line.attribute_set.clone(),
            line.attribute.clone(),
            line.values.join(", "),
        ]);
    }
    rows
}

/// Renders the report workbook to an in-memory .xlsx buffer.
pub fn build_workbook(lines: &[AttributeLineDetail]) -> Result<Vec<u8>, AppError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet
        .set_name(SHEET_NAME)
        .map_err(|e| AppError::Export(e.to_string()))?;

    for (row_num, row) in report_rows(lines).iter().enumerate() {
        for (col_num, cell) in row.iter().enumerate() {
            worksheet
                .write_string(row_num as u32, col_num as u16, cell.as_str())
                .map_err(|e| AppError::Export(e.to_string()))?;
        }
    }

    workbook
        .save_to_buffer()
        .map_err(|e| AppError::Export(e.to_string()))
}
