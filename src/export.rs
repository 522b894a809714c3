use rust_xlsxwriter::{Workbook, XlsxError};

use crate::models::{ORDER_COLUMNS, Order};

pub const EXPORT_FILENAME: &str = "siparisler.xlsx";
pub const CONTENT_DISPOSITION: &str = "attachment; filename=\"siparisler.xlsx\"";
pub const SHEET_NAME: &str = "Siparişler";
pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Longest string Excel accepts in one cell, in characters.
pub const MAX_CELL_CHARS: usize = 32_767;

/// Cuts `value` to at most [`MAX_CELL_CHARS`] characters.
pub fn cell_text(value: &str) -> &str {
    match value.char_indices().nth(MAX_CELL_CHARS) {
        Some((end, _)) => &value[..end],
        None => value,
    }
}

/// Header row followed by one row per order, in log order.
pub fn order_rows(orders: &[Order]) -> Vec<Vec<String>> {
    let header = ORDER_COLUMNS.iter().map(|c| c.to_string()).collect();
    std::iter::once(header)
        .chain(
            orders
                .iter()
                .map(|order| order.values().iter().map(|v| v.to_string()).collect()),
        )
        .collect()
}

/// Renders the full order log as a single-sheet `.xlsx` workbook.
///
/// Values longer than a cell can hold are cut so one oversized record does
/// not fail the whole export.
pub fn orders_workbook(orders: &[Order]) -> Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME)?;

    for (row, values) in order_rows(orders).iter().enumerate() {
        for (col, value) in values.iter().enumerate() {
            worksheet.write_string(row as u32, col as u16, cell_text(value))?;
        }
    }

    workbook.save_to_buffer()
}
