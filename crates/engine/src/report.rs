//! Spreadsheet export of expenses.
//!
//! The workbook has a single `Expenses` sheet: a header row followed by one
//! row per expense, in the order the expenses are given.

use rust_xlsxwriter::{Format, Workbook};

use crate::{Expense, ResultEngine};

pub const SHEET_NAME: &str = "Expenses";
pub const HEADER: [&str; 5] = ["ID", "Title", "Date", "Amount UAH", "Amount USD"];
/// Date format of the `Date` column.
pub const DATE_FORMAT: &str = "%d.%m.%Y";

/// A single spreadsheet cell value.
#[derive(Clone, Debug, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
}

/// Cell values of the report, header row included.
pub fn report_rows(expenses: &[Expense]) -> Vec<Vec<Cell>> {
    let header = HEADER
        .iter()
        .map(|title| Cell::Text((*title).to_string()))
        .collect();

    std::iter::once(header)
        .chain(expenses.iter().map(|expense| {
            vec![
                Cell::Number(f64::from(expense.id)),
                Cell::Text(expense.title.clone()),
                Cell::Text(expense.date.format(DATE_FORMAT).to_string()),
                Cell::Number(expense.amount_uah),
                Cell::Number(expense.amount_usd),
            ]
        }))
        .collect()
}

/// Builds the `.xlsx` document for `expenses`.
pub fn build_report(expenses: &[Expense]) -> ResultEngine<Vec<u8>> {
    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();

    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME)?;
    worksheet.set_column_width(1, 32)?;
    worksheet.set_column_width(2, 12)?;

    for (row, cells) in (0u32..).zip(report_rows(expenses)) {
        for (col, cell) in (0u16..).zip(cells) {
            match cell {
                Cell::Text(text) if row == 0 => {
                    worksheet.write_string_with_format(row, col, text, &bold)?;
                }
                Cell::Text(text) => {
                    worksheet.write_string(row, col, text)?;
                }
                Cell::Number(value) => {
                    worksheet.write_number(row, col, value)?;
                }
            }
        }
    }

    Ok(workbook.save_to_buffer()?)
}
