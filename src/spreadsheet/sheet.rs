use crate::spreadsheet::cell::Cell;
use crate::spreadsheet::row::RawRow;
use crate::spreadsheet::SpreadsheetError;
use std::collections::HashMap;

/// Represents a worksheet read from a workbook, cells kept in row-major order.
pub(crate) struct Sheet {
    /// Source file name
    pub(crate) file_name: String,
    /// Sheet name
    pub(crate) name: String,
    /// All non-empty cells in the sheet
    pub(crate) cells: Vec<Cell>,
}

impl Sheet {
    pub(super) fn new(file_name: &str, name: &str) -> Self {
        Self {
            file_name: file_name.to_owned(),
            name: name.to_owned(),
            cells: Vec::new(),
        }
    }

    pub(super) fn push(&mut self, cell: Cell) {
        self.cells.push(cell);
    }

    /// Converts the sheet into rows keyed by header.
    ///
    /// The first row holding any cell is the header row. Repeated header names
    /// get `_1`, `_2`, ... suffixes, cells under an empty header are dropped,
    /// and rows without cells are skipped.
    pub(crate) fn rows(&self, shared_strings: &[String]) -> Result<Vec<RawRow>, SpreadsheetError> {
        let header_row = match self.cells.first() {
            Some(cell) => cell.row,
            None => return Ok(Vec::new()),
        };

        let mut headers = HashMap::<usize, String>::new();
        let mut occurrences = HashMap::<String, usize>::new();
        let mut rows = Vec::<RawRow>::new();
        let value = |cell: &Cell| cell.to_value(shared_strings).map_err(|message| self.cell_error(cell, message));
        for cell in &self.cells {
            if cell.row == header_row {
                let title = value(cell)?.to_string().trim().to_owned();
                if title.is_empty() {
                    continue;
                }
                let count = occurrences.entry(title.clone()).or_insert(0);
                let header = if *count == 0 { title } else { format!("{}_{}", title, count) };
                *count += 1;
                headers.insert(cell.col, header);
            } else if let Some(header) = headers.get(&cell.col) {
                let value = value(cell)?;
                if rows.last().map(|row| row.number() != cell.row + 1).unwrap_or(true) {
                    rows.push(RawRow::new(cell.row + 1));
                }
                if let Some(row) = rows.last_mut() {
                    row.insert(header, value);
                }
            }
        }
        Ok(rows)
    }

    fn cell_error(&self, cell: &Cell, message: String) -> SpreadsheetError {
        SpreadsheetError::CellValueError(
            self.file_name.to_owned(),
            self.name.to_owned(),
            cell.reference(),
            message,
        )
    }
}
