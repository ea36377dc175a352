//! # Workbook Reading
//!
//! Decodes Excel 2007+ workbooks (`.xlsx`, `.xlsm`, `.xlam`) from local files,
//! remote URLs or upload buffers and turns one sheet into rows keyed by the
//! header row, ready for the importer.
use thiserror::Error;

pub(crate) mod cell;
pub(crate) mod criteria;
pub(crate) mod excel;
pub(crate) mod reference;
pub(crate) mod row;
pub(crate) mod sheet;
pub(crate) mod xlsx;

#[cfg(test)]
pub(crate) mod fixtures;

pub use criteria::Criteria;
pub use row::CellValue;
pub use row::RawRow;
pub use xlsx::XlsxSpreadsheet;

#[derive(Error, Debug)]
pub enum SpreadsheetError {
    #[error("Missing '{0}' in workbook")]
    FileError(String),

    #[error("Spreadsheet '{0}' is encrypted or not an Office Open XML workbook")]
    CompoundFileError(String),

    #[error("Spreadsheet '{0}' has no sheets")]
    SpreadsheetEmptyError(String),

    #[error("No sheet of '{0}' matches the requested name")]
    SheetNotFoundError(String),

    #[error("Uploaded file '{0}' is empty")]
    EmptyUploadError(String),

    #[error("Invalid cell value in '{0}' sheet '{1}' at {2}: {3}")]
    CellValueError(String, String, String, String),
}
