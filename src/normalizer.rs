//! # Spreadsheet Normalizer
//!
//! Turns rows of the range sheet into [`RangeRecord`]s. Every field is coerced
//! to text and trimmed; the series bounds are zero-padded to [`SERIAL_WIDTH`]
//! characters so that string order on them equals numeric order.
//!
//! The whole batch is rejected on the first invalid row.
use crate::database::RangeRecord;
use crate::spreadsheet::RawRow;
use thiserror::Error;

pub const CUSTOMER_ID: &str = "Customer ID";
pub const PO_NUMBER: &str = "PO Number";
pub const ITEM_CODE: &str = "Item Code";
pub const SERIES_START: &str = "Series Number Start";
pub const SERIES_END: &str = "Series Number End";
pub const ITEM_INFO: &str = "Item Info";

/// Columns every row must provide, in sheet order.
pub const REQUIRED_COLUMNS: [&str; 6] = [CUSTOMER_ID, PO_NUMBER, ITEM_CODE, SERIES_START, SERIES_END, ITEM_INFO];

/// Width of a normalized serial number
pub const SERIAL_WIDTH: usize = 4;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Row {row}: missing value for column '{column}'")]
    MissingValue { row: usize, column: &'static str },

    #[error("Row {row}: '{value}' in column '{column}' is wider than {SERIAL_WIDTH} characters")]
    SerialTooWide {
        row: usize,
        column: &'static str,
        value: String,
    },

    #[error(
        "Overlapping ranges {first_start}-{first_end} and {second_start}-{second_end} \
         for customer '{customer_id}', PO '{po_number}', item '{item_code}'"
    )]
    OverlappingRanges {
        customer_id: String,
        po_number: String,
        item_code: String,
        first_start: String,
        first_end: String,
        second_start: String,
        second_end: String,
    },
}

/// Normalizes every row, preserving order. Fails on the first invalid row.
///
/// A column counts as missing when its cell is absent or its text is blank
/// after trimming, so `"   "` fails with [`ValidationError::MissingValue`].
pub fn normalize(rows: &[RawRow]) -> Result<Vec<RangeRecord>, ValidationError> {
    rows.iter().map(normalize_row).collect()
}

fn normalize_row(row: &RawRow) -> Result<RangeRecord, ValidationError> {
    Ok(RangeRecord {
        customer_id: required(row, CUSTOMER_ID)?,
        po_number: required(row, PO_NUMBER)?,
        item_code: required(row, ITEM_CODE)?,
        range_start: bound(row, SERIES_START)?,
        range_end: bound(row, SERIES_END)?,
        item_info: required(row, ITEM_INFO)?,
    })
}

/// Trimmed text of a column. Absent cells and whitespace-only text are missing.
fn required(row: &RawRow, column: &'static str) -> Result<String, ValidationError> {
    let missing = || ValidationError::MissingValue {
        row: row.number(),
        column,
    };
    let value = row.get(column).ok_or_else(missing)?.to_string();
    let value = value.trim();
    if value.is_empty() {
        return Err(missing());
    }
    Ok(value.to_owned())
}

fn bound(row: &RawRow, column: &'static str) -> Result<String, ValidationError> {
    let value = pad_serial(&required(row, column)?);
    if value.chars().count() > SERIAL_WIDTH {
        return Err(ValidationError::SerialTooWide {
            row: row.number(),
            column,
            value,
        });
    }
    Ok(value)
}

/// Trims and left-pads a serial number with `0` to [`SERIAL_WIDTH`] characters.
/// Longer values are returned trimmed but otherwise unchanged.
pub fn pad_serial(value: &str) -> String {
    format!("{:0>width$}", value.trim(), width = SERIAL_WIDTH)
}

/// Fails when two records share a lookup key and their inclusive intervals intersect.
pub fn check_overlaps(records: &[RangeRecord]) -> Result<(), ValidationError> {
    let mut sorted = records.iter().collect::<Vec<_>>();
    sorted.sort_by_cached_key(|record| {
        (
            record.customer_id.to_lowercase(),
            record.po_number.to_lowercase(),
            record.item_code.to_lowercase(),
            record.range_start.clone(),
        )
    });

    // Sorted by start within a key, so only the previous record can overlap.
    let mut previous: Option<&RangeRecord> = None;
    for record in sorted {
        if let Some(previous) = previous.filter(|previous| previous.overlaps(record)) {
            return Err(ValidationError::OverlappingRanges {
                customer_id: record.customer_id.clone(),
                po_number: record.po_number.clone(),
                item_code: record.item_code.clone(),
                first_start: previous.range_start.clone(),
                first_end: previous.range_end.clone(),
                second_start: record.range_start.clone(),
                second_end: record.range_end.clone(),
            });
        }
        previous = Some(record);
    }
    Ok(())
}
