use crate::spreadsheet::reference::index_to_reference;
use crate::spreadsheet::row::CellValue;
use chrono::NaiveDate;
use chrono::TimeDelta;

/// Types of cell data in workbook files.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub(crate) enum CellType {
    #[default]
    Empty,
    /// Boolean values (true/false)
    Boolean,
    /// Numeric values
    Number,
    /// Date/time values stored as numbers from 1900 epoch
    NumberDateTime1900,
    /// Date values stored as numbers from 1900 epoch
    NumberDate1900,
    /// Time values stored as numbers from 1900 epoch
    NumberTime1900,
    /// Date/time values stored as numbers from 1904 epoch
    NumberDateTime1904,
    /// Date values stored as numbers from 1904 epoch
    NumberDate1904,
    /// Time values stored as numbers from 1904 epoch
    NumberTime1904,
    /// ISO 8601 date/time strings
    IsoDateTime,
    /// Inline string values
    InlineString,
    /// Shared string table references
    SharedString,
    /// Error values
    Error,
}

impl CellType {
    /// Parses built-in Excel number format IDs to determine cell type.
    pub(crate) fn parse_builtin_number_format_id(id: &str, is_1904: bool) -> Option<Self> {
        match id {
            "22" => Some(if is_1904 { Self::NumberDateTime1904 } else { Self::NumberDateTime1900 }),
            "14" | "15" | "16" | "17" => Some(if is_1904 { Self::NumberDate1904 } else { Self::NumberDate1900 }),
            "18" | "19" | "20" | "21" | "45" | "46" | "47" => Some(if is_1904 { Self::NumberTime1904 } else { Self::NumberTime1900 }),
            _ => None,
        }
    }

    /// Parses custom number format strings to determine cell type.
    /// Date/time letters inside literals, escapes and bracketed sections are ignored.
    pub(crate) fn parse_custom_number_format(format: &str, is_1904: bool) -> Self {
        let mut is_escaped = false;
        let mut is_literal = false;
        let mut is_date = false;
        let mut is_time = false;
        let mut is_color = false;
        for character in format.chars() {
            match character {
                _ if is_escaped => is_escaped = false,
                '_' | '\\' if !is_escaped => is_escaped = true,

                '"' if is_literal => is_literal = false,
                '"' if !is_literal && !is_color => is_literal = true,

                ']' if is_color => is_color = false,
                '[' if !is_color && !is_literal => is_color = true,
                _ if is_literal || is_color => (),

                'Y' | 'y' | 'D' | 'd' => is_date = true,
                'H' | 'h' | 'S' | 's' => is_time = true,
                _ => (),
            }
        }

        match (is_date, is_time, is_1904) {
            (true, true, false) => Self::NumberDateTime1900,
            (true, true, true) => Self::NumberDateTime1904,
            (true, false, false) => Self::NumberDate1900,
            (true, false, true) => Self::NumberDate1904,
            (false, true, false) => Self::NumberTime1900,
            (false, true, true) => Self::NumberTime1904,
            (false, false, _) => Self::Number,
        }
    }
}

/// A single non-empty cell read from a worksheet.
#[derive(Clone, Debug)]
pub(crate) struct Cell {
    /// Row index (0-based)
    pub(crate) row: usize,
    /// Column index (0-based)
    pub(crate) col: usize,
    /// Cell data type
    pub(crate) kind: CellType,
    /// Raw cell value; an index into the shared strings for `SharedString`
    pub(crate) value: String,
}

impl Cell {
    /// Returns the Excel-style cell reference (e.g., "A1", "B2").
    pub(crate) fn reference(&self) -> String {
        index_to_reference(self.row, self.col)
    }

    /// Converts the raw value into a typed cell value.
    /// Date and time cells are rendered as ISO-like text.
    pub(crate) fn to_value(&self, shared_strings: &[String]) -> Result<CellValue, String> {
        match self.kind {
            CellType::Empty | CellType::Error => Err(format!("unexpected cell value '{}'", self.value)),
            CellType::Boolean => Ok(CellValue::Bool(self.value == "1" || self.value == "true")),
            CellType::Number => self.value
                .parse::<f64>()
                .map(CellValue::Number)
                .map_err(|_| format!("parse '{}' to number failed", self.value)),
            CellType::NumberDateTime1900 => to_datetime_string(&self.value, false).map(CellValue::Text),
            CellType::NumberDateTime1904 => to_datetime_string(&self.value, true).map(CellValue::Text),
            CellType::NumberDate1900 => to_date_string(&self.value, false).map(CellValue::Text),
            CellType::NumberDate1904 => to_date_string(&self.value, true).map(CellValue::Text),
            CellType::NumberTime1900 | CellType::NumberTime1904 => to_time_string(&self.value).map(CellValue::Text),
            CellType::IsoDateTime => Ok(CellValue::Text(self.value.replace('T', " "))),
            CellType::InlineString => Ok(CellValue::Text(self.value.to_owned())),
            CellType::SharedString => {
                let index = self.value
                    .parse::<usize>()
                    .map_err(|_| format!("invalid shared string index '{}'", self.value))?;
                shared_strings
                    .get(index)
                    .map(|string| CellValue::Text(string.to_owned()))
                    .ok_or_else(|| format!("shared string index {} out of bounds", index))
            }
        }
    }
}

/// Converts an Excel serial date to an ISO date string.
/// Serial 60 is the fictitious 1900-02-29 kept for Lotus 1-2-3 compatibility.
fn to_date_string(value: &str, is_1904: bool) -> Result<String, String> {
    let out_of_range = || format!("serial date '{}' out of range", value);
    let serial = parse_serial(value)?;
    if !serial.is_finite() {
        return Err(out_of_range());
    }

    let days = serial.trunc() as i64;
    let offset = if is_1904 {
        1462
    } else if days < 60 {
        1
    } else {
        0
    };
    let date = days
        .checked_add(offset)
        .and_then(TimeDelta::try_days)
        .and_then(|duration| NaiveDate::from_ymd_opt(1899, 12, 30)?.checked_add_signed(duration))
        .ok_or_else(out_of_range)?;
    Ok(date.format("%Y-%m-%d").to_string())
}

/// Converts the fractional part of an Excel serial to a time string.
fn to_time_string(value: &str) -> Result<String, String> {
    let fraction = parse_serial(value)?.fract();
    let mut hours = (fraction * 86_400_000f64).round() as i64;
    let milliseconds = hours % 1_000; hours /= 1_000;
    let seconds = hours % 60; hours /= 60;
    let minutes = hours % 60; hours /= 60;
    let timestamp = if milliseconds > 0 {
        format!("{hours:02}:{minutes:02}:{seconds:02}.{milliseconds:03}")
    } else {
        format!("{hours:02}:{minutes:02}:{seconds:02}")
    };
    Ok(timestamp)
}

/// Converts an Excel serial date/time to an ISO datetime string.
fn to_datetime_string(value: &str, is_1904: bool) -> Result<String, String> {
    let date = to_date_string(value, is_1904)?;
    let time = to_time_string(value)?;
    Ok(format!("{date} {time}"))
}

fn parse_serial(value: &str) -> Result<f64, String> {
    value.parse::<f64>().map_err(|_| format!("parse '{}' to serial date failed", value))
}
