use std::collections::HashMap;
use std::fmt::Display;

/// Value of a non-empty cell as handed to the importer.
#[derive(Clone, Debug, PartialEq)]
pub enum CellValue {
    Text(String),
    Number(f64),
    Bool(bool),
}

impl Display for CellValue {
    /// Text form of the value. Integral numbers print without a fractional part,
    /// so a serial typed as `5` in the sheet reads back as "5".
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CellValue::Text(value) => write!(f, "{}", value),
            CellValue::Number(value) if value.fract() == 0.0 && value.abs() < 1e15 => write!(f, "{}", *value as i64),
            CellValue::Number(value) => write!(f, "{}", value),
            CellValue::Bool(value) => write!(f, "{}", value),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_owned())
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

/// One data row of a sheet, keyed by header name.
/// Empty cells have no entry.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RawRow {
    /// Row number as shown by spreadsheet applications (1-based)
    number: usize,
    values: HashMap<String, CellValue>,
}

impl RawRow {
    pub fn new(number: usize) -> Self {
        RawRow {
            number,
            values: HashMap::new(),
        }
    }

    /// Builder-style insert, mostly for callers assembling rows by hand.
    pub fn with<V: Into<CellValue>>(mut self, column: &str, value: V) -> Self {
        self.insert(column, value.into());
        self
    }

    pub fn insert(&mut self, column: &str, value: CellValue) {
        self.values.insert(column.to_owned(), value);
    }

    pub fn get(&self, column: &str) -> Option<&CellValue> {
        self.values.get(column)
    }

    pub fn number(&self) -> usize {
        self.number
    }
}
