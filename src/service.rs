//! # Barcode Service
//!
//! Boundary layer over the import pipeline and the range store: imports an
//! uploaded workbook as a full replacement of the range table and answers
//! validation requests for scanned serial numbers.
use crate::config::Config;
use crate::database::open_store;
use crate::database::RangeRecord;
use crate::database::RangeStore;
use crate::error::BarcodeError;
use crate::error::ResultMessage;
use crate::normalizer;
use crate::spreadsheet::Criteria;
use crate::spreadsheet::XlsxSpreadsheet;
use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use tracing::debug;
use tracing::info;
use tracing::warn;

/// Outcome of a successful import
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    /// Number of range records now stored
    pub rows: usize,
}

/// A scanned code to check against the imported ranges.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateRequest {
    pub customer_id: String,
    pub po_number: String,
    pub item_code: String,
    /// Accepts a JSON string or number
    #[serde(deserialize_with = "string_or_number")]
    pub serial_number: String,
}

impl ValidateRequest {
    pub fn new(customer_id: &str, po_number: &str, item_code: &str, serial_number: &str) -> Self {
        ValidateRequest {
            customer_id: customer_id.to_owned(),
            po_number: po_number.to_owned(),
            item_code: item_code.to_owned(),
            serial_number: serial_number.to_owned(),
        }
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Serial {
        Text(String),
        Integer(u64),
        Float(f64),
    }

    Ok(match Serial::deserialize(deserializer)? {
        Serial::Text(text) => text,
        Serial::Integer(number) => number.to_string(),
        Serial::Float(number) => number.to_string(),
    })
}

/// `{"matched": true, "itemInfo": ...}` or `{"matched": false}`
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateResponse {
    pub matched: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_info: Option<String>,
}

impl From<Option<RangeRecord>> for ValidateResponse {
    fn from(record: Option<RangeRecord>) -> Self {
        ValidateResponse {
            matched: record.is_some(),
            item_info: record.map(|record| record.item_info),
        }
    }
}

pub struct BarcodeService {
    store: Box<dyn RangeStore>,
    criteria: Criteria,
    reject_overlapping_ranges: bool,
}

impl BarcodeService {
    pub fn new(store: Box<dyn RangeStore>, criteria: Criteria, reject_overlapping_ranges: bool) -> Self {
        BarcodeService {
            store,
            criteria,
            reject_overlapping_ranges,
        }
    }

    /// Opens the configured store and builds the sheet criteria.
    pub fn from_config(config: &Config) -> Result<Self, BarcodeError> {
        let criteria = Criteria::new(config.sheet.as_deref(), config.error_as_null)?;
        let store = open_store(&config.storage)?;
        Ok(Self::new(store, criteria, config.reject_overlapping_ranges))
    }

    /// Imports a workbook from a local path or remote URL.
    pub fn import_file(&self, file_name: &str) -> Result<ImportSummary, BarcodeError> {
        XlsxSpreadsheet::open(file_name)
            .and_then(|spreadsheet| self.import(spreadsheet))
            .with_prefix(&format!("import '{}'", file_name))
    }

    /// Imports an uploaded workbook held in memory.
    pub fn import_bytes(&self, name: &str, bytes: Vec<u8>) -> Result<ImportSummary, BarcodeError> {
        XlsxSpreadsheet::from_bytes(name, bytes)
            .and_then(|spreadsheet| self.import(spreadsheet))
            .with_prefix(&format!("import '{}'", name))
    }

    /// The table is only replaced once the whole batch is valid.
    fn import(&self, mut spreadsheet: XlsxSpreadsheet) -> Result<ImportSummary, BarcodeError> {
        let rows = spreadsheet.read_rows(&self.criteria)?;
        let records = normalizer::normalize(&rows).inspect_err(|e| warn!(workbook = spreadsheet.name(), "{e}"))?;
        if self.reject_overlapping_ranges {
            normalizer::check_overlaps(&records).inspect_err(|e| warn!(workbook = spreadsheet.name(), "{e}"))?;
        }

        self.store.replace_all(&records)?;
        info!(workbook = spreadsheet.name(), rows = records.len(), "imported barcode ranges");
        Ok(ImportSummary { rows: records.len() })
    }

    /// Looks up a scanned serial number. No match is a normal response, not an error.
    pub fn validate(&self, request: &ValidateRequest) -> Result<ValidateResponse, BarcodeError> {
        let serial = normalizer::pad_serial(&request.serial_number);
        let record = self.store.lookup(
            request.customer_id.trim(),
            request.po_number.trim(),
            request.item_code.trim(),
            &serial,
        )?;
        debug!(
            customer_id = %request.customer_id,
            po_number = %request.po_number,
            item_code = %request.item_code,
            serial = %serial,
            matched = record.is_some(),
            "validated serial number"
        );
        Ok(record.into())
    }

    /// All stored records in import order
    pub fn barcodes(&self) -> Result<Vec<RangeRecord>, BarcodeError> {
        Ok(self.store.records()?)
    }

    pub fn close(self) -> Result<(), BarcodeError> {
        Ok(self.store.close()?)
    }
}
