//! # Barcode Ranges
//!
//! Imports spreadsheets of barcode ranges and validates scanned serial numbers
//! against them.
//!
//! ## Pipeline
//!
//! 1. **Workbook reading**: an Excel 2007+ workbook (local path, remote URL or
//!    upload buffer) is decoded and its range sheet turned into rows keyed by header.
//! 2. **Normalization**: every row becomes a [`RangeRecord`] with trimmed text
//!    fields and 4-character zero-padded series bounds. One bad row fails the batch.
//! 3. **Range store**: the batch replaces the `barcodes` table as a whole. Lookups
//!    match the (customer, PO, item code) key case-insensitively and test the
//!    serial against inclusive bounds.
//!
//! ## Storage backends
//!
//! - `duckdb`: a DuckDB database file, or an in-memory DuckDB database
//! - `memory`: a process-local table
//!
//! [`BarcodeService`] ties the steps together and is what a transport layer
//! (the bundled CLI, or an HTTP server) talks to.
pub mod config;
pub mod database;
pub mod error;
pub mod normalizer;
pub mod service;
pub mod spreadsheet;

mod helpers;

pub use config::Config;
pub use config::StorageConfig;
pub use database::RangeRecord;
pub use database::RangeStore;
pub use error::BarcodeError;
pub use error::ErrorResponse;
pub use error::FailureKind;
pub use service::BarcodeService;
pub use service::ImportSummary;
pub use service::ValidateRequest;
pub use service::ValidateResponse;
