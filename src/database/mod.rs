//! # Range Store
//!
//! Owns the `barcodes` table: bulk replace-all import and point-in-range lookup
//! with a case-insensitive (customer, PO, item code) key. Two backends share the
//! [`RangeStore`] trait and are picked through [`StorageConfig`].
use crate::config::StorageConfig;
use thiserror::Error;

pub(crate) mod duckdb_store;
pub(crate) mod memory;
pub(crate) mod record;

pub use duckdb_store::DuckDbStore;
pub use memory::MemoryStore;
pub use record::RangeRecord;

/// Name of the persisted range table
pub const TABLE: &str = "barcodes";

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("DuckDB error: {0}")]
    DuckDBError(#[from] duckdb::Error),

    #[error("Range table lock poisoned by a panicked writer")]
    Poisoned,
}

/// Storage of range records.
///
/// A store starts `Empty` (no table) and becomes `Populated` on the first
/// successful [`RangeStore::replace_all`], even when the batch has no rows.
pub trait RangeStore: Send + Sync {
    /// Discards every stored record and stores `records` in their given order.
    fn replace_all(&self, records: &[RangeRecord]) -> Result<(), StorageError>;

    /// Finds the first record, in import order, whose key matches case-insensitively
    /// and whose inclusive interval contains `serial`.
    fn lookup(
        &self,
        customer_id: &str,
        po_number: &str,
        item_code: &str,
        serial: &str,
    ) -> Result<Option<RangeRecord>, StorageError>;

    /// All records in import order; empty while the store is `Empty`.
    fn records(&self) -> Result<Vec<RangeRecord>, StorageError>;

    /// Whether a table exists (the `Populated` state).
    fn is_populated(&self) -> Result<bool, StorageError>;

    /// Releases the underlying connection.
    fn close(self: Box<Self>) -> Result<(), StorageError>;
}

/// Opens the store selected by configuration.
pub fn open_store(config: &StorageConfig) -> Result<Box<dyn RangeStore>, StorageError> {
    Ok(match config {
        StorageConfig::Memory => Box::new(MemoryStore::new()),
        StorageConfig::DuckDb { path: None } => Box::new(DuckDbStore::open_in_memory()?),
        StorageConfig::DuckDb { path: Some(path) } => Box::new(DuckDbStore::open(path)?),
    })
}
