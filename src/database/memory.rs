use crate::database::RangeRecord;
use crate::database::RangeStore;
use crate::database::StorageError;
use std::sync::RwLock;
use tracing::info;

/// Process-local range store. `None` is the `Empty` state.
#[derive(Default)]
pub struct MemoryStore {
    table: RwLock<Option<Vec<RangeRecord>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RangeStore for MemoryStore {
    fn replace_all(&self, records: &[RangeRecord]) -> Result<(), StorageError> {
        let mut table = self.table.write().map_err(|_| StorageError::Poisoned)?;
        *table = Some(records.to_vec());
        info!(rows = records.len(), "replaced in-memory range table");
        Ok(())
    }

    fn lookup(
        &self,
        customer_id: &str,
        po_number: &str,
        item_code: &str,
        serial: &str,
    ) -> Result<Option<RangeRecord>, StorageError> {
        let table = self.table.read().map_err(|_| StorageError::Poisoned)?;
        Ok(table.iter().flatten().find(|record| {
            record.has_key(customer_id, po_number, item_code) && record.contains(serial)
        }).cloned())
    }

    fn records(&self) -> Result<Vec<RangeRecord>, StorageError> {
        let table = self.table.read().map_err(|_| StorageError::Poisoned)?;
        Ok(table.clone().unwrap_or_default())
    }

    fn is_populated(&self) -> Result<bool, StorageError> {
        let table = self.table.read().map_err(|_| StorageError::Poisoned)?;
        Ok(table.is_some())
    }

    fn close(self: Box<Self>) -> Result<(), StorageError> {
        Ok(())
    }
}
