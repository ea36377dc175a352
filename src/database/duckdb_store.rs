use crate::database::RangeRecord;
use crate::database::RangeStore;
use crate::database::StorageError;
use crate::database::TABLE;
use duckdb::params;
use duckdb::Connection;
use duckdb::Row;
use std::path::Path;
use std::sync::Mutex;
use std::sync::MutexGuard;
use tracing::debug;
use tracing::info;

const COLUMNS: &str = "customer_id, po_number, item_code, range_start, range_end, item_info";

/// Range store backed by a DuckDB database file, or an in-memory DuckDB database.
///
/// Records are kept in a plain `VARCHAR` table. Lookups return the first match
/// by `rowid`, which follows insertion order within one import.
pub struct DuckDbStore {
    connection: Mutex<Connection>,
}

impl DuckDbStore {
    /// Opens (or creates) a database file. An existing `barcodes` table is kept.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        let connection = Connection::open(path.as_ref())?;
        info!(path = %path.as_ref().display(), "opened DuckDB range store");
        Ok(Self::with_connection(connection))
    }

    pub fn open_in_memory() -> Result<Self, StorageError> {
        Ok(Self::with_connection(Connection::open_in_memory()?))
    }

    fn with_connection(connection: Connection) -> Self {
        DuckDbStore {
            connection: Mutex::new(connection),
        }
    }

    fn connection(&self) -> Result<MutexGuard<'_, Connection>, StorageError> {
        self.connection.lock().map_err(|_| StorageError::Poisoned)
    }

    fn table_exists(connection: &Connection) -> Result<bool, StorageError> {
        let count: i64 = connection.query_row(
            "SELECT count(*) FROM duckdb_tables() WHERE table_name = ?",
            [TABLE],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    fn to_record(row: &Row<'_>) -> duckdb::Result<RangeRecord> {
        Ok(RangeRecord {
            customer_id: row.get(0)?,
            po_number: row.get(1)?,
            item_code: row.get(2)?,
            range_start: row.get(3)?,
            range_end: row.get(4)?,
            item_info: row.get(5)?,
        })
    }
}

impl RangeStore for DuckDbStore {
    fn replace_all(&self, records: &[RangeRecord]) -> Result<(), StorageError> {
        let mut connection = self.connection()?;
        let transaction = connection.transaction()?;
        transaction.execute_batch(&format!(
            "DROP TABLE IF EXISTS {TABLE};
             CREATE TABLE {TABLE} (
                 customer_id VARCHAR NOT NULL,
                 po_number VARCHAR NOT NULL,
                 item_code VARCHAR NOT NULL,
                 range_start VARCHAR NOT NULL,
                 range_end VARCHAR NOT NULL,
                 item_info VARCHAR NOT NULL
             );"
        ))?;
        {
            let mut appender = transaction.appender(TABLE)?;
            for record in records {
                appender.append_row(params![
                    record.customer_id,
                    record.po_number,
                    record.item_code,
                    record.range_start,
                    record.range_end,
                    record.item_info,
                ])?;
            }
            appender.flush()?;
        }
        transaction.commit()?;
        info!(rows = records.len(), "replaced range table");
        Ok(())
    }

    fn lookup(
        &self,
        customer_id: &str,
        po_number: &str,
        item_code: &str,
        serial: &str,
    ) -> Result<Option<RangeRecord>, StorageError> {
        let connection = self.connection()?;
        if !Self::table_exists(&connection)? {
            debug!("lookup on empty range store");
            return Ok(None);
        }

        let mut statement = connection.prepare(&format!(
            "SELECT {COLUMNS} FROM {TABLE}
             WHERE lower(customer_id) = lower(?)
               AND lower(po_number) = lower(?)
               AND lower(item_code) = lower(?)
               AND range_start <= ?
               AND range_end >= ?
             ORDER BY rowid
             LIMIT 1"
        ))?;
        let mut rows = statement.query(params![customer_id, po_number, item_code, serial, serial])?;
        let record = match rows.next()? {
            Some(row) => Some(Self::to_record(row)?),
            None => None,
        };
        Ok(record)
    }

    fn records(&self) -> Result<Vec<RangeRecord>, StorageError> {
        let connection = self.connection()?;
        if !Self::table_exists(&connection)? {
            return Ok(Vec::new());
        }

        let mut statement = connection.prepare(&format!("SELECT {COLUMNS} FROM {TABLE} ORDER BY rowid"))?;
        let records = statement
            .query_map([], Self::to_record)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }

    fn is_populated(&self) -> Result<bool, StorageError> {
        let connection = self.connection()?;
        Self::table_exists(&connection)
    }

    fn close(self: Box<Self>) -> Result<(), StorageError> {
        let connection = self.connection.into_inner().map_err(|_| StorageError::Poisoned)?;
        connection.close().map_err(|(_, e)| e)?;
        Ok(())
    }
}
