//! Durable slot storage over a single SQLite database.

use std::path::Path;
use std::sync::Mutex;

use rusqlite::{params, Connection, OptionalExtension};

use vitalog_core::store::LocalStore;
use vitalog_core::Result;

use crate::errors::StorageError;

/// One row per slot; `write_slot` is a full upsert of the payload.
pub struct SqliteLocalStore {
    conn: Mutex<Connection>,
}

impl SqliteLocalStore {
    /// Open (or create) the store at `path`.
    pub fn open(path: impl AsRef<Path>) -> std::result::Result<Self, StorageError> {
        Self::from_connection(Connection::open(path)?)
    }

    /// Throwaway store backed by memory, used by tests.
    pub fn open_in_memory() -> std::result::Result<Self, StorageError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> std::result::Result<Self, StorageError> {
        conn.pragma_update(None, "journal_mode", "WAL")?;
        // write_slot must be durable before it returns.
        conn.pragma_update(None, "synchronous", "FULL")?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS slots (
                slot TEXT PRIMARY KEY,
                payload TEXT NOT NULL,
                updated_at TEXT NOT NULL DEFAULT (datetime('now'))
            )",
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

impl LocalStore for SqliteLocalStore {
    fn read_slot(&self, slot: &str) -> Result<Option<String>> {
        let conn = self.conn.lock().map_err(|_| StorageError::Poisoned)?;
        let payload = conn
            .query_row(
                "SELECT payload FROM slots WHERE slot = ?1",
                params![slot],
                |row| row.get(0),
            )
            .optional()
            .map_err(StorageError::from)?;
        Ok(payload)
    }

    fn write_slot(&self, slot: &str, payload: &str) -> Result<()> {
        let conn = self.conn.lock().map_err(|_| StorageError::Poisoned)?;
        conn.execute(
            "INSERT INTO slots (slot, payload, updated_at) VALUES (?1, ?2, datetime('now'))
             ON CONFLICT(slot) DO UPDATE SET
                payload = excluded.payload,
                updated_at = excluded.updated_at",
            params![slot, payload],
        )
        .map_err(StorageError::from)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use vitalog_core::store::read_records;

    #[test]
    fn roundtrips_a_slot() {
        let store = SqliteLocalStore::open_in_memory().expect("open store");
        store.write_slot("waterIntakes", "[1,2,3]").unwrap();
        assert_eq!(
            store.read_slot("waterIntakes").unwrap().as_deref(),
            Some("[1,2,3]")
        );
    }

    #[test]
    fn missing_slot_reads_none() {
        let store = SqliteLocalStore::open_in_memory().expect("open store");
        assert_eq!(store.read_slot("absent").unwrap(), None);
    }

    #[test]
    fn write_replaces_the_whole_payload() {
        let store = SqliteLocalStore::open_in_memory().expect("open store");
        store.write_slot("slot", "first").unwrap();
        store.write_slot("slot", "second").unwrap();
        assert_eq!(store.read_slot("slot").unwrap().as_deref(), Some("second"));
    }

    #[test]
    fn slots_survive_a_reopen() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("slots.db");

        {
            let store = SqliteLocalStore::open(&path).expect("open store");
            store.write_slot("waterIntakes", "[{\"n\":1}]").unwrap();
        }

        let reopened = SqliteLocalStore::open(&path).expect("reopen store");
        assert_eq!(
            reopened.read_slot("waterIntakes").unwrap().as_deref(),
            Some("[{\"n\":1}]")
        );
    }

    #[test]
    fn corrupt_payload_reads_as_empty_collection() {
        let store = SqliteLocalStore::open_in_memory().expect("open store");
        store.write_slot("waterIntakes", "}}garbage{{").unwrap();
        let records: Vec<serde_json::Value> = read_records(&store, "waterIntakes");
        assert!(records.is_empty());
    }
}
