//! Local slot-store port and the typed collection layer on top of it.

use log::warn;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::errors::Result;

/// Persisted key-value store: each named slot holds one serialized collection.
///
/// `read_slot` and `write_slot` report real storage failures; the
/// swallow-to-empty policy for unreadable data lives in the typed layer so
/// tests can tell "absent" apart from "unreadable".
pub trait LocalStore: Send + Sync {
    fn read_slot(&self, slot: &str) -> Result<Option<String>>;

    /// Full replace of the slot payload, durable before returning.
    fn write_slot(&self, slot: &str, payload: &str) -> Result<()>;
}

/// Read a whole collection from a slot.
///
/// Missing or corrupt payloads come back as an empty list: a broken cache
/// must never block the app.
pub fn read_records<R: DeserializeOwned>(store: &dyn LocalStore, slot: &str) -> Vec<R> {
    let raw = match store.read_slot(slot) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Vec::new(),
        Err(err) => {
            warn!("slot '{}' unreadable, treating as empty: {}", slot, err);
            return Vec::new();
        }
    };

    match serde_json::from_str(&raw) {
        Ok(records) => records,
        Err(err) => {
            warn!("slot '{}' holds corrupt data, treating as empty: {}", slot, err);
            Vec::new()
        }
    }
}

/// Serialize and replace a whole collection slot.
pub fn write_records<R: Serialize>(
    store: &dyn LocalStore,
    slot: &str,
    records: &[R],
) -> Result<()> {
    let payload = serde_json::to_string(records)?;
    store.write_slot(slot, &payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MapStore {
        slots: Mutex<HashMap<String, String>>,
    }

    impl LocalStore for MapStore {
        fn read_slot(&self, slot: &str) -> Result<Option<String>> {
            Ok(self.slots.lock().unwrap().get(slot).cloned())
        }

        fn write_slot(&self, slot: &str, payload: &str) -> Result<()> {
            self.slots
                .lock()
                .unwrap()
                .insert(slot.to_string(), payload.to_string());
            Ok(())
        }
    }

    #[test]
    fn roundtrips_a_collection() {
        let store = MapStore::default();
        write_records(&store, "numbers", &[1u32, 2, 3]).unwrap();
        let read: Vec<u32> = read_records(&store, "numbers");
        assert_eq!(read, vec![1, 2, 3]);
    }

    #[test]
    fn missing_slot_reads_empty() {
        let store = MapStore::default();
        let read: Vec<u32> = read_records(&store, "absent");
        assert!(read.is_empty());
    }

    #[test]
    fn corrupt_payload_reads_empty() {
        let store = MapStore::default();
        store.write_slot("numbers", "not json at all").unwrap();
        let read: Vec<u32> = read_records(&store, "numbers");
        assert!(read.is_empty());
    }
}
