//! In-memory store fakes shared by the crate's test modules.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::errors::{Error, Result};
use crate::store::{
    document_matches, order_documents, FieldFilter, LocalStore, RemoteStore, SortSpec,
};

#[derive(Default)]
pub(crate) struct MemoryLocalStore {
    slots: Mutex<HashMap<String, String>>,
}

impl MemoryLocalStore {
    pub(crate) fn seed(slot: &str, payload: &str) -> Arc<Self> {
        let store = Self::default();
        store
            .slots
            .lock()
            .unwrap()
            .insert(slot.to_string(), payload.to_string());
        Arc::new(store)
    }
}

impl LocalStore for MemoryLocalStore {
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

/// In-memory document store. `set_unavailable` makes every call fail soft;
/// `set_delay_ms` stalls calls so timeout handling can be exercised under a
/// paused runtime.
#[derive(Default)]
pub(crate) struct MockRemoteStore {
    collections: Mutex<HashMap<String, Vec<(String, Value)>>>,
    unavailable: AtomicBool,
    delay_ms: AtomicU64,
    calls: AtomicUsize,
    next_id: AtomicUsize,
}

impl MockRemoteStore {
    pub(crate) fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub(crate) fn set_delay_ms(&self, delay_ms: u64) {
        self.delay_ms.store(delay_ms, Ordering::SeqCst);
    }

    pub(crate) fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn document_count(&self, collection: &str) -> usize {
        self.collections
            .lock()
            .unwrap()
            .get(collection)
            .map(Vec::len)
            .unwrap_or(0)
    }

    pub(crate) fn document(&self, collection: &str, id: &str) -> Option<Value> {
        self.collections
            .lock()
            .unwrap()
            .get(collection)
            .and_then(|docs| {
                docs.iter()
                    .find(|(doc_id, _)| doc_id == id)
                    .map(|(_, doc)| doc.clone())
            })
    }

    /// Drop a document behind the client's back.
    pub(crate) fn evict_document(&self, collection: &str, id: &str) {
        if let Some(docs) = self.collections.lock().unwrap().get_mut(collection) {
            docs.retain(|(doc_id, _)| doc_id != id);
        }
    }

    async fn gate(&self) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let delay_ms = self.delay_ms.load(Ordering::SeqCst);
        if delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
        }
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(Error::remote_unavailable("injected outage"));
        }
        Ok(())
    }
}

#[async_trait]
impl RemoteStore for MockRemoteStore {
    async fn add(&self, collection: &str, mut document: Value) -> Result<String> {
        self.gate().await?;
        let id = format!("srv-{}", self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        if let Some(fields) = document.as_object_mut() {
            fields.insert("id".to_string(), json!(id));
        }
        self.collections
            .lock()
            .unwrap()
            .entry(collection.to_string())
            .or_default()
            .push((id.clone(), document));
        Ok(id)
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>> {
        self.gate().await?;
        Ok(self.document(collection, id))
    }

    async fn query(
        &self,
        collection: &str,
        filters: &[FieldFilter],
        order: Option<&SortSpec>,
    ) -> Result<Vec<Value>> {
        self.gate().await?;
        let mut documents: Vec<Value> = self
            .collections
            .lock()
            .unwrap()
            .get(collection)
            .map(|docs| docs.iter().map(|(_, doc)| doc.clone()).collect())
            .unwrap_or_default();
        documents.retain(|doc| document_matches(doc, filters));
        if let Some(order) = order {
            documents.sort_by(|a, b| order_documents(a, b, order));
        }
        Ok(documents)
    }

    async fn update(&self, collection: &str, id: &str, patch: Value) -> Result<()> {
        self.gate().await?;
        let mut collections = self.collections.lock().unwrap();
        let docs = collections
            .get_mut(collection)
            .ok_or_else(|| Error::remote_not_found(id))?;
        let Some((_, doc)) = docs.iter_mut().find(|(doc_id, _)| doc_id == id) else {
            return Err(Error::remote_not_found(id));
        };
        if let (Some(target), Some(fields)) = (doc.as_object_mut(), patch.as_object()) {
            for (key, value) in fields {
                target.insert(key.clone(), value.clone());
            }
        }
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<()> {
        self.gate().await?;
        let mut collections = self.collections.lock().unwrap();
        let docs = collections
            .get_mut(collection)
            .ok_or_else(|| Error::remote_not_found(id))?;
        let before = docs.len();
        docs.retain(|(doc_id, _)| doc_id != id);
        if docs.len() == before {
            return Err(Error::remote_not_found(id));
        }
        Ok(())
    }
}
