//! Persisted outbox of pending mutations.

use std::collections::HashSet;
use std::sync::Arc;

use log::debug;

use crate::errors::Result;
use crate::store::{read_records, write_records, LocalStore};

use super::model::{PendingMutation, PendingOperation, RecordId, SyncRecord};

/// Ordered queue of mutations not yet confirmed against the remote store.
///
/// Entries replay in insertion order. The queue is loaded once at open and
/// written back after every change; a corrupt slot reads as empty.
pub struct OutboxQueue<R: SyncRecord> {
    store: Arc<dyn LocalStore>,
    slot: String,
    entries: Vec<PendingOperation<R>>,
}

impl<R: SyncRecord> OutboxQueue<R> {
    /// Slot holding the serialized queue for a collection.
    pub fn slot_name(collection: &str) -> String {
        format!("{collection}.outbox")
    }

    pub fn open(store: Arc<dyn LocalStore>) -> Self {
        let slot = Self::slot_name(R::COLLECTION);
        let entries = read_records(store.as_ref(), &slot);
        Self {
            store,
            slot,
            entries,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Creation time of the oldest queued operation.
    pub fn oldest_created_at(&self) -> Option<&str> {
        self.entries.first().map(|op| op.created_at.as_str())
    }

    /// Current queue contents in replay order.
    pub fn snapshot(&self) -> Vec<PendingOperation<R>> {
        self.entries.clone()
    }

    pub fn enqueue(&mut self, mutation: PendingMutation<R>) -> Result<()> {
        let op = PendingOperation::new(mutation);
        debug!(
            "outbox {}: queued {} targeting {}",
            self.slot,
            op.op_id,
            op.target_id()
        );
        self.entries.push(op);
        self.persist()
    }

    /// Drop every operation whose id is in `completed`.
    pub fn remove_completed(&mut self, completed: &HashSet<String>) -> Result<()> {
        if completed.is_empty() {
            return Ok(());
        }
        self.entries.retain(|op| !completed.contains(&op.op_id));
        self.persist()
    }

    /// Fold patches into the still-pending Add of `id`, so the eventual
    /// replay carries the final state instead of racing its own Update.
    /// Returns whether a pending Add was found.
    pub fn fold_into_add(&mut self, id: &RecordId, patches: &[R::Patch]) -> Result<bool> {
        let index = self.entries.iter().position(|op| {
            matches!(&op.mutation, PendingMutation::Add { record } if record.id() == id)
        });
        let Some(index) = index else {
            return Ok(false);
        };
        if let PendingMutation::Add { record } = &mut self.entries[index].mutation {
            record.apply_patches(patches);
        }
        self.persist()?;
        Ok(true)
    }

    /// Remove queued Adds and Updates superseded by a delete of `id`.
    /// Returns whether a pending Add was among them (the record never
    /// reached the remote store).
    pub fn remove_superseded_by_delete(&mut self, id: &RecordId) -> Result<bool> {
        let mut had_add = false;
        let before = self.entries.len();
        self.entries.retain(|op| match &op.mutation {
            PendingMutation::Add { record } if record.id() == id => {
                had_add = true;
                false
            }
            PendingMutation::Update { id: target, .. } if target == id => false,
            _ => true,
        });
        if self.entries.len() != before {
            self.persist()?;
        }
        Ok(had_add)
    }

    fn persist(&self) -> Result<()> {
        write_records(self.store.as_ref(), &self.slot, &self.entries)
    }
}
