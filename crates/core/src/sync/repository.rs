//! Offline-first syncing repository: local-first writes, best-effort remote
//! calls, outbox replay.

use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, warn};
use serde_json::Value;

use crate::errors::{Error, Result};
use crate::store::{
    document_matches, order_documents, read_records, write_records, FieldFilter, LocalStore,
    RemoteStore, SortSpec,
};

use super::connectivity::ConnectivityPolicy;
use super::model::{
    merge_patch_document, PendingMutation, PendingOperation, RecordId, SyncRecord, SyncStatus,
};
use super::outbox::OutboxQueue;

/// Tuning knobs shared by every repository instance.
#[derive(Debug, Clone)]
pub struct RepositoryConfig {
    /// Upper bound for one remote call; expiry falls through to the offline
    /// path so an unreachable network never hangs a caller.
    pub remote_timeout: Duration,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            remote_timeout: Duration::from_secs(5),
        }
    }
}

/// Orchestrates LocalStore, RemoteStore and the outbox for one entity type.
///
/// All mutating operations take `&mut self`: one writer per repository
/// instance, cooperative suspension only. The local write always precedes
/// the remote attempt, so an abandoned remote call leaves a record pending,
/// never lost.
pub struct SyncingRepository<R: SyncRecord> {
    local: Arc<dyn LocalStore>,
    remote: Arc<dyn RemoteStore>,
    connectivity: ConnectivityPolicy,
    outbox: OutboxQueue<R>,
    records_slot: String,
    remote_timeout: Duration,
}

impl<R: SyncRecord> SyncingRepository<R> {
    pub fn open(
        local: Arc<dyn LocalStore>,
        remote: Arc<dyn RemoteStore>,
        connectivity: ConnectivityPolicy,
    ) -> Self {
        Self::with_config(local, remote, connectivity, RepositoryConfig::default())
    }

    pub fn with_config(
        local: Arc<dyn LocalStore>,
        remote: Arc<dyn RemoteStore>,
        connectivity: ConnectivityPolicy,
        config: RepositoryConfig,
    ) -> Self {
        let outbox = OutboxQueue::open(Arc::clone(&local));
        Self {
            local,
            remote,
            connectivity,
            outbox,
            records_slot: R::COLLECTION.to_string(),
            remote_timeout: config.remote_timeout,
        }
    }

    /// Create a record, local-first.
    ///
    /// Ok iff the local write succeeded; the returned record carries the
    /// final id. A failed or skipped remote add leaves the record pending
    /// under its placeholder id.
    pub async fn create(&mut self, mut record: R) -> Result<R> {
        if record.id().as_str().is_empty() {
            record.set_id(RecordId::mint_local());
        }

        let mut cache = self.load_cache();
        cache.retain(|existing| existing.id() != record.id());
        cache.push(record.clone());
        self.store_cache(&cache)?;

        if self.connectivity.is_offline() {
            self.outbox.enqueue(PendingMutation::Add {
                record: record.clone(),
            })?;
            return Ok(record);
        }

        let document = serde_json::to_value(&record)?;
        match self.bounded(self.remote.add(R::COLLECTION, document)).await {
            Ok(assigned) => {
                let placeholder = record.id().clone();
                let server_id = RecordId::remote(assigned);
                self.reconcile_id(&placeholder, &server_id)?;
                record.set_id(server_id);
                Ok(record)
            }
            Err(err) if err.is_soft() => {
                debug!("{}: create falling back to outbox: {}", R::COLLECTION, err);
                self.outbox.enqueue(PendingMutation::Add {
                    record: record.clone(),
                })?;
                Ok(record)
            }
            Err(err) => Err(err),
        }
    }

    /// Query records, remote-first with local fallback. Never fails; the
    /// worst case is a possibly stale local view.
    pub async fn read(&mut self, filters: &[FieldFilter], order: Option<&SortSpec>) -> Vec<R> {
        if !self.connectivity.is_offline() {
            match self
                .bounded(self.remote.query(R::COLLECTION, filters, order))
                .await
            {
                Ok(documents) => return self.merge_remote_documents(documents),
                Err(err) => {
                    debug!(
                        "{}: remote query failed, using local cache: {}",
                        R::COLLECTION,
                        err
                    );
                }
            }
        }
        self.read_local(filters, order)
    }

    /// Filter and sort the local cache with the equivalent predicate.
    pub fn read_local(&self, filters: &[FieldFilter], order: Option<&SortSpec>) -> Vec<R> {
        let mut decorated: Vec<(Value, R)> = self
            .load_cache()
            .into_iter()
            .filter_map(|record| serde_json::to_value(&record).ok().map(|doc| (doc, record)))
            .filter(|(doc, _)| document_matches(doc, filters))
            .collect();
        if let Some(order) = order {
            decorated.sort_by(|(a, _), (b, _)| order_documents(a, b, order));
        }
        decorated.into_iter().map(|(_, record)| record).collect()
    }

    /// Fetch one record by id, remote-first with local fallback.
    pub async fn fetch_by_id(&mut self, id: &RecordId) -> Option<R> {
        if !id.is_local() && !self.connectivity.is_offline() {
            match self.bounded(self.remote.get(R::COLLECTION, id.as_str())).await {
                Ok(Some(document)) => {
                    return self.merge_remote_documents(vec![document]).pop();
                }
                Ok(None) => {}
                Err(err) => {
                    debug!(
                        "{}: remote get failed, using local cache: {}",
                        R::COLLECTION,
                        err
                    );
                }
            }
        }
        self.get_local(id)
    }

    /// Single record from the local cache.
    pub fn get_local(&self, id: &RecordId) -> Option<R> {
        self.load_cache()
            .into_iter()
            .find(|record| record.id() == id)
    }

    /// Patch a record, local-first. `NotFoundLocally` is the one hard
    /// failure: there is nothing to update.
    pub async fn update(&mut self, id: &RecordId, patches: Vec<R::Patch>) -> Result<R> {
        let mut cache = self.load_cache();
        let Some(record) = cache.iter_mut().find(|record| record.id() == id) else {
            return Err(Error::not_found_locally(id.to_string()));
        };
        record.apply_patches(&patches);
        let updated = record.clone();
        self.store_cache(&cache)?;

        if id.is_local() {
            // Not yet synced: the pending Add must carry the final state,
            // a separate Update could replay ahead of it.
            if !self.outbox.fold_into_add(id, &patches)? {
                self.outbox.enqueue(PendingMutation::Add {
                    record: updated.clone(),
                })?;
            }
            return Ok(updated);
        }

        if self.connectivity.is_offline() {
            self.outbox.enqueue(PendingMutation::Update {
                id: id.clone(),
                patches,
            })?;
            return Ok(updated);
        }

        let patch_document = merge_patch_document(&patches);
        match self
            .bounded(self.remote.update(R::COLLECTION, id.as_str(), patch_document))
            .await
        {
            Ok(()) => Ok(updated),
            Err(err) if err.is_soft() => {
                debug!("{}: update falling back to outbox: {}", R::COLLECTION, err);
                self.outbox.enqueue(PendingMutation::Update {
                    id: id.clone(),
                    patches,
                })?;
                Ok(updated)
            }
            Err(err) => Err(err),
        }
    }

    /// Remove a record, local-first. Queued operations superseded by the
    /// delete are dropped; a never-synced record issues no remote call.
    pub async fn delete(&mut self, id: &RecordId) -> Result<()> {
        let mut cache = self.load_cache();
        let before = cache.len();
        cache.retain(|record| record.id() != id);
        if cache.len() == before {
            return Err(Error::not_found_locally(id.to_string()));
        }
        self.store_cache(&cache)?;

        let had_pending_add = self.outbox.remove_superseded_by_delete(id)?;

        if id.is_local() {
            if had_pending_add {
                debug!("{}: collapsed unsynced add of {}", R::COLLECTION, id);
            }
            return Ok(());
        }

        if self.connectivity.is_offline() {
            self.outbox
                .enqueue(PendingMutation::Delete { id: id.clone() })?;
            return Ok(());
        }

        match self.bounded(self.remote.delete(R::COLLECTION, id.as_str())).await {
            Ok(()) => Ok(()),
            // Already gone remotely; nothing left to replay.
            Err(Error::RemoteNotFound(_)) => Ok(()),
            Err(err) if err.is_soft() => {
                debug!("{}: delete falling back to outbox: {}", R::COLLECTION, err);
                self.outbox
                    .enqueue(PendingMutation::Delete { id: id.clone() })?;
                Ok(())
            }
            Err(err) => Err(err),
        }
    }

    /// Replay the outbox against the remote store in queue order.
    ///
    /// Failed replays stay queued for a later pass, so one bad operation
    /// never blocks the rest. Returns the number successfully replayed;
    /// 0 without any remote call when offline or the queue is empty.
    pub async fn sync_pending(&mut self) -> usize {
        if self.connectivity.is_offline() || self.outbox.is_empty() {
            return 0;
        }

        let snapshot = self.outbox.snapshot();
        let mut completed = HashSet::new();
        for op in snapshot {
            match self.replay(&op).await {
                Ok(()) => {
                    completed.insert(op.op_id.clone());
                }
                Err(err) => {
                    warn!(
                        "{}: replay of {} targeting {} skipped: {}",
                        R::COLLECTION,
                        op.op_id,
                        op.target_id(),
                        err
                    );
                }
            }
        }

        let replayed = completed.len();
        if let Err(err) = self.outbox.remove_completed(&completed) {
            warn!("{}: outbox trim not persisted: {}", R::COLLECTION, err);
        }
        if replayed > 0 {
            debug!("{}: replayed {} pending operation(s)", R::COLLECTION, replayed);
        }
        replayed
    }

    /// Number of operations waiting for replay.
    pub fn pending_operations(&self) -> usize {
        self.outbox.len()
    }

    /// Backlog snapshot for an "operating offline" indicator.
    pub fn status(&self) -> SyncStatus {
        SyncStatus {
            pending_operations: self.outbox.len(),
            oldest_pending_at: self.outbox.oldest_created_at().map(str::to_string),
            has_unsynced_records: self
                .load_cache()
                .iter()
                .any(|record| record.id().is_local()),
        }
    }

    async fn replay(&mut self, op: &PendingOperation<R>) -> Result<()> {
        match &op.mutation {
            PendingMutation::Add { record } => {
                let document = serde_json::to_value(record)?;
                let assigned = self.bounded(self.remote.add(R::COLLECTION, document)).await?;
                self.reconcile_id(record.id(), &RecordId::remote(assigned))
            }
            PendingMutation::Update { id, patches } => {
                let patch_document = merge_patch_document(patches);
                self.bounded(self.remote.update(R::COLLECTION, id.as_str(), patch_document))
                    .await
            }
            PendingMutation::Delete { id } => {
                match self.bounded(self.remote.delete(R::COLLECTION, id.as_str())).await {
                    Ok(()) | Err(Error::RemoteNotFound(_)) => Ok(()),
                    Err(err) => Err(err),
                }
            }
        }
    }

    /// Rewrite a record's id after the remote store assigned one.
    ///
    /// Runs before any other operation can observe the old id: updates to
    /// placeholder records fold into their pending Add and deletes cancel
    /// it, so the outbox never references a placeholder from a later entry.
    fn reconcile_id(&mut self, old: &RecordId, new: &RecordId) -> Result<()> {
        let mut cache = self.load_cache();
        let mut changed = false;
        for record in cache.iter_mut() {
            if record.id() == old {
                record.set_id(new.clone());
                changed = true;
            }
        }
        if changed {
            self.store_cache(&cache)?;
        }
        Ok(())
    }

    fn merge_remote_documents(&mut self, documents: Vec<Value>) -> Vec<R> {
        let mut fetched = Vec::with_capacity(documents.len());
        for document in documents {
            match serde_json::from_value::<R>(document) {
                Ok(record) => fetched.push(record),
                Err(err) => warn!(
                    "{}: skipping undecodable remote document: {}",
                    R::COLLECTION,
                    err
                ),
            }
        }

        let mut cache = self.load_cache();
        for record in &fetched {
            match cache.iter_mut().find(|existing| existing.id() == record.id()) {
                Some(existing) => *existing = record.clone(),
                None => cache.push(record.clone()),
            }
        }
        if let Err(err) = self.store_cache(&cache) {
            warn!("{}: cache refresh not persisted: {}", R::COLLECTION, err);
        }
        fetched
    }

    async fn bounded<T>(&self, call: impl Future<Output = Result<T>>) -> Result<T> {
        match tokio::time::timeout(self.remote_timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(Error::Timeout),
        }
    }

    fn load_cache(&self) -> Vec<R> {
        read_records(self.local.as_ref(), &self.records_slot)
    }

    fn store_cache(&self, records: &[R]) -> Result<()> {
        write_records(self.local.as_ref(), &self.records_slot, records)
    }
}
