//! Offline-first repository for sleep entries.

use std::sync::Arc;

use serde_json::json;

use crate::errors::Result;
use crate::store::{FieldFilter, LocalStore, RemoteStore, SortSpec};
use crate::sync::{ConnectivityPolicy, RecordId, SyncStatus, SyncingRepository};

use super::model::{average_duration_minutes, SleepEntry, SleepEntryPatch};

pub struct SleepRepository {
    inner: SyncingRepository<SleepEntry>,
}

impl SleepRepository {
    pub fn new(
        local: Arc<dyn LocalStore>,
        remote: Arc<dyn RemoteStore>,
        connectivity: ConnectivityPolicy,
    ) -> Self {
        Self {
            inner: SyncingRepository::open(local, remote, connectivity),
        }
    }

    pub async fn log_sleep(&mut self, entry: SleepEntry) -> Result<SleepEntry> {
        self.inner.create(entry).await
    }

    /// A user's entries in an inclusive date range, date ascending.
    pub async fn entries_between(
        &mut self,
        user_id: &str,
        from: &str,
        to: &str,
    ) -> Vec<SleepEntry> {
        self.inner
            .read(
                &[
                    FieldFilter::eq("userId", json!(user_id)),
                    FieldFilter::gte("date", json!(from)),
                    FieldFilter::lte("date", json!(to)),
                ],
                Some(&SortSpec::asc("date")),
            )
            .await
    }

    pub async fn update_entry(
        &mut self,
        id: &RecordId,
        patches: Vec<SleepEntryPatch>,
    ) -> Result<SleepEntry> {
        self.inner.update(id, patches).await
    }

    pub async fn delete_entry(&mut self, id: &RecordId) -> Result<()> {
        self.inner.delete(id).await
    }

    /// Average sleep duration in minutes across the inclusive date range.
    pub async fn average_minutes_between(&mut self, user_id: &str, from: &str, to: &str) -> f64 {
        let entries = self.entries_between(user_id, from, to).await;
        average_duration_minutes(&entries)
    }

    pub async fn sync_pending(&mut self) -> usize {
        self.inner.sync_pending().await
    }

    pub fn status(&self) -> SyncStatus {
        self.inner.status()
    }
}
