//! Offline-first repository for nutrition entries.

use std::sync::Arc;

use serde_json::json;

use crate::errors::Result;
use crate::store::{FieldFilter, LocalStore, RemoteStore, SortSpec};
use crate::sync::{ConnectivityPolicy, RecordId, SyncStatus, SyncingRepository};

use super::model::{
    calories_for_date, macro_totals_for_date, MacroTotals, NutritionEntry, NutritionEntryPatch,
};

pub struct NutritionRepository {
    inner: SyncingRepository<NutritionEntry>,
}

impl NutritionRepository {
    pub fn new(
        local: Arc<dyn LocalStore>,
        remote: Arc<dyn RemoteStore>,
        connectivity: ConnectivityPolicy,
    ) -> Self {
        Self {
            inner: SyncingRepository::open(local, remote, connectivity),
        }
    }

    pub async fn log_entry(&mut self, entry: NutritionEntry) -> Result<NutritionEntry> {
        self.inner.create(entry).await
    }

    /// A user's entries for one date, time ascending.
    pub async fn entries_by_date(&mut self, user_id: &str, date: &str) -> Vec<NutritionEntry> {
        self.inner
            .read(
                &[
                    FieldFilter::eq("userId", json!(user_id)),
                    FieldFilter::eq("date", json!(date)),
                ],
                Some(&SortSpec::asc("time")),
            )
            .await
    }

    pub async fn update_entry(
        &mut self,
        id: &RecordId,
        patches: Vec<NutritionEntryPatch>,
    ) -> Result<NutritionEntry> {
        self.inner.update(id, patches).await
    }

    pub async fn delete_entry(&mut self, id: &RecordId) -> Result<()> {
        self.inner.delete(id).await
    }

    /// Calories a user logged on `date`.
    pub async fn calories_on(&mut self, user_id: &str, date: &str) -> u64 {
        let entries = self.entries_by_date(user_id, date).await;
        calories_for_date(&entries, date)
    }

    /// Macro sums a user logged on `date`.
    pub async fn macros_on(&mut self, user_id: &str, date: &str) -> MacroTotals {
        let entries = self.entries_by_date(user_id, date).await;
        macro_totals_for_date(&entries, date)
    }

    pub async fn sync_pending(&mut self) -> usize {
        self.inner.sync_pending().await
    }

    pub fn status(&self) -> SyncStatus {
        self.inner.status()
    }
}
