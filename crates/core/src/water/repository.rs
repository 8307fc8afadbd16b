//! Offline-first repository for water intake entries.

use std::sync::Arc;

use serde_json::json;

use crate::errors::Result;
use crate::store::{FieldFilter, LocalStore, RemoteStore, SortSpec};
use crate::sync::{
    ConnectivityPolicy, RecordId, RepositoryConfig, SyncStatus, SyncingRepository,
};

use super::model::{average_daily_ml, total_for_date, WaterIntake, WaterIntakePatch};

pub struct WaterIntakeRepository {
    inner: SyncingRepository<WaterIntake>,
}

impl WaterIntakeRepository {
    pub fn new(
        local: Arc<dyn LocalStore>,
        remote: Arc<dyn RemoteStore>,
        connectivity: ConnectivityPolicy,
    ) -> Self {
        Self {
            inner: SyncingRepository::open(local, remote, connectivity),
        }
    }

    pub fn with_config(
        local: Arc<dyn LocalStore>,
        remote: Arc<dyn RemoteStore>,
        connectivity: ConnectivityPolicy,
        config: RepositoryConfig,
    ) -> Self {
        Self {
            inner: SyncingRepository::with_config(local, remote, connectivity, config),
        }
    }

    /// Log a drink; read-your-write even when fully offline.
    pub async fn log_intake(&mut self, entry: WaterIntake) -> Result<WaterIntake> {
        self.inner.create(entry).await
    }

    /// A user's entries for one date, time ascending.
    pub async fn intakes_by_date(&mut self, user_id: &str, date: &str) -> Vec<WaterIntake> {
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

    /// A user's entries in an inclusive date range, date ascending.
    pub async fn intakes_between(
        &mut self,
        user_id: &str,
        from: &str,
        to: &str,
    ) -> Vec<WaterIntake> {
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

    pub async fn update_intake(
        &mut self,
        id: &RecordId,
        patches: Vec<WaterIntakePatch>,
    ) -> Result<WaterIntake> {
        self.inner.update(id, patches).await
    }

    pub async fn delete_intake(&mut self, id: &RecordId) -> Result<()> {
        self.inner.delete(id).await
    }

    /// Total millilitres a user logged on `date`.
    pub async fn total_ml_for_date(&mut self, user_id: &str, date: &str) -> u64 {
        let entries = self.intakes_by_date(user_id, date).await;
        total_for_date(&entries, date)
    }

    /// Average daily intake across the inclusive date range.
    pub async fn average_ml_between(&mut self, user_id: &str, from: &str, to: &str) -> f64 {
        let entries = self.intakes_between(user_id, from, to).await;
        average_daily_ml(&entries)
    }

    pub async fn sync_pending(&mut self) -> usize {
        self.inner.sync_pending().await
    }

    pub fn status(&self) -> SyncStatus {
        self.inner.status()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MemoryLocalStore, MockRemoteStore};

    fn repository(
        remote: Arc<MockRemoteStore>,
        connectivity: ConnectivityPolicy,
    ) -> WaterIntakeRepository {
        WaterIntakeRepository::new(Arc::new(MemoryLocalStore::default()), remote, connectivity)
    }

    #[tokio::test]
    async fn by_date_falls_back_to_local_sorted_by_time() {
        let remote = Arc::new(MockRemoteStore::default());
        let connectivity = ConnectivityPolicy::new();
        connectivity.set_offline(true);
        let mut repo = repository(Arc::clone(&remote), connectivity.clone());

        repo.log_intake(WaterIntake::new("u1", 300, "2024-06-01", 200))
            .await
            .unwrap();
        repo.log_intake(WaterIntake::new("u1", 250, "2024-06-01", 100))
            .await
            .unwrap();
        repo.log_intake(WaterIntake::new("u1", 500, "2024-06-02", 50))
            .await
            .unwrap();

        connectivity.set_offline(false);
        remote.set_unavailable(true);

        let entries = repo.intakes_by_date("u1", "2024-06-01").await;
        let times: Vec<i64> = entries.iter().map(|e| e.time).collect();
        assert_eq!(times, vec![100, 200]);
    }

    #[tokio::test]
    async fn totals_and_averages_work_fully_offline() {
        let remote = Arc::new(MockRemoteStore::default());
        let connectivity = ConnectivityPolicy::new();
        connectivity.set_offline(true);
        let mut repo = repository(remote, connectivity);

        repo.log_intake(WaterIntake::new("u1", 250, "2024-06-01", 100))
            .await
            .unwrap();
        repo.log_intake(WaterIntake::new("u1", 750, "2024-06-01", 200))
            .await
            .unwrap();
        repo.log_intake(WaterIntake::new("u1", 500, "2024-06-02", 100))
            .await
            .unwrap();

        assert_eq!(repo.total_ml_for_date("u1", "2024-06-01").await, 1000);
        let average = repo
            .average_ml_between("u1", "2024-06-01", "2024-06-02")
            .await;
        assert!((average - 750.0).abs() < f64::EPSILON);

        let status = repo.status();
        assert_eq!(status.pending_operations, 3);
        assert!(status.has_unsynced_records);
    }

    #[tokio::test]
    async fn sync_drains_the_backlog_once_online() {
        let remote = Arc::new(MockRemoteStore::default());
        let connectivity = ConnectivityPolicy::new();
        connectivity.set_offline(true);
        let mut repo = repository(Arc::clone(&remote), connectivity.clone());

        repo.log_intake(WaterIntake::new("u1", 250, "2024-06-01", 100))
            .await
            .unwrap();

        connectivity.set_offline(false);
        assert_eq!(repo.sync_pending().await, 1);
        assert_eq!(repo.status().pending_operations, 0);
        assert_eq!(remote.document_count("waterIntakes"), 1);
    }
}
