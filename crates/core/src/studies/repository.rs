//! Offline-first repository for saved medical studies.

use std::sync::Arc;

use serde_json::json;

use crate::errors::Result;
use crate::store::{FieldFilter, LocalStore, RemoteStore, SortSpec};
use crate::sync::{ConnectivityPolicy, RecordId, SyncStatus, SyncingRepository};

use super::model::{MedicalStudy, MedicalStudyPatch};

pub struct MedicalStudyRepository {
    inner: SyncingRepository<MedicalStudy>,
}

impl MedicalStudyRepository {
    pub fn new(
        local: Arc<dyn LocalStore>,
        remote: Arc<dyn RemoteStore>,
        connectivity: ConnectivityPolicy,
    ) -> Self {
        Self {
            inner: SyncingRepository::open(local, remote, connectivity),
        }
    }

    pub async fn save_study(&mut self, study: MedicalStudy) -> Result<MedicalStudy> {
        self.inner.create(study).await
    }

    /// A user's bookmarks, newest first.
    pub async fn studies_for_user(&mut self, user_id: &str) -> Vec<MedicalStudy> {
        self.inner
            .read(
                &[FieldFilter::eq("userId", json!(user_id))],
                Some(&SortSpec::desc("savedAt")),
            )
            .await
    }

    pub async fn update_study(
        &mut self,
        id: &RecordId,
        patches: Vec<MedicalStudyPatch>,
    ) -> Result<MedicalStudy> {
        self.inner.update(id, patches).await
    }

    pub async fn delete_study(&mut self, id: &RecordId) -> Result<()> {
        self.inner.delete(id).await
    }

    pub async fn sync_pending(&mut self) -> usize {
        self.inner.sync_pending().await
    }

    pub fn status(&self) -> SyncStatus {
        self.inner.status()
    }
}
