//! Offline-first repository for the user profile.

use std::sync::Arc;

use serde_json::json;

use crate::errors::Result;
use crate::store::{FieldFilter, LocalStore, RemoteStore};
use crate::sync::{ConnectivityPolicy, RecordId, SyncStatus, SyncingRepository};

use super::model::{UserProfile, UserProfilePatch};

pub struct UserProfileRepository {
    inner: SyncingRepository<UserProfile>,
}

impl UserProfileRepository {
    pub fn new(
        local: Arc<dyn LocalStore>,
        remote: Arc<dyn RemoteStore>,
        connectivity: ConnectivityPolicy,
    ) -> Self {
        Self {
            inner: SyncingRepository::open(local, remote, connectivity),
        }
    }

    pub async fn create_profile(&mut self, profile: UserProfile) -> Result<UserProfile> {
        self.inner.create(profile).await
    }

    /// The profile owned by `user_id`, if one exists on either side.
    pub async fn profile_for_user(&mut self, user_id: &str) -> Option<UserProfile> {
        self.inner
            .read(&[FieldFilter::eq("userId", json!(user_id))], None)
            .await
            .into_iter()
            .next()
    }

    /// A profile addressed by record id, remote-first.
    pub async fn profile_by_id(&mut self, id: &RecordId) -> Option<UserProfile> {
        self.inner.fetch_by_id(id).await
    }

    pub async fn update_profile(
        &mut self,
        id: &RecordId,
        patches: Vec<UserProfilePatch>,
    ) -> Result<UserProfile> {
        self.inner.update(id, patches).await
    }

    pub async fn delete_profile(&mut self, id: &RecordId) -> Result<()> {
        self.inner.delete(id).await
    }

    pub async fn sync_pending(&mut self) -> usize {
        self.inner.sync_pending().await
    }

    pub fn status(&self) -> SyncStatus {
        self.inner.status()
    }
}
