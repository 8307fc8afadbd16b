//! Offline-first repositories for the supplements domain.

use std::sync::Arc;

use serde_json::json;

use crate::errors::Result;
use crate::store::{FieldFilter, LocalStore, RemoteStore, SortSpec};
use crate::sync::{ConnectivityPolicy, RecordId, SyncStatus, SyncingRepository};

use super::model::{
    Supplement, SupplementBarcode, SupplementBarcodePatch, SupplementDose, SupplementDosePatch,
    SupplementPatch,
};

pub struct SupplementRepository {
    inner: SyncingRepository<Supplement>,
}

impl SupplementRepository {
    pub fn new(
        local: Arc<dyn LocalStore>,
        remote: Arc<dyn RemoteStore>,
        connectivity: ConnectivityPolicy,
    ) -> Self {
        Self {
            inner: SyncingRepository::open(local, remote, connectivity),
        }
    }

    pub async fn add_supplement(&mut self, supplement: Supplement) -> Result<Supplement> {
        self.inner.create(supplement).await
    }

    /// A user's whole catalog, name ascending.
    pub async fn supplements_for_user(&mut self, user_id: &str) -> Vec<Supplement> {
        self.inner
            .read(
                &[FieldFilter::eq("userId", json!(user_id))],
                Some(&SortSpec::asc("name")),
            )
            .await
    }

    pub async fn update_supplement(
        &mut self,
        id: &RecordId,
        patches: Vec<SupplementPatch>,
    ) -> Result<Supplement> {
        self.inner.update(id, patches).await
    }

    pub async fn delete_supplement(&mut self, id: &RecordId) -> Result<()> {
        self.inner.delete(id).await
    }

    pub async fn sync_pending(&mut self) -> usize {
        self.inner.sync_pending().await
    }

    pub fn status(&self) -> SyncStatus {
        self.inner.status()
    }
}

pub struct SupplementDoseRepository {
    inner: SyncingRepository<SupplementDose>,
}

impl SupplementDoseRepository {
    pub fn new(
        local: Arc<dyn LocalStore>,
        remote: Arc<dyn RemoteStore>,
        connectivity: ConnectivityPolicy,
    ) -> Self {
        Self {
            inner: SyncingRepository::open(local, remote, connectivity),
        }
    }

    pub async fn log_dose(&mut self, dose: SupplementDose) -> Result<SupplementDose> {
        self.inner.create(dose).await
    }

    /// A user's doses for one date, time ascending.
    pub async fn doses_by_date(&mut self, user_id: &str, date: &str) -> Vec<SupplementDose> {
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

    /// Mark a logged dose as taken.
    pub async fn mark_taken(&mut self, id: &RecordId) -> Result<SupplementDose> {
        self.inner
            .update(id, vec![SupplementDosePatch::Taken(true)])
            .await
    }

    pub async fn update_dose(
        &mut self,
        id: &RecordId,
        patches: Vec<SupplementDosePatch>,
    ) -> Result<SupplementDose> {
        self.inner.update(id, patches).await
    }

    pub async fn delete_dose(&mut self, id: &RecordId) -> Result<()> {
        self.inner.delete(id).await
    }

    pub async fn sync_pending(&mut self) -> usize {
        self.inner.sync_pending().await
    }

    pub fn status(&self) -> SyncStatus {
        self.inner.status()
    }
}

pub struct SupplementBarcodeRepository {
    inner: SyncingRepository<SupplementBarcode>,
}

impl SupplementBarcodeRepository {
    pub fn new(
        local: Arc<dyn LocalStore>,
        remote: Arc<dyn RemoteStore>,
        connectivity: ConnectivityPolicy,
    ) -> Self {
        Self {
            inner: SyncingRepository::open(local, remote, connectivity),
        }
    }

    /// Remember a scanned barcode.
    pub async fn register(&mut self, mapping: SupplementBarcode) -> Result<SupplementBarcode> {
        self.inner.create(mapping).await
    }

    /// Look a barcode up; first match wins.
    pub async fn lookup(&mut self, barcode: &str) -> Option<SupplementBarcode> {
        self.inner
            .read(&[FieldFilter::eq("barcode", json!(barcode))], None)
            .await
            .into_iter()
            .next()
    }

    pub async fn update_mapping(
        &mut self,
        id: &RecordId,
        patches: Vec<SupplementBarcodePatch>,
    ) -> Result<SupplementBarcode> {
        self.inner.update(id, patches).await
    }

    pub async fn delete_mapping(&mut self, id: &RecordId) -> Result<()> {
        self.inner.delete(id).await
    }

    pub async fn sync_pending(&mut self) -> usize {
        self.inner.sync_pending().await
    }
}
