//! Offline-first sync engine: tagged record ids, the persisted outbox, the
//! connectivity gate, and the syncing repository orchestrating the local and
//! remote stores.

mod connectivity;
mod model;
mod outbox;
mod repository;

pub use connectivity::ConnectivityPolicy;
pub use model::{
    merge_patch_document, PendingMutation, PendingOperation, RecordId, RecordPatch, SyncRecord,
    SyncStatus,
};
pub use outbox::OutboxQueue;
pub use repository::{RepositoryConfig, SyncingRepository};

#[cfg(test)]
mod tests;
