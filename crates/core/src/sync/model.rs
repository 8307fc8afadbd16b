//! Sync domain model: tagged record ids, record/patch contracts, and the
//! pending operations the outbox replays.

use std::fmt;

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

/// Wire prefix marking a locally minted placeholder id.
///
/// The prefix exists only inside the serde codec so persisted caches stay
/// readable; everything else branches on the enum. Server-assigned ids never
/// start with it.
const LOCAL_ID_PREFIX: &str = "local_";

/// Record identifier tagged by origin.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RecordId {
    /// Minted on this device; the record is not yet confirmed remotely.
    Local(String),
    /// Assigned by the remote store.
    Remote(String),
}

impl RecordId {
    /// Mint a fresh local placeholder id.
    pub fn mint_local() -> Self {
        Self::Local(Uuid::new_v4().to_string())
    }

    pub fn remote(id: impl Into<String>) -> Self {
        Self::Remote(id.into())
    }

    pub fn is_local(&self) -> bool {
        matches!(self, Self::Local(_))
    }

    /// Raw id without the origin tag.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Local(id) | Self::Remote(id) => id,
        }
    }

    fn to_wire(&self) -> String {
        match self {
            Self::Local(id) => format!("{LOCAL_ID_PREFIX}{id}"),
            Self::Remote(id) => id.clone(),
        }
    }

    fn from_wire(raw: &str) -> Self {
        match raw.strip_prefix(LOCAL_ID_PREFIX) {
            Some(id) => Self::Local(id.to_string()),
            None => Self::Remote(raw.to_string()),
        }
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_wire())
    }
}

impl Serialize for RecordId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_wire())
    }
}

impl<'de> Deserialize<'de> for RecordId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::from_wire(&raw))
    }
}

/// One typed field mutation of a record.
pub trait RecordPatch:
    Clone + fmt::Debug + Send + Sync + Serialize + DeserializeOwned + 'static
{
    /// Remote document field this patch writes.
    fn field_name(&self) -> &'static str;

    /// Value written into that field.
    fn field_value(&self) -> serde_json::Value;
}

/// Merge a patch list into the flat document sent to the remote store.
/// Later patches win per field.
pub fn merge_patch_document<P: RecordPatch>(patches: &[P]) -> serde_json::Value {
    let mut fields = serde_json::Map::new();
    for patch in patches {
        fields.insert(patch.field_name().to_string(), patch.field_value());
    }
    serde_json::Value::Object(fields)
}

/// Contract every syncable entity record fulfils.
pub trait SyncRecord:
    Clone + fmt::Debug + Send + Sync + Serialize + DeserializeOwned + 'static
{
    type Patch: RecordPatch;

    /// Remote collection name; local slot names derive from it.
    const COLLECTION: &'static str;

    fn id(&self) -> &RecordId;
    fn set_id(&mut self, id: RecordId);
    fn owner_id(&self) -> &str;

    /// Fold one field patch into the record.
    fn apply_patch(&mut self, patch: &Self::Patch);

    fn apply_patches(&mut self, patches: &[Self::Patch]) {
        for patch in patches {
            self.apply_patch(patch);
        }
    }
}

/// A mutation captured locally that is not yet confirmed remotely.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", bound = "R: SyncRecord")]
pub struct PendingOperation<R: SyncRecord> {
    pub op_id: String,
    pub created_at: String,
    #[serde(flatten)]
    pub mutation: PendingMutation<R>,
}

/// The three mutation kinds the outbox replays.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind", bound = "R: SyncRecord")]
pub enum PendingMutation<R: SyncRecord> {
    Add { record: R },
    Update { id: RecordId, patches: Vec<R::Patch> },
    Delete { id: RecordId },
}

impl<R: SyncRecord> PendingOperation<R> {
    pub fn new(mutation: PendingMutation<R>) -> Self {
        Self {
            op_id: Uuid::new_v4().to_string(),
            created_at: Utc::now().to_rfc3339(),
            mutation,
        }
    }

    /// Id of the record this operation targets.
    pub fn target_id(&self) -> &RecordId {
        match &self.mutation {
            PendingMutation::Add { record } => record.id(),
            PendingMutation::Update { id, .. } | PendingMutation::Delete { id } => id,
        }
    }
}

/// Snapshot of a repository's sync backlog, the "operating offline"
/// indicator surfaced to the UI layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncStatus {
    pub pending_operations: usize,
    pub oldest_pending_at: Option<String>,
    pub has_unsynced_records: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_id_keeps_wire_prefix() {
        let id = RecordId::Local("abc".to_string());
        let encoded = serde_json::to_string(&id).unwrap();
        assert_eq!(encoded, "\"local_abc\"");

        let decoded: RecordId = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, id);
        assert!(decoded.is_local());
        assert_eq!(decoded.as_str(), "abc");
    }

    #[test]
    fn remote_id_is_the_raw_server_string() {
        let decoded: RecordId = serde_json::from_str("\"srv-17\"").unwrap();
        assert_eq!(decoded, RecordId::remote("srv-17"));
        assert!(!decoded.is_local());
    }

    #[test]
    fn minted_ids_are_unique() {
        assert_ne!(RecordId::mint_local(), RecordId::mint_local());
    }
}
