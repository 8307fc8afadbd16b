//! Engine tests over the in-memory store fakes.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;

use crate::errors::Error;
use crate::store::{FieldFilter, LocalStore, RemoteStore, SortSpec};
use crate::testing::{MemoryLocalStore, MockRemoteStore};
use crate::water::{WaterIntake, WaterIntakePatch};

use super::{
    ConnectivityPolicy, PendingMutation, RecordId, RepositoryConfig, SyncRecord,
    SyncingRepository,
};

fn repository(
    remote: Arc<MockRemoteStore>,
    connectivity: ConnectivityPolicy,
) -> SyncingRepository<WaterIntake> {
    SyncingRepository::open(Arc::new(MemoryLocalStore::default()), remote, connectivity)
}

fn entry(amount_ml: u32, date: &str, time: i64) -> WaterIntake {
    WaterIntake::new("user-1", amount_ml, date, time)
}

fn by_date(date: &str) -> Vec<FieldFilter> {
    vec![
        FieldFilter::eq("userId", json!("user-1")),
        FieldFilter::eq("date", json!(date)),
    ]
}

#[tokio::test]
async fn offline_create_is_immediately_readable() {
    let remote = Arc::new(MockRemoteStore::default());
    let connectivity = ConnectivityPolicy::new();
    connectivity.set_offline(true);
    let mut repo = repository(Arc::clone(&remote), connectivity);

    let created = repo.create(entry(250, "2024-06-01", 100)).await.unwrap();
    assert!(created.id.is_local());

    let read = repo.read(&by_date("2024-06-01"), None).await;
    assert_eq!(read.len(), 1);
    assert_eq!(read[0].amount_ml, 250);
    assert!(read[0].id.is_local());

    assert_eq!(repo.pending_operations(), 1);
    assert_eq!(remote.call_count(), 0);
}

#[tokio::test]
async fn online_create_reconciles_the_server_id() {
    let remote = Arc::new(MockRemoteStore::default());
    let mut repo = repository(Arc::clone(&remote), ConnectivityPolicy::new());

    let created = repo.create(entry(300, "2024-06-01", 100)).await.unwrap();
    assert!(!created.id.is_local());
    assert_eq!(repo.pending_operations(), 0);

    let cached = repo.get_local(&created.id).unwrap();
    assert_eq!(cached.id, created.id);
    assert_eq!(remote.document_count(WaterIntake::COLLECTION), 1);
}

#[tokio::test]
async fn sync_pending_replays_and_reconciles() {
    let remote = Arc::new(MockRemoteStore::default());
    let connectivity = ConnectivityPolicy::new();
    connectivity.set_offline(true);
    let mut repo = repository(Arc::clone(&remote), connectivity.clone());

    let created = repo.create(entry(250, "2024-06-01", 100)).await.unwrap();
    let placeholder = created.id.clone();
    assert!(placeholder.is_local());

    connectivity.set_offline(false);
    assert_eq!(repo.sync_pending().await, 1);

    assert_eq!(repo.pending_operations(), 0);
    assert!(repo.get_local(&placeholder).is_none());

    let read = repo.read_local(&by_date("2024-06-01"), None);
    assert_eq!(read.len(), 1);
    assert!(!read[0].id.is_local());
    assert_eq!(remote.document_count(WaterIntake::COLLECTION), 1);
}

#[tokio::test]
async fn sync_pending_is_idempotent() {
    let remote = Arc::new(MockRemoteStore::default());
    let connectivity = ConnectivityPolicy::new();
    connectivity.set_offline(true);
    let mut repo = repository(Arc::clone(&remote), connectivity.clone());

    repo.create(entry(250, "2024-06-01", 100)).await.unwrap();
    connectivity.set_offline(false);
    assert_eq!(repo.sync_pending().await, 1);

    let calls_after_first_pass = remote.call_count();
    assert_eq!(repo.sync_pending().await, 0);
    assert_eq!(remote.call_count(), calls_after_first_pass);
}

#[tokio::test]
async fn create_then_delete_offline_collapses_to_nothing() {
    let remote = Arc::new(MockRemoteStore::default());
    let connectivity = ConnectivityPolicy::new();
    connectivity.set_offline(true);
    let mut repo = repository(Arc::clone(&remote), connectivity);

    let created = repo.create(entry(250, "2024-06-01", 100)).await.unwrap();
    repo.delete(&created.id).await.unwrap();

    assert!(repo.read_local(&[], None).is_empty());
    assert_eq!(repo.pending_operations(), 0);
    assert_eq!(remote.call_count(), 0);
}

#[tokio::test]
async fn offline_update_folds_into_the_pending_add() {
    let remote = Arc::new(MockRemoteStore::default());
    let connectivity = ConnectivityPolicy::new();
    connectivity.set_offline(true);
    let mut repo = repository(Arc::clone(&remote), connectivity);

    let created = repo.create(entry(250, "2024-06-01", 100)).await.unwrap();
    let updated = repo
        .update(&created.id, vec![WaterIntakePatch::AmountMl(500)])
        .await
        .unwrap();
    assert_eq!(updated.amount_ml, 500);

    assert_eq!(repo.pending_operations(), 1);
    let status = repo.status();
    assert!(status.has_unsynced_records);
    assert_eq!(status.pending_operations, 1);
    assert!(status.oldest_pending_at.is_some());
}

#[tokio::test]
async fn folded_add_replays_with_the_patched_state() {
    let remote = Arc::new(MockRemoteStore::default());
    let connectivity = ConnectivityPolicy::new();
    connectivity.set_offline(true);
    let mut repo = repository(Arc::clone(&remote), connectivity.clone());

    let created = repo.create(entry(250, "2024-06-01", 100)).await.unwrap();
    repo.update(&created.id, vec![WaterIntakePatch::AmountMl(500)])
        .await
        .unwrap();

    connectivity.set_offline(false);
    assert_eq!(repo.sync_pending().await, 1);

    let synced = repo.read_local(&by_date("2024-06-01"), None);
    assert_eq!(synced.len(), 1);
    let doc = remote
        .document(WaterIntake::COLLECTION, synced[0].id.as_str())
        .unwrap();
    assert_eq!(doc["amountMl"], json!(500));
}

#[tokio::test]
async fn read_falls_back_to_the_local_filter_on_outage() {
    let remote = Arc::new(MockRemoteStore::default());
    let connectivity = ConnectivityPolicy::new();
    connectivity.set_offline(true);
    let mut repo = repository(Arc::clone(&remote), connectivity.clone());

    repo.create(entry(200, "2024-06-01", 300)).await.unwrap();
    repo.create(entry(100, "2024-06-01", 100)).await.unwrap();
    repo.create(entry(400, "2024-06-02", 50)).await.unwrap();

    connectivity.set_offline(false);
    remote.set_unavailable(true);

    let read = repo
        .read(&by_date("2024-06-01"), Some(&SortSpec::asc("time")))
        .await;
    assert!(remote.call_count() > 0);
    let times: Vec<i64> = read.iter().map(|e| e.time).collect();
    assert_eq!(times, vec![100, 300]);
}

#[tokio::test]
async fn update_of_an_unknown_id_is_a_hard_error() {
    let remote = Arc::new(MockRemoteStore::default());
    let mut repo = repository(Arc::clone(&remote), ConnectivityPolicy::new());

    let missing = RecordId::remote("nonexistent");
    let result = repo
        .update(&missing, vec![WaterIntakePatch::AmountMl(500)])
        .await;
    assert!(matches!(result, Err(Error::NotFoundLocally(_))));
    assert_eq!(repo.pending_operations(), 0);
    assert_eq!(remote.call_count(), 0);
}

#[tokio::test]
async fn delete_of_an_unknown_id_is_a_hard_error() {
    let remote = Arc::new(MockRemoteStore::default());
    let mut repo = repository(Arc::clone(&remote), ConnectivityPolicy::new());

    let missing = RecordId::remote("nonexistent");
    assert!(matches!(
        repo.delete(&missing).await,
        Err(Error::NotFoundLocally(_))
    ));
}

#[tokio::test]
async fn offline_update_of_a_synced_record_enqueues_and_replays() {
    let remote = Arc::new(MockRemoteStore::default());
    let connectivity = ConnectivityPolicy::new();
    let mut repo = repository(Arc::clone(&remote), connectivity.clone());

    let created = repo.create(entry(250, "2024-06-01", 100)).await.unwrap();

    connectivity.set_offline(true);
    repo.update(&created.id, vec![WaterIntakePatch::AmountMl(750)])
        .await
        .unwrap();
    assert_eq!(repo.pending_operations(), 1);

    connectivity.set_offline(false);
    assert_eq!(repo.sync_pending().await, 1);
    let doc = remote
        .document(WaterIntake::COLLECTION, created.id.as_str())
        .unwrap();
    assert_eq!(doc["amountMl"], json!(750));
}

#[tokio::test]
async fn delete_supersedes_queued_updates() {
    let remote = Arc::new(MockRemoteStore::default());
    let connectivity = ConnectivityPolicy::new();
    let mut repo = repository(Arc::clone(&remote), connectivity.clone());

    let created = repo.create(entry(250, "2024-06-01", 100)).await.unwrap();

    connectivity.set_offline(true);
    repo.update(&created.id, vec![WaterIntakePatch::AmountMl(750)])
        .await
        .unwrap();
    repo.delete(&created.id).await.unwrap();

    // The queued Update is gone; only the Delete remains.
    assert_eq!(repo.pending_operations(), 1);

    connectivity.set_offline(false);
    assert_eq!(repo.sync_pending().await, 1);
    assert_eq!(remote.document_count(WaterIntake::COLLECTION), 0);
}

#[tokio::test]
async fn failed_replay_stays_queued_without_blocking_the_rest() {
    let remote = Arc::new(MockRemoteStore::default());
    let connectivity = ConnectivityPolicy::new();
    let mut repo = repository(Arc::clone(&remote), connectivity.clone());

    // A synced record whose document later disappears server-side makes its
    // queued Update permanently unreplayable.
    let synced = repo.create(entry(250, "2024-06-01", 100)).await.unwrap();
    connectivity.set_offline(true);
    repo.update(&synced.id, vec![WaterIntakePatch::AmountMl(750)])
        .await
        .unwrap();
    repo.create(entry(300, "2024-06-02", 100)).await.unwrap();
    remote.evict_document(WaterIntake::COLLECTION, synced.id.as_str());

    connectivity.set_offline(false);
    assert_eq!(repo.sync_pending().await, 1);
    assert_eq!(repo.pending_operations(), 1);

    let leftover = repo.status();
    assert_eq!(leftover.pending_operations, 1);
}

#[tokio::test]
async fn replayed_delete_of_a_missing_document_counts_as_done() {
    let remote = Arc::new(MockRemoteStore::default());
    let connectivity = ConnectivityPolicy::new();
    let mut repo = repository(Arc::clone(&remote), connectivity.clone());

    let created = repo.create(entry(250, "2024-06-01", 100)).await.unwrap();
    remote.evict_document(WaterIntake::COLLECTION, created.id.as_str());

    connectivity.set_offline(true);
    repo.delete(&created.id).await.unwrap();

    connectivity.set_offline(false);
    assert_eq!(repo.sync_pending().await, 1);
    assert_eq!(repo.pending_operations(), 0);
}

#[tokio::test(start_paused = true)]
async fn slow_remote_calls_fall_back_to_the_outbox() {
    let remote = Arc::new(MockRemoteStore::default());
    remote.set_delay_ms(60_000);
    let mut repo = SyncingRepository::with_config(
        Arc::new(MemoryLocalStore::default()),
        Arc::clone(&remote) as Arc<dyn RemoteStore>,
        ConnectivityPolicy::new(),
        RepositoryConfig {
            remote_timeout: Duration::from_millis(50),
        },
    );

    let created = repo.create(entry(250, "2024-06-01", 100)).await.unwrap();
    assert!(created.id.is_local());
    assert_eq!(repo.pending_operations(), 1);
}

#[tokio::test]
async fn online_read_merges_remote_documents_into_the_cache() {
    let remote = Arc::new(MockRemoteStore::default());
    let connectivity = ConnectivityPolicy::new();
    let mut repo = repository(Arc::clone(&remote), connectivity.clone());

    let created = repo.create(entry(250, "2024-06-01", 100)).await.unwrap();

    // Another read path bumps the remote copy; the next read refreshes the
    // cache with it.
    remote
        .update(
            WaterIntake::COLLECTION,
            created.id.as_str(),
            json!({ "amountMl": 999 }),
        )
        .await
        .unwrap();

    let read = repo.read(&by_date("2024-06-01"), None).await;
    assert_eq!(read[0].amount_ml, 999);

    connectivity.set_offline(true);
    let cached = repo.read(&by_date("2024-06-01"), None).await;
    assert_eq!(cached[0].amount_ml, 999);
}

#[tokio::test]
async fn fetch_by_id_prefers_the_remote_copy() {
    let remote = Arc::new(MockRemoteStore::default());
    let connectivity = ConnectivityPolicy::new();
    let mut repo = repository(Arc::clone(&remote), connectivity.clone());

    let created = repo.create(entry(250, "2024-06-01", 100)).await.unwrap();
    remote
        .update(
            WaterIntake::COLLECTION,
            created.id.as_str(),
            json!({ "amountMl": 400 }),
        )
        .await
        .unwrap();

    let fetched = repo.fetch_by_id(&created.id).await.unwrap();
    assert_eq!(fetched.amount_ml, 400);

    connectivity.set_offline(true);
    let cached = repo.fetch_by_id(&created.id).await.unwrap();
    assert_eq!(cached.amount_ml, 400);
}

#[tokio::test]
async fn corrupt_outbox_slot_reads_as_empty() {
    let slot = super::OutboxQueue::<WaterIntake>::slot_name(WaterIntake::COLLECTION);
    let local = MemoryLocalStore::seed(&slot, "{{ not an outbox");
    let remote = Arc::new(MockRemoteStore::default());
    let mut repo: SyncingRepository<WaterIntake> =
        SyncingRepository::open(local, Arc::clone(&remote) as Arc<dyn RemoteStore>, ConnectivityPolicy::new());

    assert_eq!(repo.pending_operations(), 0);
    let created = repo.create(entry(250, "2024-06-01", 100)).await.unwrap();
    assert!(!created.id.is_local());
}

#[tokio::test]
async fn pending_operations_survive_a_reopen() {
    let local: Arc<MemoryLocalStore> = Arc::new(MemoryLocalStore::default());
    let remote = Arc::new(MockRemoteStore::default());
    let connectivity = ConnectivityPolicy::new();
    connectivity.set_offline(true);

    let created = {
        let mut repo: SyncingRepository<WaterIntake> = SyncingRepository::open(
            Arc::clone(&local) as Arc<dyn LocalStore>,
            Arc::clone(&remote) as Arc<dyn RemoteStore>,
            connectivity.clone(),
        );
        repo.create(entry(250, "2024-06-01", 100)).await.unwrap()
    };

    let mut reopened: SyncingRepository<WaterIntake> = SyncingRepository::open(
        local,
        Arc::clone(&remote) as Arc<dyn RemoteStore>,
        connectivity.clone(),
    );
    assert_eq!(reopened.pending_operations(), 1);
    let snapshot = reopened.status();
    assert!(snapshot.has_unsynced_records);

    connectivity.set_offline(false);
    assert_eq!(reopened.sync_pending().await, 1);
    assert!(reopened.get_local(&created.id).is_none());
    assert_eq!(remote.document_count(WaterIntake::COLLECTION), 1);
}

#[test]
fn pending_operation_roundtrips_through_serde() {
    let op = super::PendingOperation::<WaterIntake>::new(PendingMutation::Update {
        id: RecordId::remote("srv-9"),
        patches: vec![WaterIntakePatch::AmountMl(300), WaterIntakePatch::Time(42)],
    });

    let encoded = serde_json::to_string(&op).unwrap();
    let decoded: super::PendingOperation<WaterIntake> = serde_json::from_str(&encoded).unwrap();
    assert_eq!(decoded.op_id, op.op_id);
    assert_eq!(decoded.target_id(), &RecordId::remote("srv-9"));
    assert!(matches!(
        decoded.mutation,
        PendingMutation::Update { ref patches, .. } if patches.len() == 2
    ));
}
