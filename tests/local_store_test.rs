//! Local store durability and bookkeeping across process restarts

mod common;

use common::{session, temp_engine};
use pretty_assertions::assert_eq;
use syncpad::local_db::LocalStore;
use syncpad::types::TodoPatch;

#[tokio::test]
async fn records_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("local.db");

    {
        let store = LocalStore::open(&path).await.unwrap();
        let id = store.create("durable").await.unwrap();
        store.update(id, &TodoPatch::done(true)).await.unwrap();
    }

    let store = LocalStore::open(&path).await.unwrap();
    let records = store.list_all().await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].text, "durable");
    assert!(records[0].done);
}

#[tokio::test]
async fn tombstones_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("local.db");

    {
        let store = LocalStore::open(&path).await.unwrap();
        let id = store.create("to delete").await.unwrap();
        let mut record = store.get(id).await.unwrap().unwrap();
        record.remote_id = Some("r-9".to_string());
        store.replace_identity(id, &record).await.unwrap();
        store.delete(id).await.unwrap();
    }

    // The pending remote delete must not be lost with the process
    let store = LocalStore::open(&path).await.unwrap();
    let tombstones = store.pending_tombstones().await.unwrap();
    assert_eq!(tombstones.len(), 1);
    assert_eq!(tombstones[0].remote_id, "r-9");
}

#[tokio::test]
async fn local_ids_stay_monotonic_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("local.db");

    let highest = {
        let store = LocalStore::open(&path).await.unwrap();
        store.create("a").await.unwrap();
        let second = store.create("b").await.unwrap();
        store.delete(second).await.unwrap();
        second
    };

    let store = LocalStore::open(&path).await.unwrap();
    let next = store.create("c").await.unwrap();
    assert!(next > highest);
}

#[tokio::test]
async fn stats_track_pending_work() {
    let (_dir, _remote, engine) = temp_engine().await;
    let store = engine.store().clone();

    store.create("one").await.unwrap();
    store.create("two").await.unwrap();

    let stats = store.stats().await.unwrap();
    assert_eq!(stats.total, 2);
    assert_eq!(stats.pending_push, 2);
    assert_eq!(stats.pending_delete, 0);

    engine.reconcile(&session()).await.unwrap();
    let stats = store.stats().await.unwrap();
    assert_eq!(stats.pending_push, 0);

    let first = store.list_all().await.unwrap()[0].local_id;
    store.delete(first).await.unwrap();
    let stats = store.stats().await.unwrap();
    assert_eq!(stats.total, 1);
    assert_eq!(stats.pending_delete, 1);
}
