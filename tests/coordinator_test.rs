//! Single-flight and trigger-coalescing behavior of the sync coordinator

mod common;

use common::{session, temp_coordinator};
use std::sync::Arc;
use std::time::Duration;

#[tokio::test]
async fn concurrent_triggers_never_run_overlapping_passes() {
    let (_dir, remote, coordinator) = temp_coordinator().await;
    let coordinator = Arc::new(coordinator);

    coordinator.set_session(Some(session())).await.unwrap();
    coordinator.store().create("pending").await.unwrap();

    // Hold each remote call open long enough for the triggers to pile up
    remote.set_latency(Some(Duration::from_millis(100))).await;

    let a = {
        let coordinator = Arc::clone(&coordinator);
        tokio::spawn(async move { coordinator.request_sync().await })
    };
    let b = {
        let coordinator = Arc::clone(&coordinator);
        tokio::spawn(async move { coordinator.request_sync().await })
    };
    let c = {
        let coordinator = Arc::clone(&coordinator);
        tokio::spawn(async move { coordinator.request_sync().await })
    };

    a.await.unwrap().unwrap();
    b.await.unwrap().unwrap();
    c.await.unwrap().unwrap();

    // Had two passes run concurrently, both would have inserted the
    // pending record and the remote store would hold duplicates
    assert_eq!(remote.insert_count(), 1);
    assert_eq!(remote.len().await, 1);
}

#[tokio::test]
async fn trigger_during_pass_runs_one_follow_up() {
    let (_dir, remote, coordinator) = temp_coordinator().await;
    let coordinator = Arc::new(coordinator);

    coordinator.set_session(Some(session())).await.unwrap();
    coordinator.store().create("first").await.unwrap();
    remote.set_latency(Some(Duration::from_millis(100))).await;

    let long_pass = {
        let coordinator = Arc::clone(&coordinator);
        tokio::spawn(async move { coordinator.request_sync().await })
    };

    // Give the first pass time to take its snapshot, then mutate and
    // trigger again: the new record must reach the remote store through
    // the coalesced follow-up pass, not a concurrent one
    tokio::time::sleep(Duration::from_millis(30)).await;
    coordinator.store().create("second").await.unwrap();
    let coalesced = coordinator.request_sync().await.unwrap();
    assert!(coalesced.is_none());

    long_pass.await.unwrap().unwrap();

    assert_eq!(remote.len().await, 2);
    assert_eq!(remote.insert_count(), 2);
}

#[tokio::test]
async fn report_is_kept_for_inspection() {
    let (_dir, _remote, coordinator) = temp_coordinator().await;

    assert!(coordinator.last_report().await.is_none());

    coordinator.set_session(Some(session())).await.unwrap();
    coordinator.store().create("observable").await.unwrap();
    coordinator.request_sync().await.unwrap();

    let report = coordinator.last_report().await.unwrap();
    assert_eq!(report.synced_count(), 1);
}
