mod common;

use common::{entry, memory_store, next_snapshot, timestamps};
use moodlog::{Database, EntryStore, Mood};
use std::collections::HashSet;
use std::time::Duration;

#[tokio::test]
async fn fresh_subscriber_gets_current_state_without_a_mutation() {
    let db = Database::open_in_memory().unwrap();
    db.insert_mood(&entry(100, Mood::Happy)).unwrap();
    let store = EntryStore::new(db).unwrap();

    let mut listing = store.observe_all();
    let snapshot = tokio::time::timeout(Duration::from_millis(100), listing.next())
        .await
        .expect("first snapshot must be immediate")
        .unwrap();
    assert_eq!(timestamps(&snapshot), vec![100]);
}

#[tokio::test]
async fn listing_stays_sorted_newest_first() {
    let store = memory_store();
    let mut listing = store.observe_all();
    next_snapshot(&mut listing).await;

    for ts in [500, 100, 900, 300, 700] {
        store.insert(entry(ts, Mood::Calm)).await.unwrap();
        let snapshot = next_snapshot(&mut listing).await;
        let ts = timestamps(&snapshot);
        assert!(ts.windows(2).all(|pair| pair[0] > pair[1]), "not strictly descending: {ts:?}");
    }

    assert_eq!(timestamps(&store.snapshot()), vec![900, 700, 500, 300, 100]);
}

#[tokio::test]
async fn inserted_entry_appears_exactly_once() {
    let store = memory_store();
    let mut listing = store.observe_all();
    next_snapshot(&mut listing).await;

    let logged = entry(1_700_000_000_000, Mood::Anxious);
    store.insert(logged.clone()).await.unwrap();

    let snapshot = next_snapshot(&mut listing).await;
    assert_eq!(snapshot.iter().filter(|e| **e == logged).count(), 1);
}

#[tokio::test]
async fn deleting_an_absent_entry_is_a_quiet_no_op() {
    let store = memory_store();
    store.insert(entry(100, Mood::Sad)).await.unwrap();

    let mut listing = store.observe_all();
    let before = next_snapshot(&mut listing).await;

    store.delete(entry(999, Mood::Sad)).await.unwrap();

    assert!(
        tokio::time::timeout(Duration::from_millis(50), listing.next()).await.is_err(),
        "no-op delete should not emit"
    );
    assert_eq!(store.snapshot(), before);
}

#[tokio::test]
async fn insert_then_delete_restores_previous_contents() {
    let store = memory_store();
    store.insert(entry(100, Mood::Happy)).await.unwrap();
    store.insert(entry(300, Mood::Neutral)).await.unwrap();
    let before: HashSet<i64> = timestamps(&store.snapshot()).into_iter().collect();

    let temporary = entry(200, Mood::Sad);
    store.insert(temporary.clone()).await.unwrap();
    store.delete(temporary).await.unwrap();

    let after: HashSet<i64> = timestamps(&store.snapshot()).into_iter().collect();
    assert_eq!(before, after);
}

#[tokio::test]
async fn duplicate_timestamp_is_a_storage_error_and_does_not_emit() {
    let store = memory_store();
    store.insert(entry(100, Mood::Happy)).await.unwrap();

    let mut listing = store.observe_all();
    next_snapshot(&mut listing).await;

    let err = store.insert(entry(100, Mood::Sad)).await.unwrap_err();
    assert!(err.to_string().contains("already exists"));
    assert!(tokio::time::timeout(Duration::from_millis(50), listing.next()).await.is_err());
    assert_eq!(store.snapshot()[0].mood, "Happy");
}

#[tokio::test]
async fn every_subscriber_sees_every_commit() {
    let store = memory_store();
    let mut first = store.observe_all();
    let mut second = store.observe_all();
    next_snapshot(&mut first).await;
    next_snapshot(&mut second).await;

    store.insert(entry(100, Mood::Calm)).await.unwrap();

    assert_eq!(timestamps(&next_snapshot(&mut first).await), vec![100]);
    assert_eq!(timestamps(&next_snapshot(&mut second).await), vec![100]);
}

#[tokio::test]
async fn listing_ends_when_store_is_dropped() {
    let store = memory_store();
    let mut listing = store.observe_all();
    next_snapshot(&mut listing).await;

    drop(store);
    assert!(listing.next().await.is_none());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_inserts_all_land_in_order() {
    let store = memory_store();
    let tasks: Vec<_> = (1..=20)
        .map(|ts| {
            let store = store.clone();
            tokio::spawn(async move { store.insert(entry(ts * 10, Mood::Neutral)).await })
        })
        .collect();
    for task in tasks {
        task.await.unwrap().unwrap();
    }

    let expected: Vec<i64> = (1..=20).rev().map(|ts| ts * 10).collect();
    assert_eq!(timestamps(&store.snapshot()), expected);
    assert_eq!(timestamps(&store.observe_all().current()), expected);
}
