mod common;

use common::{FlakyRepository, ManualClock, entry, memory_store, timestamps};
use moodlog::controller::{ControllerError, ControllerSettings, UiStateSubscription};
use moodlog::{EntryStore, Mood, MoodController, UiState};
use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;

fn settings(grace_period: Duration) -> ControllerSettings {
    ControllerSettings {
        grace_period,
        ..ControllerSettings::default()
    }
}

fn controller_at(store: EntryStore, clock: &ManualClock) -> MoodController {
    MoodController::with_clock(store, settings(Duration::from_secs(5)), Arc::new(clock.clone())).unwrap()
}

/// Wait until the published state satisfies `done`
async fn wait_for(subscription: &mut UiStateSubscription, done: impl Fn(&UiState) -> bool) -> UiState {
    let current = subscription.current();
    if done(&current) {
        return current;
    }
    tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            let state = subscription.changed().await.expect("controller dropped");
            if done(&state) {
                return state;
            }
        }
    })
    .await
    .expect("state never reached the expected shape")
}

#[tokio::test]
async fn selecting_a_mood_logs_it_now() {
    let controller = MoodController::new(memory_store(), ControllerSettings::default()).unwrap();
    let mut subscription = controller.subscribe();

    let before = chrono::Utc::now().timestamp_millis();
    controller.handle_mood_selected("Happy").unwrap();
    let state = wait_for(&mut subscription, |s| s.mood_history.len() == 1).await;
    let after = chrono::Utc::now().timestamp_millis();

    let logged = &state.mood_history[0];
    assert_eq!(logged.mood, "Happy");
    assert!(logged.timestamp >= before && logged.timestamp <= after);
    assert!(!logged.timestamp_formatted.is_empty());
    assert_eq!(state.available_moods, &Mood::ALL);
    assert!(state.error.is_none());
}

#[tokio::test]
async fn later_entries_are_listed_first() {
    let clock = ManualClock::at(100);
    let controller = controller_at(memory_store(), &clock);
    let mut subscription = controller.subscribe();

    controller.handle_mood_selected("Calm").unwrap().await.unwrap();
    clock.set(200);
    controller.handle_mood_selected("Sad").unwrap().await.unwrap();

    let state = wait_for(&mut subscription, |s| s.mood_history.len() == 2).await;
    assert_eq!(timestamps(&state.mood_history), vec![200, 100]);
    assert_eq!(state.mood_history[0].mood, "Sad");
}

#[tokio::test]
async fn deleting_the_only_entry_empties_history() {
    let controller = MoodController::new(memory_store(), ControllerSettings::default()).unwrap();
    let mut subscription = controller.subscribe();

    controller.handle_mood_selected("Neutral").unwrap();
    let state = wait_for(&mut subscription, |s| s.mood_history.len() == 1).await;

    controller.handle_mood_deleted(state.mood_history[0].clone());
    let state = wait_for(&mut subscription, |s| s.mood_history.is_empty()).await;
    assert!(state.error.is_none());
}

#[tokio::test]
async fn two_selections_in_one_millisecond_both_survive() {
    let clock = ManualClock::at(1_000);
    let controller = controller_at(memory_store(), &clock);
    let mut subscription = controller.subscribe();

    let first = controller.handle_mood_selected("Happy").unwrap();
    let second = controller.handle_mood_selected("Anxious").unwrap();
    first.await.unwrap();
    second.await.unwrap();

    let state = wait_for(&mut subscription, |s| s.mood_history.len() == 2).await;
    assert_eq!(timestamps(&state.mood_history), vec![1_001, 1_000]);
    assert!(state.error.is_none());
}

#[tokio::test]
async fn new_entries_stamp_after_existing_ones() {
    let store = memory_store();
    store.insert(entry(5_000, Mood::Calm)).await.unwrap();

    let clock = ManualClock::at(1_000);
    let controller = controller_at(store, &clock);
    let mut subscription = controller.subscribe();

    controller.handle_mood_selected("Happy").unwrap().await.unwrap();
    let state = wait_for(&mut subscription, |s| s.mood_history.len() == 2).await;
    assert_eq!(timestamps(&state.mood_history), vec![5_001, 5_000]);
}

#[tokio::test]
async fn unknown_labels_are_rejected_before_touching_storage() {
    let store = memory_store();
    let controller = MoodController::new(store.clone(), ControllerSettings::default()).unwrap();

    let err = controller.handle_mood_selected("Ecstatic").err().unwrap();
    assert!(matches!(err, ControllerError::UnknownMood(_)));
    assert!(controller.handle_mood_selected("").is_err());

    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(store.snapshot().is_empty());
    assert!(controller.state().error.is_none());
}

#[tokio::test]
async fn palette_labels_with_glyphs_are_accepted() {
    let controller = MoodController::new(memory_store(), ControllerSettings::default()).unwrap();
    let mut subscription = controller.subscribe();

    controller.handle_mood_selected("Happy 😊").unwrap().await.unwrap();
    let state = wait_for(&mut subscription, |s| s.mood_history.len() == 1).await;
    assert_eq!(state.mood_history[0].mood, "Happy");
}

#[tokio::test]
async fn storage_failures_surface_in_state_until_a_success() {
    let (repository, failing) = FlakyRepository::new();
    let controller = MoodController::new(EntryStore::new(repository).unwrap(), ControllerSettings::default()).unwrap();
    let mut subscription = controller.subscribe();

    failing.store(true, Ordering::SeqCst);
    controller.handle_mood_selected("Sad").unwrap().await.unwrap();
    let state = wait_for(&mut subscription, |s| s.error.is_some()).await;
    assert!(state.error.as_deref().unwrap_or_default().contains("disk full"));
    assert!(state.mood_history.is_empty());

    failing.store(false, Ordering::SeqCst);
    controller.handle_mood_selected("Calm").unwrap().await.unwrap();
    let state = wait_for(&mut subscription, |s| s.error.is_none() && s.mood_history.len() == 1).await;
    assert_eq!(state.mood_history[0].mood, "Calm");
}

#[tokio::test]
async fn failed_delete_keeps_the_entry_and_can_be_dismissed() {
    let (repository, failing) = FlakyRepository::new();
    let controller = MoodController::new(EntryStore::new(repository).unwrap(), ControllerSettings::default()).unwrap();
    let mut subscription = controller.subscribe();

    controller.handle_mood_selected("Happy").unwrap().await.unwrap();
    let state = wait_for(&mut subscription, |s| s.mood_history.len() == 1).await;

    failing.store(true, Ordering::SeqCst);
    controller.handle_mood_deleted(state.mood_history[0].clone()).await.unwrap();
    let state = wait_for(&mut subscription, |s| s.error.is_some()).await;
    assert_eq!(state.mood_history.len(), 1);

    controller.dismiss_error();
    assert!(controller.state().error.is_none());
}

#[tokio::test]
async fn deleting_an_unknown_entry_reports_nothing() {
    let controller = MoodController::new(memory_store(), ControllerSettings::default()).unwrap();
    let subscription = controller.subscribe();

    controller.handle_mood_deleted(entry(42, Mood::Sad)).await.unwrap();
    assert!(controller.state().error.is_none());
    assert!(subscription.current().mood_history.is_empty());
}

/// Wait on the real clock until the bridge has released the listing
async fn wait_until_released(controller: &MoodController) {
    tokio::time::timeout(Duration::from_secs(2), async {
        while controller.is_connected() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("listing was never released");
}

#[tokio::test(start_paused = true)]
async fn listing_is_released_only_after_the_grace_period() {
    let controller = MoodController::new(memory_store(), settings(Duration::from_secs(1))).unwrap();
    assert!(!controller.is_connected());

    let subscription = controller.subscribe();
    assert!(controller.is_connected());
    drop(subscription);

    tokio::time::sleep(Duration::from_millis(500)).await;
    assert!(controller.is_connected());

    tokio::time::sleep(Duration::from_millis(1_000)).await;
    assert!(!controller.is_connected());
}

#[tokio::test(start_paused = true)]
async fn resubscribing_within_the_grace_period_keeps_the_listing() {
    let controller = MoodController::new(memory_store(), settings(Duration::from_secs(1))).unwrap();

    drop(controller.subscribe());
    tokio::time::sleep(Duration::from_millis(200)).await;
    let _subscription = controller.subscribe();

    tokio::time::sleep(Duration::from_secs(5)).await;
    assert!(controller.is_connected());
}

#[tokio::test(start_paused = true)]
async fn grace_period_restarts_from_the_latest_leave() {
    let controller = MoodController::new(memory_store(), settings(Duration::from_millis(400))).unwrap();

    drop(controller.subscribe());
    tokio::time::sleep(Duration::from_millis(300)).await;
    let returning = controller.subscribe();
    tokio::time::sleep(Duration::from_millis(50)).await;
    drop(returning);

    // 450ms after the first leave, but only 100ms after the last one
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(controller.is_connected());

    tokio::time::sleep(Duration::from_millis(400)).await;
    assert!(!controller.is_connected());
}

#[tokio::test(start_paused = true)]
async fn repeated_short_visits_never_drop_the_listing() {
    let controller = MoodController::new(memory_store(), settings(Duration::from_millis(400))).unwrap();

    for _ in 0..10 {
        let visit = controller.subscribe();
        tokio::time::sleep(Duration::from_millis(50)).await;
        drop(visit);
        tokio::time::sleep(Duration::from_millis(300)).await;
        assert!(controller.is_connected());
    }
}

#[tokio::test]
async fn resubscribing_after_release_sees_entries_written_meanwhile() {
    let store = memory_store();
    let controller = MoodController::new(store.clone(), settings(Duration::from_millis(20))).unwrap();

    drop(controller.subscribe());
    wait_until_released(&controller).await;

    store.insert(entry(700, Mood::Anxious)).await.unwrap();

    let mut subscription = controller.subscribe();
    assert!(controller.is_connected());
    let first = subscription.changed().await.unwrap();
    assert_eq!(timestamps(&first.mood_history), vec![700]);

    store.insert(entry(800, Mood::Happy)).await.unwrap();
    let state = wait_for(&mut subscription, |s| s.mood_history.len() == 2).await;
    assert_eq!(timestamps(&state.mood_history), vec![800, 700]);
}

#[tokio::test]
async fn state_includes_stored_history_before_anyone_subscribes() {
    let store = memory_store();
    store.insert(entry(100, Mood::Calm)).await.unwrap();
    store.insert(entry(200, Mood::Sad)).await.unwrap();

    let controller = MoodController::new(store, ControllerSettings::default()).unwrap();
    assert!(!controller.is_connected());
    assert_eq!(timestamps(&controller.state().mood_history), vec![200, 100]);
}

#[tokio::test]
async fn every_subscriber_starts_from_current_state() {
    let store = memory_store();
    store.insert(entry(300, Mood::Neutral)).await.unwrap();
    let controller = MoodController::new(store, ControllerSettings::default()).unwrap();

    let _first = controller.subscribe();
    let mut second = controller.subscribe();
    let state = tokio::time::timeout(Duration::from_millis(100), second.changed())
        .await
        .expect("first read must be immediate")
        .unwrap();
    assert_eq!(timestamps(&state.mood_history), vec![300]);
}
