//! Application state controller.
//!
//! Owns the `UiState` the view renders. While anyone is subscribed, a bridge
//! task follows the entry store's listing and republishes each snapshot as a
//! fresh `UiState`. When the last subscriber leaves, the bridge lingers for a
//! grace period before releasing the listing, so quick unsubscribe/resubscribe
//! cycles (a redraw, a suspended terminal) don't churn the upstream.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use thiserror::Error;
use tokio::runtime::Handle;
use tokio::sync::{Notify, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::models::{DEFAULT_TIMESTAMP_FORMAT, Mood, MoodEntry, UnknownMood};
use crate::store::{EntryStore, Snapshot, StoreError};
use crate::utils::{Clock, SystemClock};

/// Default time the upstream listing survives without subscribers
pub const DEFAULT_GRACE_PERIOD: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum ControllerError {
    #[error(transparent)]
    UnknownMood(#[from] UnknownMood),
    #[error("No async runtime available: {0}")]
    NoRuntime(String),
}

/// What the view renders. Replaced wholesale on every update.
#[derive(Debug, Clone, PartialEq)]
pub struct UiState {
    pub mood_history: Snapshot,
    pub available_moods: &'static [Mood],
    /// One-line notice for the last failed storage operation
    pub error: Option<String>,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            mood_history: Arc::new(Vec::new()),
            available_moods: &Mood::ALL,
            error: None,
        }
    }
}

impl UiState {
    fn with_history(&self, mood_history: Snapshot) -> Self {
        Self {
            mood_history,
            available_moods: self.available_moods,
            error: self.error.clone(),
        }
    }

    fn with_error(&self, error: Option<String>) -> Self {
        Self {
            mood_history: Arc::clone(&self.mood_history),
            available_moods: self.available_moods,
            error,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ControllerSettings {
    pub grace_period: Duration,
    pub timestamp_format: String,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            grace_period: DEFAULT_GRACE_PERIOD,
            timestamp_format: DEFAULT_TIMESTAMP_FORMAT.to_string(),
        }
    }
}

/// Builds entries with timestamps that never repeat within a process
///
/// Each stamp is `max(now, previous + 1)`, so two selections in the same
/// millisecond both survive with distinct identities.
pub struct EntryStamper {
    clock: Arc<dyn Clock>,
    last: AtomicI64,
    format: String,
}

impl EntryStamper {
    /// `floor` is the newest timestamp already stored, if any
    pub fn new(clock: Arc<dyn Clock>, format: impl Into<String>, floor: Option<i64>) -> Self {
        Self {
            clock,
            last: AtomicI64::new(floor.unwrap_or(0)),
            format: format.into(),
        }
    }

    /// Seed from the store's newest entry
    pub fn for_store(store: &EntryStore, clock: Arc<dyn Clock>, format: impl Into<String>) -> Self {
        let newest = store.snapshot().first().map(|entry| entry.timestamp);
        Self::new(clock, format, newest)
    }

    pub fn stamp(&self, mood: Mood) -> MoodEntry {
        let now = self.clock.now_millis();
        let previous = self
            .last
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| Some(now.max(last + 1)))
            .unwrap_or_else(|last| last);
        MoodEntry::new(now.max(previous + 1), mood, &self.format)
    }
}

struct Shared {
    store: EntryStore,
    state: watch::Sender<UiState>,
    bridge: Mutex<Option<JoinHandle<()>>>,
    /// Signalled when a subscriber arrives while the bridge may be idle
    rejoined: Notify,
    grace_period: Duration,
}

impl Shared {
    fn bridge_slot(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        // The slot only holds a task handle; a panic elsewhere can't leave it inconsistent
        self.bridge.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn publish_history(&self, history: Snapshot) {
        self.state.send_if_modified(|current| {
            if Arc::ptr_eq(&current.mood_history, &history) {
                return false;
            }
            *current = current.with_history(history);
            true
        });
    }

    fn report(&self, action: &str, result: Result<(), StoreError>) {
        match result {
            Ok(()) => {
                self.state.send_if_modified(|current| {
                    if current.error.is_none() {
                        return false;
                    }
                    *current = current.with_error(None);
                    true
                });
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to {}", action);
                let notice = format!("Failed to {}: {}", action, e);
                self.state.send_modify(|current| *current = current.with_error(Some(notice)));
            }
        }
    }
}

pub struct MoodController {
    shared: Arc<Shared>,
    stamper: EntryStamper,
    runtime: Handle,
}

impl MoodController {
    /// Create a controller on the current tokio runtime, using the system clock
    pub fn new(store: EntryStore, settings: ControllerSettings) -> Result<Self, ControllerError> {
        Self::with_clock(store, settings, Arc::new(SystemClock))
    }

    pub fn with_clock(
        store: EntryStore,
        settings: ControllerSettings,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, ControllerError> {
        let runtime = Handle::try_current().map_err(|e| ControllerError::NoRuntime(e.to_string()))?;
        let stamper = EntryStamper::for_store(&store, clock, settings.timestamp_format);
        let (state, _) = watch::channel(UiState::default().with_history(store.snapshot()));

        Ok(Self {
            shared: Arc::new(Shared {
                store,
                state,
                bridge: Mutex::new(None),
                rejoined: Notify::new(),
                grace_period: settings.grace_period,
            }),
            stamper,
            runtime,
        })
    }

    /// Subscribe to UI state
    ///
    /// The first read yields the current state. Re-establishes the upstream
    /// listing if it was released, refreshing the history before returning.
    pub fn subscribe(&self) -> UiStateSubscription {
        let mut bridge = self.shared.bridge_slot();
        let was_unobserved = self.shared.state.receiver_count() == 0;
        let mut rx = self.shared.state.subscribe();
        if bridge.as_ref().is_none_or(|handle| handle.is_finished()) {
            self.shared.publish_history(self.shared.store.snapshot());
            *bridge = Some(self.runtime.spawn(run_bridge(Arc::clone(&self.shared))));
            tracing::debug!("entry listing bridge started");
        } else if was_unobserved {
            // The bridge may be counting down; the next leave starts a fresh window
            self.shared.rejoined.notify_one();
        }
        rx.mark_changed();
        UiStateSubscription { rx }
    }

    /// Current UI state
    pub fn state(&self) -> UiState {
        self.shared.state.borrow().clone()
    }

    /// Whether the upstream listing is currently followed
    pub fn is_connected(&self) -> bool {
        self.shared
            .bridge_slot()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Log a mood now
    ///
    /// Labels outside the palette are rejected before anything is dispatched.
    /// The insert runs in the background; the returned handle may be dropped.
    pub fn handle_mood_selected(&self, label: &str) -> Result<JoinHandle<()>, ControllerError> {
        let mood: Mood = label.parse()?;
        let entry = self.stamper.stamp(mood);
        tracing::info!(mood = %mood, timestamp = entry.timestamp, "logging mood");

        let shared = Arc::clone(&self.shared);
        Ok(self.runtime.spawn(async move {
            let result = shared.store.insert(entry).await;
            shared.report("save mood", result);
        }))
    }

    /// Delete an entry in the background
    pub fn handle_mood_deleted(&self, entry: MoodEntry) -> JoinHandle<()> {
        tracing::info!(timestamp = entry.timestamp, "deleting mood entry");

        let shared = Arc::clone(&self.shared);
        self.runtime.spawn(async move {
            let result = shared.store.delete(entry).await;
            shared.report("delete mood", result);
        })
    }

    /// Clear the storage-failure notice
    pub fn dismiss_error(&self) {
        self.shared.state.send_if_modified(|current| {
            if current.error.is_none() {
                return false;
            }
            *current = current.with_error(None);
            true
        });
    }
}

impl Drop for MoodController {
    fn drop(&mut self) {
        if let Some(handle) = self.shared.bridge_slot().take() {
            handle.abort();
        }
    }
}

/// Follow the store listing until nobody has been subscribed for a full grace period
async fn run_bridge(shared: Arc<Shared>) {
    let mut listing = shared.store.observe_all();
    let mut idle_since: Option<Instant> = None;

    loop {
        let deadline = idle_since.map(|since| since + shared.grace_period);
        tokio::select! {
            snapshot = listing.next() => match snapshot {
                Some(snapshot) => shared.publish_history(snapshot),
                None => break,
            },
            _ = shared.state.closed(), if idle_since.is_none() => {
                tracing::debug!(grace_ms = shared.grace_period.as_millis() as u64, "last ui subscriber left");
                idle_since = Some(Instant::now());
            }
            _ = shared.rejoined.notified(), if idle_since.is_some() => {
                tracing::debug!("ui subscriber returned within grace period");
                idle_since = None;
            }
            _ = tokio::time::sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                // Decide under the slot lock so a concurrent subscribe either sees us running or finds the slot empty
                let released = {
                    let mut bridge = shared.bridge_slot();
                    let idle = shared.state.receiver_count() == 0;
                    if idle {
                        bridge.take();
                    }
                    idle
                };
                if released {
                    tracing::debug!("entry listing bridge released");
                    return;
                }
                idle_since = None;
            }
        }
    }
}

/// A view's handle on UI state
pub struct UiStateSubscription {
    rx: watch::Receiver<UiState>,
}

impl UiStateSubscription {
    /// Wait for the next state; `None` once the controller is gone
    pub async fn changed(&mut self) -> Option<UiState> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }

    /// Non-blocking check for a new state, for a render loop
    pub fn poll(&mut self) -> Option<UiState> {
        match self.rx.has_changed() {
            Ok(true) => Some(self.rx.borrow_and_update().clone()),
            _ => None,
        }
    }

    pub fn current(&self) -> UiState {
        self.rx.borrow().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedClock(i64);

    impl Clock for FixedClock {
        fn now_millis(&self) -> i64 {
            self.0
        }
    }

    #[test]
    fn stamper_breaks_ties_within_one_millisecond() {
        let stamper = EntryStamper::new(Arc::new(FixedClock(1_000)), "%H:%M", None);
        let first = stamper.stamp(Mood::Happy);
        let second = stamper.stamp(Mood::Sad);
        assert_eq!(first.timestamp, 1_000);
        assert_eq!(second.timestamp, 1_001);
    }

    #[test]
    fn stamper_never_goes_below_stored_entries() {
        let stamper = EntryStamper::new(Arc::new(FixedClock(500)), "%H:%M", Some(900));
        assert_eq!(stamper.stamp(Mood::Calm).timestamp, 901);
    }

    #[test]
    fn controller_requires_a_runtime() {
        let store = EntryStore::new(crate::database::Database::open_in_memory().unwrap()).unwrap();
        let err = MoodController::new(store, ControllerSettings::default()).err().unwrap();
        assert!(matches!(err, ControllerError::NoRuntime(_)));
    }

    #[test]
    fn state_updates_replace_every_field() {
        let state = UiState::default();
        let failed = state.with_error(Some("disk full".to_string()));
        assert_eq!(failed.available_moods, &Mood::ALL);
        assert!(failed.mood_history.is_empty());

        let history = Arc::new(vec![MoodEntry::new(1, Mood::Happy, "%H")]);
        let next = failed.with_history(Arc::clone(&history));
        assert_eq!(next.error.as_deref(), Some("disk full"));
        assert!(Arc::ptr_eq(&next.mood_history, &history));
    }
}
