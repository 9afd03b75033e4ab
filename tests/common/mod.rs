#![allow(dead_code)]

use moodlog::database::DatabaseError;
use moodlog::store::{Listing, Snapshot};
use moodlog::utils::Clock;
use moodlog::{Database, EntryStore, Mood, MoodEntry, MoodRepository};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::time::Duration;

/// Clock that only moves when told to
#[derive(Clone, Default)]
pub struct ManualClock(Arc<AtomicI64>);

impl ManualClock {
    pub fn at(millis: i64) -> Self {
        Self(Arc::new(AtomicI64::new(millis)))
    }

    pub fn set(&self, millis: i64) {
        self.0.store(millis, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> i64 {
        self.0.load(Ordering::SeqCst)
    }
}

/// In-memory database whose writes can be switched to fail
pub struct FlakyRepository {
    db: Database,
    failing: Arc<AtomicBool>,
}

impl FlakyRepository {
    pub fn new() -> (Self, Arc<AtomicBool>) {
        let failing = Arc::new(AtomicBool::new(false));
        let repository = Self {
            db: Database::open_in_memory().expect("in-memory database"),
            failing: Arc::clone(&failing),
        };
        (repository, failing)
    }

    fn check(&self) -> Result<(), DatabaseError> {
        if self.failing.load(Ordering::SeqCst) {
            let full = rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_FULL);
            return Err(DatabaseError::SqliteError(rusqlite::Error::SqliteFailure(
                full,
                Some("disk full".to_string()),
            )));
        }
        Ok(())
    }
}

impl MoodRepository for FlakyRepository {
    fn insert(&self, entry: &MoodEntry) -> Result<(), DatabaseError> {
        self.check()?;
        self.db.insert_mood(entry)
    }

    fn delete(&self, entry: &MoodEntry) -> Result<usize, DatabaseError> {
        self.check()?;
        self.db.delete_mood(entry)
    }

    fn list_all(&self) -> Result<Vec<MoodEntry>, DatabaseError> {
        self.db.get_all_moods()
    }
}

pub fn memory_store() -> EntryStore {
    EntryStore::new(Database::open_in_memory().expect("in-memory database")).expect("store")
}

pub fn entry(timestamp: i64, mood: Mood) -> MoodEntry {
    MoodEntry::new(timestamp, mood, "%d %b %Y, %I:%M %p")
}

pub fn timestamps(snapshot: &Snapshot) -> Vec<i64> {
    snapshot.iter().map(|e| e.timestamp).collect()
}

/// Next listing emission, failing the test if none arrives promptly
pub async fn next_snapshot(listing: &mut Listing) -> Snapshot {
    tokio::time::timeout(Duration::from_secs(2), listing.next())
        .await
        .expect("listing did not emit in time")
        .expect("store dropped")
}
