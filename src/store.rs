//! Entry store: the reactive, always-ordered view over persisted mood entries.
//!
//! Mutations run on the blocking pool. Each committed mutation re-reads the
//! table under the same lock and publishes the result on a `watch` channel,
//! which doubles as the last-value cache for new subscribers.

use std::sync::{Arc, Mutex};
use thiserror::Error;
use tokio::sync::watch;

use crate::database::{DatabaseError, MoodRepository};
use crate::models::MoodEntry;

/// An immutable listing of every stored entry, newest first
pub type Snapshot = Arc<Vec<MoodEntry>>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Storage failure: {0}")]
    StorageFailure(#[from] DatabaseError),
    #[error("Storage lock poisoned")]
    Poisoned,
    #[error("Storage task failed: {0}")]
    TaskFailed(String),
}

struct Inner {
    repository: Mutex<Box<dyn MoodRepository>>,
    listing: watch::Sender<Snapshot>,
}

/// Cheaply cloneable handle to the entry store
#[derive(Clone)]
pub struct EntryStore {
    inner: Arc<Inner>,
}

impl EntryStore {
    /// Wrap a repository, loading its current contents as the first snapshot
    pub fn new<R: MoodRepository>(repository: R) -> Result<Self, StoreError> {
        let initial = repository.list_all()?;
        let (listing, _) = watch::channel(Arc::new(initial));
        Ok(Self {
            inner: Arc::new(Inner {
                repository: Mutex::new(Box::new(repository)),
                listing,
            }),
        })
    }

    /// Insert one entry; the listing emits once the row is committed
    pub async fn insert(&self, entry: MoodEntry) -> Result<(), StoreError> {
        let timestamp = entry.timestamp;
        self.mutate(move |repository| repository.insert(&entry).map(|()| true))
            .await?;
        tracing::debug!(timestamp, "mood entry inserted");
        Ok(())
    }

    /// Delete the entry with this timestamp; absent entries are a silent no-op
    pub async fn delete(&self, entry: MoodEntry) -> Result<(), StoreError> {
        let timestamp = entry.timestamp;
        let removed = self
            .mutate(move |repository| repository.delete(&entry).map(|n| n > 0))
            .await?;
        tracing::debug!(timestamp, removed, "mood entry delete applied");
        Ok(())
    }

    /// Subscribe to the live listing
    ///
    /// The first `next()` resolves immediately with the current snapshot.
    pub fn observe_all(&self) -> Listing {
        let mut rx = self.inner.listing.subscribe();
        rx.mark_changed();
        Listing { rx }
    }

    /// Current snapshot, without subscribing
    pub fn snapshot(&self) -> Snapshot {
        self.inner.listing.borrow().clone()
    }

    /// Run a mutation on the blocking pool
    /// `op` returns whether any row changed; only then is a new snapshot published
    async fn mutate<F>(&self, op: F) -> Result<bool, StoreError>
    where
        F: FnOnce(&dyn MoodRepository) -> Result<bool, DatabaseError> + Send + 'static,
    {
        let inner = Arc::clone(&self.inner);
        tokio::task::spawn_blocking(move || -> Result<bool, StoreError> {
            let repository = inner.repository.lock().map_err(|_| StoreError::Poisoned)?;
            let changed = op(&**repository)?;
            if changed {
                // Publish while still holding the lock so emissions follow commit order
                let entries = repository.list_all()?;
                inner.listing.send_replace(Arc::new(entries));
            }
            Ok(changed)
        })
        .await
        .map_err(|e| StoreError::TaskFailed(e.to_string()))?
    }
}

/// A live, ordered view of the store's contents
pub struct Listing {
    rx: watch::Receiver<Snapshot>,
}

impl Listing {
    /// Wait for the next snapshot
    /// Returns `None` once every `EntryStore` handle has been dropped.
    pub async fn next(&mut self) -> Option<Snapshot> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }

    /// Latest snapshot seen by this listing, without waiting
    pub fn current(&self) -> Snapshot {
        self.rx.borrow().clone()
    }
}
