use rusqlite::{Connection, ErrorCode};
use std::path::PathBuf;
use thiserror::Error;

use crate::models::MoodEntry;

#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("SQLite error: {0}")]
    SqliteError(#[from] rusqlite::Error),
    #[error("Failed to create database directory: {0}")]
    DirectoryError(String),
    #[error("An entry with timestamp {0} already exists")]
    DuplicateTimestamp(i64),
}

/// Persistence capability behind the entry store
///
/// Implementations are used from the blocking thread pool, one call at a time.
/// `list_all` must return entries ordered by timestamp, newest first.
pub trait MoodRepository: Send + 'static {
    fn insert(&self, entry: &MoodEntry) -> Result<(), DatabaseError>;

    /// Delete by timestamp; returns the number of rows removed
    fn delete(&self, entry: &MoodEntry) -> Result<usize, DatabaseError>;

    fn list_all(&self) -> Result<Vec<MoodEntry>, DatabaseError>;
}

pub struct Database {
    conn: Connection,
}

impl Database {
    /// Create a new database connection and initialize the schema
    pub fn new(path: &str) -> Result<Self, DatabaseError> {
        let db_path = PathBuf::from(path);

        // Create parent directory if it doesn't exist
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| DatabaseError::DirectoryError(e.to_string()))?;
            }
        }

        let conn = Connection::open(&db_path)?;
        let db = Database { conn };
        db.initialize_schema()?;

        Ok(db)
    }

    /// Open a private in-memory database
    pub fn open_in_memory() -> Result<Self, DatabaseError> {
        let db = Database { conn: Connection::open_in_memory()? };
        db.initialize_schema()?;
        Ok(db)
    }

    fn initialize_schema(&self) -> Result<(), DatabaseError> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS mood_entries (
                timestamp           INTEGER PRIMARY KEY NOT NULL,
                mood                TEXT NOT NULL,
                timestamp_formatted TEXT NOT NULL
            )",
            [],
        )?;
        Ok(())
    }

    /// Insert a mood entry; a clashing timestamp is rejected, never overwritten
    pub fn insert_mood(&self, entry: &MoodEntry) -> Result<(), DatabaseError> {
        self.conn
            .execute(
                "INSERT INTO mood_entries (timestamp, mood, timestamp_formatted) VALUES (?1, ?2, ?3)",
                rusqlite::params![entry.timestamp, entry.mood, entry.timestamp_formatted],
            )
            .map_err(|e| match e.sqlite_error_code() {
                Some(ErrorCode::ConstraintViolation) => DatabaseError::DuplicateTimestamp(entry.timestamp),
                _ => DatabaseError::from(e),
            })?;
        Ok(())
    }

    /// Delete the entry with this entry's timestamp; returns rows removed (0 or 1)
    pub fn delete_mood(&self, entry: &MoodEntry) -> Result<usize, DatabaseError> {
        let removed = self.conn.execute(
            "DELETE FROM mood_entries WHERE timestamp = ?1",
            rusqlite::params![entry.timestamp],
        )?;
        Ok(removed)
    }

    fn row_to_entry(row: &rusqlite::Row) -> Result<MoodEntry, rusqlite::Error> {
        Ok(MoodEntry {
            timestamp: row.get(0)?,
            mood: row.get(1)?,
            timestamp_formatted: row.get(2)?,
        })
    }

    /// Get all mood entries, newest first
    pub fn get_all_moods(&self) -> Result<Vec<MoodEntry>, DatabaseError> {
        let mut stmt = self.conn.prepare(
            "SELECT timestamp, mood, timestamp_formatted FROM mood_entries ORDER BY timestamp DESC",
        )?;
        let entries = stmt
            .query_map([], Self::row_to_entry)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }
}

#[cfg(test)]
impl Database {
    fn get_mood(&self, timestamp: i64) -> Result<Option<MoodEntry>, DatabaseError> {
        let mut stmt = self.conn.prepare(
            "SELECT timestamp, mood, timestamp_formatted FROM mood_entries WHERE timestamp = ?1",
        )?;
        let mut rows = stmt.query_map(rusqlite::params![timestamp], Self::row_to_entry)?;
        Ok(rows.next().transpose()?)
    }
}

impl MoodRepository for Database {
    fn insert(&self, entry: &MoodEntry) -> Result<(), DatabaseError> {
        self.insert_mood(entry)
    }

    fn delete(&self, entry: &MoodEntry) -> Result<usize, DatabaseError> {
        self.delete_mood(entry)
    }

    fn list_all(&self) -> Result<Vec<MoodEntry>, DatabaseError> {
        self.get_all_moods()
    }
}
