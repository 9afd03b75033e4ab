use clap::{Parser, Subcommand};
use std::sync::Arc;
use thiserror::Error;

use crate::controller::EntryStamper;
use crate::models::{Mood, UnknownMood};
use crate::store::{EntryStore, StoreError};
use crate::utils::SystemClock;

#[derive(Parser)]
#[command(name = "moodlog")]
#[command(about = "Log how you feel and look back at it - a small terminal mood tracker")]
#[command(version)]
pub struct Cli {
    /// Custom config file path
    #[arg(short, long)]
    pub config: Option<String>,

    /// Use development mode (uses separate dev config/database)
    #[arg(long)]
    pub dev: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Launch interactive TUI (default if no subcommand)
    Tui,
    /// Log a mood right now
    Log {
        /// One of: Happy, Calm, Neutral, Sad, Anxious
        mood: String,
    },
    /// Print logged moods, newest first
    History {
        /// Only show this many entries
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },
    /// Delete the entry logged at this timestamp (milliseconds since epoch)
    Delete {
        timestamp: i64,
    },
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Store error: {0}")]
    StoreError(#[from] StoreError),
    #[error("{0} (expected one of: {1})")]
    UnknownMood(UnknownMood, String),
    #[error("No entry with timestamp {0}")]
    NotFound(i64),
}

fn palette_names() -> String {
    Mood::ALL.iter().map(|m| m.label()).collect::<Vec<_>>().join(", ")
}

/// Handle the log command
pub async fn handle_log(mood: &str, store: &EntryStore, timestamp_format: &str) -> Result<(), CliError> {
    let mood: Mood = mood
        .parse()
        .map_err(|e| CliError::UnknownMood(e, palette_names()))?;

    let stamper = EntryStamper::for_store(store, Arc::new(SystemClock), timestamp_format);
    let entry = stamper.stamp(mood);
    store.insert(entry.clone()).await?;

    println!("Logged {} {} at {} (ID: {})", mood, mood.glyph(), entry.timestamp_formatted, entry.timestamp);
    Ok(())
}

/// Render history lines, newest first
pub fn format_history(store: &EntryStore, limit: Option<usize>) -> Vec<String> {
    let snapshot = store.snapshot();
    snapshot
        .iter()
        .take(limit.unwrap_or(usize::MAX))
        .map(|entry| {
            let glyph = entry.mood_kind().map(Mood::glyph).unwrap_or("?");
            format!("{:>13}  {}  {:<8} {}", entry.timestamp, glyph, entry.mood, entry.timestamp_formatted)
        })
        .collect()
}

/// Handle the history command
pub fn handle_history(store: &EntryStore, limit: Option<usize>) -> Result<(), CliError> {
    let lines = format_history(store, limit);
    if lines.is_empty() {
        println!("No moods logged yet");
    }
    for line in lines {
        println!("{}", line);
    }
    Ok(())
}

/// Handle the delete command
pub async fn handle_delete(timestamp: i64, store: &EntryStore) -> Result<(), CliError> {
    let entry = store
        .snapshot()
        .iter()
        .find(|entry| entry.timestamp == timestamp)
        .cloned()
        .ok_or(CliError::NotFound(timestamp))?;

    store.delete(entry.clone()).await?;
    println!("Deleted {} from {}", entry.mood, entry.timestamp_formatted);
    Ok(())
}
