pub mod cli;
pub mod config;
pub mod controller;
pub mod database;
pub mod logging;
pub mod models;
pub mod store;
pub mod tui;
pub mod utils;

pub use config::Config;
pub use controller::{MoodController, UiState};
pub use database::{Database, MoodRepository};
pub use models::{Mood, MoodEntry};
pub use store::EntryStore;
pub use utils::Profile;
