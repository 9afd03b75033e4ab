//! Tracing subscriber setup.
//!
//! Events go to `moodlog.log` in the profile's data directory, never to the
//! terminal, so the TUI's alternate screen stays clean. `RUST_LOG` takes
//! precedence over the configured `log_level`.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

use crate::Config;

pub const LOG_FILE_NAME: &str = "moodlog.log";

/// Install the global subscriber, appending to `<data_dir>/moodlog.log`
///
/// Logging is optional: if the directory or file can't be opened this returns
/// without installing anything. Safe to call more than once; only the first
/// call takes effect.
pub fn init_logging(config: &Config, data_dir: &Path) {
    if std::fs::create_dir_all(data_dir).is_err() {
        return;
    }

    let file = match OpenOptions::new()
        .create(true)
        .append(true)
        .open(data_dir.join(LOG_FILE_NAME))
    {
        Ok(file) => file,
        Err(_) => return,
    };

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .try_init();
}
