use clap::Parser;
use color_eyre::Result;
use color_eyre::eyre::eyre;
use moodlog::{Config, Database, EntryStore, MoodController, Profile, cli::{Cli, Commands}};
use std::path::Path;

fn main() -> Result<()> {
    // Set up error reporting with color-eyre
    color_eyre::install()?;

    let cli = Cli::parse();

    // --dev keeps a separate config and database
    let profile = if cli.dev { Profile::Dev } else { Profile::Prod };

    let config = match cli.config {
        Some(ref path) => Config::load_from_path(Path::new(path), profile)?,
        None => Config::load_with_profile(profile)?,
    };

    let db_path = config.get_database_path();
    if let Some(data_dir) = moodlog::utils::get_data_dir(profile) {
        moodlog::logging::init_logging(&config, &data_dir);
    }
    tracing::info!(database = %db_path.display(), ?profile, "starting moodlog");

    let db = Database::new(
        db_path.to_str()
            .ok_or_else(|| eyre!("Database path contains invalid UTF-8"))?,
    )?;
    let store = EntryStore::new(db)?;

    // Storage runs on the runtime's workers; the terminal loop stays on this thread
    let runtime = tokio::runtime::Runtime::new()?;
    let _context = runtime.enter();

    match cli.command.unwrap_or(Commands::Tui) {
        Commands::Tui => {
            let controller = MoodController::new(store, config.controller_settings())?;
            let app = moodlog::tui::App::new(config, controller);
            moodlog::tui::run_event_loop(app)?;
        }
        Commands::Log { mood } => {
            runtime.block_on(moodlog::cli::handle_log(&mood, &store, &config.timestamp_format))?;
        }
        Commands::History { limit } => {
            moodlog::cli::handle_history(&store, limit)?;
        }
        Commands::Delete { timestamp } => {
            runtime.block_on(moodlog::cli::handle_delete(timestamp, &store))?;
        }
    }

    Ok(())
}
