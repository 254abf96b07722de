pub mod browser;
pub mod config;
pub mod cycle;
pub mod error;
pub mod extract;
pub mod keywords;
pub mod listing;
pub mod notify;
pub mod schedule;
pub mod store;

// Re-export commonly used types for convenience
pub use config::WatcherConfig;
pub use cycle::{CycleReport, Watcher};
pub use error::{Error, Result};
pub use keywords::{Keywords, load_keywords};
pub use listing::Listing;
pub use store::SeenSet;

/// Runs the startup checks and loads the state the watcher starts from
///
/// Fails on invalid configuration, an unreadable or malformed store, and an
/// empty or missing keyword file, before any poll cycle runs.
pub fn prepare(config: &WatcherConfig) -> Result<(Keywords, SeenSet)> {
    config.validate()?;

    let keywords = load_keywords(&config.keywords_path)?;
    if keywords.is_empty() {
        return Err(Error::Config(format!(
            "no keywords found in {}",
            config.keywords_path.display()
        )));
    }

    let seen = SeenSet::load(&config.database_path)?;
    Ok((keywords, seen))
}
