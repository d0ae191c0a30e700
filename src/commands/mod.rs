// Command handlers module
pub mod config;
pub mod events;
pub mod run;
pub mod simulate;
pub mod version;

use std::path::PathBuf;

use anyhow::Result;
use clap::ArgMatches;
use colored::Colorize;

use crate::core::config::EngineConfig;
use crate::core::telemetry::EngineEvent;

// Re-exports for cleaner imports
pub use events::execute as events;
pub use run::execute as run;
pub use simulate::execute as simulate;
pub use version::execute as version;

/// Load the config named by `--config`, or the default one
pub(crate) fn load_config(matches: &ArgMatches) -> Result<EngineConfig> {
    match matches.get_one::<PathBuf>("config") {
        Some(path) => EngineConfig::load_from(path),
        None => EngineConfig::load(),
    }
}

/// Parse `--event` values, warning about and skipping unknown names
pub(crate) fn requested_events(matches: &ArgMatches) -> Vec<EngineEvent> {
    matches
        .get_many::<String>("event")
        .into_iter()
        .flatten()
        .filter_map(|name| match name.parse::<EngineEvent>() {
            Ok(event) => Some(event),
            Err(e) => {
                eprintln!("{}", format!("⚠️  {} (see 'telesim events')", e).yellow());
                None
            }
        })
        .collect()
}
