use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::ArgMatches;
use colored::Colorize;

use super::load_config;
use crate::core::config::EngineConfig;

pub fn execute(matches: &ArgMatches) -> Result<()> {
    match matches.subcommand() {
        Some(("show", sub_matches)) => show(sub_matches),
        Some(("init", sub_matches)) => init(sub_matches),
        Some(("path", _)) => {
            println!("{}", EngineConfig::get_config_path()?.display());
            Ok(())
        }
        _ => {
            println!("Use 'telesim config --help' for more information.");
            Ok(())
        }
    }
}

fn show(matches: &ArgMatches) -> Result<()> {
    let config = load_config(matches)?;
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}

fn init(matches: &ArgMatches) -> Result<()> {
    let path = match matches.get_one::<PathBuf>("config") {
        Some(path) => path.clone(),
        None => EngineConfig::get_config_path()?,
    };

    if path.exists() && !matches.get_flag("force") {
        println!(
            "{}",
            format!("Config already exists at {}", path.display()).yellow()
        );
        println!("{}", "Use --force to overwrite it with defaults.".dimmed());
        return Ok(());
    }

    EngineConfig::default()
        .save_to(&path)
        .with_context(|| format!("Failed to initialize config at {:?}", path))?;
    println!(
        "{} {}",
        "✓ Wrote default config to".green(),
        path.display().to_string().bold()
    );
    Ok(())
}
