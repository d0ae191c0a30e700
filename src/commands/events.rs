use anyhow::Result;
use colored::Colorize;

use crate::core::telemetry::EngineEvent;

/// List the injectable events
pub fn execute() -> Result<()> {
    println!("{}", "Available events:".bold());
    for event in EngineEvent::ALL {
        println!(
            "  {:<18} {:<8} {}",
            event.name().cyan(),
            event.metric().as_str().dimmed(),
            event.description()
        );
    }
    Ok(())
}
