//! Live simulation on the wall clock.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::ArgMatches;
use colored::Colorize;

use super::{load_config, requested_events};
use crate::core::telemetry::SimulationRuntime;
use crate::ui::{format_alert, format_log, format_summary};

pub fn execute(matches: &ArgMatches) -> Result<()> {
    let config = load_config(matches)?;
    let seconds = matches.get_one::<u64>("seconds").copied().unwrap_or(30);
    let json_output = matches.get_flag("json");
    let show_logs = matches.get_flag("logs");
    let events = requested_events(matches);

    // Create shared cancellation flag
    let stop_flag = Arc::new(AtomicBool::new(false));
    let stop_flag_clone = stop_flag.clone();

    // Setup Ctrl+C handler
    ctrlc::set_handler(move || {
        stop_flag_clone.store(true, Ordering::Relaxed);
    })
    .map_err(|e| anyhow::anyhow!("Failed to set Ctrl+C handler: {}", e))?;

    let runtime = SimulationRuntime::new(&config).context("Failed to start simulation")?;

    for event in &events {
        runtime.trigger_event(event.name())?;
        if !json_output {
            println!("{} {}", "Injected".cyan(), event.name().bold());
        }
    }

    let started = Instant::now();
    let mut seen: HashSet<String> = HashSet::new();

    while !stop_flag.load(Ordering::Relaxed) && started.elapsed().as_secs() < seconds {
        std::thread::sleep(Duration::from_secs(1));
        let state = runtime.latest();

        if json_output {
            println!("{}", serde_json::to_string(state.as_ref())?);
            continue;
        }

        println!("{}", format_summary(&state, &config.thresholds));
        for alert in state.alerts.iter().rev() {
            if seen.insert(alert.id.clone()) {
                println!("  {}", format_alert(alert));
            }
        }
        if show_logs {
            for entry in state.logs.iter().rev() {
                if seen.insert(entry.id.clone()) {
                    println!("  {}", format_log(entry));
                }
            }
        }
    }

    if stop_flag.load(Ordering::Relaxed) && !json_output {
        println!("{}", "Stopping simulation...".yellow().bold());
    }

    runtime.shutdown().context("Failed to stop simulation")?;
    Ok(())
}
