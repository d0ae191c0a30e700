//! Offline, deterministic simulation on a manual clock.

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use clap::ArgMatches;

use super::{load_config, requested_events};
use crate::core::config::EngineConfig;
use crate::core::telemetry::{Clock, Engine, ManualClock, MetricKind, SystemState};
use crate::ui::format_summary;

pub fn execute(matches: &ArgMatches) -> Result<()> {
    let mut config = load_config(matches)?;
    if let Some(seed) = matches.get_one::<u64>("seed") {
        config.seed = Some(*seed);
    }
    let ticks = matches.get_one::<u64>("ticks").copied().unwrap_or(60);
    let events: Vec<&'static str> = requested_events(matches)
        .into_iter()
        .map(|event| event.name())
        .collect();

    let state = run_offline(&config, ticks, &events)?;

    if matches.get_flag("summary") {
        println!("{}", format_summary(&state, &config.thresholds));
    } else if matches.get_flag("pretty") {
        println!("{}", serde_json::to_string_pretty(&state)?);
    } else {
        println!("{}", serde_json::to_string(&state)?);
    }
    Ok(())
}

/// Simulate `seconds` of wall time, ticking every metric at its own cadence.
pub fn run_offline(config: &EngineConfig, seconds: u64, events: &[&str]) -> Result<SystemState> {
    run_offline_from(config, Utc::now(), seconds, events)
}

/// Same as [`run_offline`] with a fixed start instant.
pub fn run_offline_from(
    config: &EngineConfig,
    start: DateTime<Utc>,
    seconds: u64,
    events: &[&str],
) -> Result<SystemState> {
    let clock = ManualClock::new(start);
    let mut engine = Engine::with_config(None, config, Arc::new(clock.clone()))
        .context("Failed to create engine")?;

    for event in events {
        engine.trigger_event(event);
    }

    let mut next_due: Vec<(MetricKind, DateTime<Utc>)> = MetricKind::ALL
        .iter()
        .map(|&kind| (kind, start + period(config, kind)))
        .collect();

    for _ in 0..seconds {
        clock.advance_secs(1);
        let now = clock.now();
        for (kind, due) in next_due.iter_mut() {
            while *due <= now {
                engine.update_metrics(Some(*kind));
                *due += period(config, *kind);
            }
        }
        engine.run_due_tasks();
    }

    let state = engine.get_state();
    engine.shutdown();
    Ok(state)
}

fn period(config: &EngineConfig, kind: MetricKind) -> Duration {
    let ms = config.cadence.period(kind).as_millis().min(i64::MAX as u128) as i64;
    Duration::milliseconds(ms.max(1))
}
