//! telesim: synthetic, correlated system telemetry.
//!
//! The [`Engine`] drives four metric generators and synthesizes the alerts
//! and log lines a monitored host would emit. [`core::SimulationRuntime`]
//! hosts an engine on Tokio, ticking each metric at its own cadence.

pub mod error;
pub use error::{Result, SimError};

pub mod commands;
pub mod core;
pub mod ui;

pub use core::config::EngineConfig;
pub use core::telemetry::{Engine, EngineEvent, MetricKind, SystemState, Thresholds};

/// Install the global logger.
///
/// Our own modules log at info by default and dependencies only at warn;
/// `RUST_LOG` overrides both.
pub fn init_logging() {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Warn)
        .filter_module("telesim", log::LevelFilter::Info)
        .format_timestamp_millis()
        .parse_default_env()
        .init();
}
