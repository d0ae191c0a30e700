//! Synthetic telemetry engine.
//!
//! This module produces correlated CPU, memory, disk and network series,
//! together with the alerts and log lines a monitoring UI would show for
//! them, and lets an operator inject incidents into the simulation.

pub mod alerts;
pub mod clock;
pub mod correlation;
mod engine;
mod events;
pub mod generators;
mod history;
pub mod logs;
mod metrics;
mod runtime;
pub mod scheduler;
mod tasks;

pub use alerts::{AlertEvaluator, ThresholdPair, Thresholds};
pub use clock::{Clock, ManualClock, SystemClock};
pub use correlation::{CorrelationEffect, CorrelationEngine, CorrelationRule};
pub use engine::Engine;
pub use events::EngineEvent;
pub use generators::{
    CpuGenerator, DayPeriod, DiskGenerator, MemoryGenerator, MetricGenerator, NetworkGenerator,
};
pub use history::MetricHistory;
pub use logs::LogSynthesizer;
pub use metrics::{
    Alert, AlertType, LastUpdated, LogEntry, LogLevel, MetricKind, MetricState, SystemState,
    RETENTION_CAP,
};
pub use runtime::SimulationRuntime;
pub use scheduler::{Revert, ScheduledTask, Scheduler};
pub use tasks::EngineCommand;
