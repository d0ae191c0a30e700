//! Async tasks driving the engine.
//!
//! Every metric has its own ticker at its own cadence; all of them feed one
//! engine task, which is the only place the engine is touched, so ticks never
//! overlap.

mod engine;
mod ticker;

pub use engine::engine_task;
pub use ticker::metric_tick_task;

use tokio::sync::oneshot;

use super::alerts::Thresholds;
use super::metrics::MetricKind;

/// Requests handled serially by the engine task
#[derive(Debug)]
pub enum EngineCommand {
    /// Advance one metric by one tick
    Tick(MetricKind),

    /// Inject an event by wire name
    TriggerEvent(String),

    /// Replace the alert thresholds, reporting validation errors back
    UpdateThresholds {
        thresholds: Thresholds,
        reply: oneshot::Sender<crate::Result<()>>,
    },
}
