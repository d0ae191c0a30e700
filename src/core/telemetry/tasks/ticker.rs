//! Per-metric tick task.

use std::time::Duration;

use tokio::sync::{broadcast, mpsc};
use tokio::time::{interval, MissedTickBehavior};

use super::EngineCommand;
use crate::core::telemetry::metrics::MetricKind;

/// Task that asks the engine to advance `kind` every `period`.
pub async fn metric_tick_task(
    kind: MetricKind,
    period: Duration,
    command_tx: mpsc::Sender<EngineCommand>,
    mut shutdown: broadcast::Receiver<()>,
) {
    log::debug!("{} ticker started ({}ms)", kind, period.as_millis());

    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    // The first tick completes immediately; the engine already holds t=0
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if command_tx.send(EngineCommand::Tick(kind)).await.is_err() {
                    break;
                }
            }
            _ = shutdown.recv() => {
                log::debug!("{} ticker shutting down", kind);
                break;
            }
        }
    }
}
