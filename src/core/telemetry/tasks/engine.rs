//! Engine task: sole owner of the engine inside the runtime.

use std::sync::Arc;

use tokio::sync::{broadcast, mpsc, watch};

use super::EngineCommand;
use crate::core::telemetry::engine::Engine;
use crate::core::telemetry::metrics::SystemState;

/// Apply commands one at a time and publish a snapshot after each change.
///
/// On shutdown every pending deferred effect is cancelled before the task
/// returns.
pub async fn engine_task(
    mut engine: Engine,
    mut command_rx: mpsc::Receiver<EngineCommand>,
    snapshot_tx: watch::Sender<Arc<SystemState>>,
    mut shutdown: broadcast::Receiver<()>,
) {
    log::info!("engine task started");

    loop {
        tokio::select! {
            Some(command) = command_rx.recv() => {
                match command {
                    EngineCommand::Tick(kind) => {
                        let state = engine.update_metrics(Some(kind));
                        // send() only fails without receivers, which is fine
                        let _ = snapshot_tx.send(Arc::new(state));
                    }
                    EngineCommand::TriggerEvent(name) => {
                        engine.trigger_event(&name);
                        let _ = snapshot_tx.send(Arc::new(engine.get_state()));
                    }
                    EngineCommand::UpdateThresholds { thresholds, reply } => {
                        let _ = reply.send(engine.update_thresholds(thresholds));
                    }
                }
            }
            _ = shutdown.recv() => {
                let cancelled = engine.shutdown();
                log::info!(
                    "engine task shutting down ({} effects cancelled)",
                    cancelled
                );
                break;
            }
        }
    }
}
