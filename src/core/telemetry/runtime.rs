//! Tokio runtime hosting the engine.
//!
//! This mirrors a metrics runtime: per-metric tickers feed a single engine
//! task and callers read the latest snapshot from a watch channel.

use std::sync::Arc;

use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio::task::JoinHandle;

use super::alerts::Thresholds;
use super::clock::{Clock, SystemClock};
use super::engine::Engine;
use super::metrics::{MetricKind, SystemState};
use super::tasks::{engine_task, metric_tick_task, EngineCommand};
use crate::core::config::EngineConfig;
use crate::error::{Result, SimError};

/// Wrapper around the Tokio runtime driving a simulation.
///
/// All methods are synchronous and must not be called from inside another
/// async runtime.
pub struct SimulationRuntime {
    /// Receiver for SystemState snapshots
    pub snapshot_rx: watch::Receiver<Arc<SystemState>>,

    command_tx: mpsc::Sender<EngineCommand>,

    /// Shutdown signal sender
    shutdown_tx: broadcast::Sender<()>,

    engine_handle: JoinHandle<()>,

    runtime: tokio::runtime::Runtime,
}

impl SimulationRuntime {
    /// Start a wall-clock simulation with all tickers spawned.
    pub fn new(config: &EngineConfig) -> Result<Self> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: &EngineConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        let engine = Engine::with_config(None, config, clock)?;

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_time()
            .thread_name("telesim-worker")
            .build()?;

        let (snapshot_tx, snapshot_rx) = watch::channel(Arc::new(engine.get_state()));
        let (command_tx, command_rx) = mpsc::channel::<EngineCommand>(32);
        let (shutdown_tx, _) = broadcast::channel::<()>(1);

        let engine_handle = runtime.spawn(engine_task(
            engine,
            command_rx,
            snapshot_tx,
            shutdown_tx.subscribe(),
        ));

        for kind in MetricKind::ALL {
            runtime.spawn(metric_tick_task(
                kind,
                config.cadence.period(kind),
                command_tx.clone(),
                shutdown_tx.subscribe(),
            ));
        }

        log::info!("simulation runtime started");

        Ok(Self {
            snapshot_rx,
            command_tx,
            shutdown_tx,
            engine_handle,
            runtime,
        })
    }

    /// Latest published snapshot
    pub fn latest(&self) -> Arc<SystemState> {
        self.snapshot_rx.borrow().clone()
    }

    /// Queue an event by wire name; unknown names are ignored by the engine
    pub fn trigger_event(&self, event_type: &str) -> Result<()> {
        self.command_tx
            .blocking_send(EngineCommand::TriggerEvent(event_type.to_string()))
            .map_err(|_| SimError::runtime("engine task is not running"))
    }

    /// Replace the thresholds, waiting for the engine's verdict
    pub fn update_thresholds(&self, thresholds: Thresholds) -> Result<()> {
        let (reply, verdict) = oneshot::channel();
        self.command_tx
            .blocking_send(EngineCommand::UpdateThresholds { thresholds, reply })
            .map_err(|_| SimError::runtime("engine task is not running"))?;
        verdict
            .blocking_recv()
            .map_err(|_| SimError::runtime("engine task dropped the request"))?
    }

    /// Stop every task, cancelling the engine's pending effects.
    pub fn shutdown(self) -> Result<()> {
        log::info!("shutting down simulation runtime");
        let _ = self.shutdown_tx.send(());
        self.runtime
            .block_on(self.engine_handle)
            .map_err(|e| SimError::runtime(format!("engine task failed: {}", e)))
        // Runtime shuts down when dropped
    }
}
