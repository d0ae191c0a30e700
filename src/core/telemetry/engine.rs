//! The orchestrator.
//!
//! `Engine` owns the four generators together with the correlation, alert and
//! log subsystems, and is the only writer of the [`SystemState`] snapshot.
//! Deferred effects live in the engine's [`Scheduler`] and run synchronously
//! at the start of every call that advances or perturbs the simulation.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use super::alerts::{AlertEvaluator, Thresholds};
use super::clock::{Clock, SystemClock};
use super::correlation::{CorrelationEffect, CorrelationEngine, CorrelationRule};
use super::events::EngineEvent;
use super::generators::{
    CpuGenerator, DiskGenerator, MemoryGenerator, MetricGenerator, NetworkGenerator,
};
use super::logs::LogSynthesizer;
use super::metrics::{AlertType, LastUpdated, MetricKind, SystemState, RETENTION_CAP};
use super::scheduler::{Revert, ScheduledTask, Scheduler};
use crate::core::config::EngineConfig;
use crate::error::Result;

const SPIKE_PROCESSES: &[&str] = &["java", "node", "postgres", "python", "nginx", "chrome"];
const MEMORY_LEAK_DURATION: Duration = Duration::from_secs(60);
const BANDWIDTH_SPIKE_DURATION: Duration = Duration::from_secs(15);
const CONGESTION_DURATION: Duration = Duration::from_secs(20);

pub struct Engine {
    cpu: CpuGenerator,
    memory: MemoryGenerator,
    disk: DiskGenerator,
    network: NetworkGenerator,
    correlation: CorrelationEngine,
    alerts: AlertEvaluator,
    logs: LogSynthesizer,
    scheduler: Scheduler,
    state: SystemState,
    clock: Arc<dyn Clock>,
    rng: StdRng,
    background_log_probability: f64,
    random_alert_probability: f64,
}

impl Engine {
    /// Engine on the wall clock with default settings
    pub fn new(initial: Option<SystemState>, thresholds: Option<Thresholds>) -> Result<Self> {
        let config = EngineConfig {
            thresholds: thresholds.unwrap_or_default(),
            ..Default::default()
        };
        Self::with_config(initial, &config, Arc::new(SystemClock))
    }

    pub fn with_config(
        initial: Option<SystemState>,
        config: &EngineConfig,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        Self::with_rules(initial, config, clock, CorrelationEngine::default())
    }

    pub fn with_rules(
        initial: Option<SystemState>,
        config: &EngineConfig,
        clock: Arc<dyn Clock>,
        correlation: CorrelationEngine,
    ) -> Result<Self> {
        config.validate()?;

        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let mut child = || StdRng::seed_from_u64(rng.gen());
        let now = clock.now();

        let (cpu, memory, disk, network) = match &initial {
            Some(snapshot) => (
                CpuGenerator::resume(&snapshot.cpu, child()),
                MemoryGenerator::resume(&snapshot.memory, child())
                    .with_tick_period(config.cadence.period(MetricKind::Memory)),
                DiskGenerator::resume(&snapshot.disk, child()),
                NetworkGenerator::resume(&snapshot.network, child()),
            ),
            None => (
                CpuGenerator::new(config.initial.cpu, child()),
                MemoryGenerator::new(config.initial.memory, child())
                    .with_tick_period(config.cadence.period(MetricKind::Memory)),
                DiskGenerator::new(config.initial.disk, child()),
                NetworkGenerator::new(config.initial.network, child()),
            ),
        };
        let alerts = AlertEvaluator::new(config.thresholds, child());
        let logs = LogSynthesizer::new(child());

        let (mut alert_list, mut log_list, last_updated) = match initial {
            Some(snapshot) => (snapshot.alerts, snapshot.logs, snapshot.last_updated),
            None => (VecDeque::new(), VecDeque::new(), LastUpdated::all(now)),
        };
        alert_list.truncate(RETENTION_CAP);
        log_list.truncate(RETENTION_CAP);

        let state = SystemState {
            cpu: cpu.current_state(),
            memory: memory.current_state(),
            disk: disk.current_state(),
            network: network.current_state(),
            alerts: alert_list,
            logs: log_list,
            last_updated,
        };

        log::debug!(
            "engine created: cpu={:.1} memory={:.1} disk={:.1} network={:.1}",
            state.cpu.current,
            state.memory.current,
            state.disk.current,
            state.network.current
        );

        Ok(Self {
            cpu,
            memory,
            disk,
            network,
            correlation,
            alerts,
            logs,
            scheduler: Scheduler::new(),
            state,
            clock,
            rng,
            background_log_probability: config.background_log_probability,
            random_alert_probability: config.random_alert_probability,
        })
    }

    /// Advance one metric, or all four in priority order, by one tick.
    ///
    /// At most one threshold alert is emitted per call. Background logs and
    /// random alerts are drawn once per call regardless of `kind`.
    pub fn update_metrics(&mut self, kind: Option<MetricKind>) -> SystemState {
        let now = self.clock.now();
        self.run_due_tasks_at(now);

        let kinds: Vec<MetricKind> = match kind {
            Some(kind) => vec![kind],
            None => MetricKind::ALL.to_vec(),
        };

        let mut alerted = false;
        for kind in kinds {
            let value = self.generator_mut(kind).next_value(now, 0.0);
            self.refresh_metric(kind, now);
            log::debug!("tick {} -> {:.1}", kind, value);

            self.correlation.check(kind, value, now, &mut self.scheduler);

            if let Some(entry) = self.logs.generate_correlated_error_log(kind, value, now) {
                self.state.push_log(entry);
            }

            if !alerted {
                if let Some(alert) = self.alerts.check_readings(&[(kind, value)], now) {
                    self.state.push_alert(alert);
                    alerted = true;
                }
            }
        }

        if chance(&mut self.rng, self.background_log_probability) {
            let entry = self.logs.generate_random_log(now);
            self.state.push_log(entry);
        }
        if chance(&mut self.rng, self.random_alert_probability) {
            let alert = self.alerts.generate_random_alert(now);
            self.state.push_alert(alert);
        }

        self.state.clone()
    }

    /// Dispatch an event by wire name; unknown names are ignored
    pub fn trigger_event(&mut self, event_type: &str) {
        match event_type.parse::<EngineEvent>() {
            Ok(event) => self.apply_event(event),
            Err(_) => log::debug!("ignoring unknown event type {:?}", event_type),
        }
    }

    pub fn apply_event(&mut self, event: EngineEvent) {
        let now = self.clock.now();
        self.run_due_tasks_at(now);
        log::info!("injecting event {}", event);

        let outcome = match event {
            EngineEvent::CpuSpike => {
                let process = SPIKE_PROCESSES
                    .choose(&mut self.rng)
                    .copied()
                    .unwrap_or("unknown");
                let magnitude = self.rng.gen_range(20.0..=40.0);
                let revert = self.cpu.simulate_process_spike(process, magnitude);
                self.schedule(now, revert);
                Some((
                    AlertType::Warning,
                    format!("CPU spike: {} consumed +{:.1}%", process, magnitude),
                ))
            }
            EngineEvent::MemoryLeak => {
                let leak = self.memory.simulate_memory_leak(MEMORY_LEAK_DURATION);
                leak.map(|revert| {
                    self.schedule(now, revert);
                    (
                        AlertType::Warning,
                        format!(
                            "Memory leak detected: usage climbing for {}s",
                            MEMORY_LEAK_DURATION.as_secs()
                        ),
                    )
                })
            }
            EngineEvent::GarbageCollection => {
                let value = self.memory.simulate_garbage_collection();
                Some((
                    AlertType::Info,
                    format!("Garbage collection completed: memory at {:.1}%", value),
                ))
            }
            EngineEvent::DiskCleanup => {
                let percent = self.rng.gen_range(5.0..=15.0);
                let value = self.disk.simulate_disk_cleanup(percent);
                Some((
                    AlertType::Info,
                    format!("Disk cleanup freed {:.1}%: disk at {:.1}%", percent, value),
                ))
            }
            EngineEvent::LargeDiskWrite => {
                let percent = self.rng.gen_range(3.0..=8.0);
                let value = self.disk.simulate_large_file_write(percent);
                Some((
                    AlertType::Info,
                    format!("Large file write: disk at {:.1}%", value),
                ))
            }
            EngineEvent::NetworkSpike => {
                let revert = self.network.simulate_bandwidth_spike(BANDWIDTH_SPIKE_DURATION);
                self.schedule(now, revert);
                Some((
                    AlertType::Warning,
                    format!(
                        "Bandwidth spike: {:.1} MB/s",
                        self.network.current()
                    ),
                ))
            }
            EngineEvent::NetworkCongestion => {
                let revert = self.network.simulate_network_congestion(CONGESTION_DURATION);
                self.schedule(now, revert);
                Some((
                    AlertType::Info,
                    format!(
                        "Network congestion: throughput down to {:.1} MB/s",
                        self.network.current()
                    ),
                ))
            }
        };

        let kind = event.metric();
        self.refresh_metric(kind, now);
        let value = self.generator(kind).current();
        self.correlation.check(kind, value, now, &mut self.scheduler);

        if let Some((alert_type, message)) = outcome {
            let entry = self.logs.event_log(message.clone(), now);
            self.state.push_log(entry);
            let alert = self.alerts.make_alert(alert_type, message, now);
            self.state.push_alert(alert);
        }
    }

    /// Replace the live thresholds; invalid sets are rejected and the
    /// previous thresholds stay in force.
    pub fn update_thresholds(&mut self, thresholds: Thresholds) -> Result<()> {
        self.alerts.set_thresholds(thresholds).inspect_err(|e| {
            log::warn!("rejected threshold update: {}", e);
        })
    }

    pub fn thresholds(&self) -> &Thresholds {
        self.alerts.thresholds()
    }

    /// Immutable snapshot of the current state
    pub fn get_state(&self) -> SystemState {
        self.state.clone()
    }

    /// Execute every deferred task due by now
    pub fn run_due_tasks(&mut self) -> usize {
        let now = self.clock.now();
        self.run_due_tasks_at(now)
    }

    /// Cancel all pending effects and re-arm every correlation rule.
    ///
    /// A running memory leak is stopped and the CPU process table cleared;
    /// metric values themselves are left where they are. Returns the number of
    /// cancelled tasks.
    pub fn shutdown(&mut self) -> usize {
        let cancelled = self.scheduler.cancel_all();
        self.correlation.reset();
        self.memory.end_memory_leak();
        self.cpu.clear_processes();
        log::info!("engine stopped, {} pending effects cancelled", cancelled);
        cancelled
    }

    pub fn pending_tasks(&self) -> usize {
        self.scheduler.len()
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn correlation_rules(&self) -> &[CorrelationRule] {
        self.correlation.rules()
    }

    pub fn process_usage(&self) -> &HashMap<String, f64> {
        self.cpu.process_usage()
    }

    pub fn cpu(&self) -> &CpuGenerator {
        &self.cpu
    }

    pub fn memory(&self) -> &MemoryGenerator {
        &self.memory
    }

    pub fn disk(&self) -> &DiskGenerator {
        &self.disk
    }

    pub fn network(&self) -> &NetworkGenerator {
        &self.network
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    fn run_due_tasks_at(&mut self, now: DateTime<Utc>) -> usize {
        let mut executed = 0;
        loop {
            let due = self.scheduler.pop_due(now);
            if due.is_empty() {
                break;
            }
            for task in due {
                self.execute(task, now);
                executed += 1;
            }
        }
        executed
    }

    fn execute(&mut self, task: ScheduledTask, now: DateTime<Utc>) {
        log::debug!("running scheduled task {:?}", task);
        match task {
            ScheduledTask::ApplyCorrelation { rule } => {
                let Some(effect) = self.correlation.rule(rule).map(CorrelationRule::effect) else {
                    return;
                };
                self.apply_effect(effect, now);
            }
            ScheduledTask::ReleaseRule { rule } => self.correlation.release(rule),
            ScheduledTask::EndMemoryLeak => {
                self.memory.end_memory_leak();
            }
            ScheduledTask::RestoreNetwork { value } => {
                self.network.restore(value);
                self.refresh_metric(MetricKind::Network, now);
            }
            ScheduledTask::ReleaseProcess { name, amount } => {
                self.cpu.release_process(&name, amount);
            }
        }
    }

    fn apply_effect(&mut self, effect: CorrelationEffect, now: DateTime<Utc>) {
        match effect {
            CorrelationEffect::MemoryLeak { duration } => {
                if let Some(revert) = self.memory.simulate_memory_leak(duration) {
                    self.schedule(now, revert);
                }
            }
            CorrelationEffect::LargeDiskWrite { percent } => {
                self.disk.simulate_large_file_write(percent);
                self.refresh_metric(MetricKind::Disk, now);
            }
            CorrelationEffect::BandwidthSpike { duration } => {
                let revert = self.network.simulate_bandwidth_spike(duration);
                self.schedule(now, revert);
                self.refresh_metric(MetricKind::Network, now);
            }
            CorrelationEffect::Nudge { target, amount } => {
                self.generator_mut(target).apply_external_influence(amount);
            }
        }
    }

    fn schedule(&mut self, now: DateTime<Utc>, revert: Revert) {
        self.scheduler.schedule_after(now, revert.after, revert.task);
    }

    fn refresh_metric(&mut self, kind: MetricKind, now: DateTime<Utc>) {
        let state = self.generator(kind).current_state();
        *self.state.metric_mut(kind) = state;
        self.state.last_updated.set(kind, now);
    }

    fn generator(&self, kind: MetricKind) -> &dyn MetricGenerator {
        match kind {
            MetricKind::Cpu => &self.cpu,
            MetricKind::Memory => &self.memory,
            MetricKind::Disk => &self.disk,
            MetricKind::Network => &self.network,
        }
    }

    fn generator_mut(&mut self, kind: MetricKind) -> &mut dyn MetricGenerator {
        match kind {
            MetricKind::Cpu => &mut self.cpu,
            MetricKind::Memory => &mut self.memory,
            MetricKind::Disk => &mut self.disk,
            MetricKind::Network => &mut self.network,
        }
    }
}

fn chance(rng: &mut StdRng, probability: f64) -> bool {
    probability > 0.0 && rng.gen_bool(probability.min(1.0))
}
