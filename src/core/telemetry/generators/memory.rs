use std::time::Duration;

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::Rng;

use super::{
    local_time, DayPeriod, MetricGenerator, ProcessParams, SeasonalProfile, StochasticProcess,
};
use crate::core::telemetry::metrics::{MetricKind, MetricState};
use crate::core::telemetry::scheduler::{Revert, ScheduledTask};

pub const MEMORY_PARAMS: ProcessParams = ProcessParams {
    min_bound: 0.0,
    max_bound: 100.0,
    baseline: 50.0,
    trend_strength: 3.0,
    noise_strength: 2.0,
    volatility: 0.6,
    seasonal_strength: 1.0,
    drift: 0.0,
};

const MEMORY_SEASONS: SeasonalProfile = SeasonalProfile {
    business_hours: 1.25,
    off_hours: 1.0,
    night: 0.85,
    weekend: 0.9,
};

const DEFAULT_TICK_PERIOD: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct Leak {
    rate: f64,
    total: f64,
    accumulated: f64,
}

/// Memory usage in percent
#[derive(Debug, Clone)]
pub struct MemoryGenerator {
    process: StochasticProcess,
    leak: Option<Leak>,
    tick_period: Duration,
}

impl MemoryGenerator {
    pub fn new(initial: f64, rng: StdRng) -> Self {
        Self {
            process: StochasticProcess::new(MEMORY_PARAMS, initial, rng),
            leak: None,
            tick_period: DEFAULT_TICK_PERIOD,
        }
    }

    pub fn resume(state: &MetricState, rng: StdRng) -> Self {
        Self {
            process: StochasticProcess::resume(MEMORY_PARAMS, state, rng),
            leak: None,
            tick_period: DEFAULT_TICK_PERIOD,
        }
    }

    /// Cadence the generator is ticked at, used to pace leaks
    pub fn with_tick_period(mut self, period: Duration) -> Self {
        if !period.is_zero() {
            self.tick_period = period;
        }
        self
    }

    /// Start a leak that adds 15-30 points of trend over `duration`.
    ///
    /// The increase is spread over the ticks that land strictly inside
    /// `duration` at the configured tick period; the tick at `duration` itself
    /// already sees the leak ended. Returns `None` when a leak is already
    /// running; the returned revert ends the leak once `duration` has elapsed.
    pub fn simulate_memory_leak(&mut self, duration: Duration) -> Option<Revert> {
        if self.leak.is_some() {
            log::debug!("memory leak already active, ignoring");
            return None;
        }

        let ticks = leak_ticks(duration, self.tick_period);
        let total_increase = self.process.rng().gen_range(15.0..=30.0);
        let rate = total_increase / ticks as f64;
        self.leak = Some(Leak {
            rate,
            total: total_increase,
            accumulated: 0.0,
        });
        log::info!(
            "memory leak started: +{:.1}% over {}s ({:.3}/tick)",
            total_increase,
            duration.as_secs(),
            rate
        );

        Some(Revert::new(duration, ScheduledTask::EndMemoryLeak))
    }

    /// Stop the running leak, returning the trend it contributed
    pub fn end_memory_leak(&mut self) -> Option<f64> {
        let leak = self.leak.take()?;
        log::info!("memory leak ended after +{:.1}%", leak.accumulated);
        Some(leak.accumulated)
    }

    pub fn is_leaking(&self) -> bool {
        self.leak.is_some()
    }

    /// Per-tick trend added by the running leak, zero when idle
    pub fn leak_rate(&self) -> f64 {
        self.leak.map_or(0.0, |leak| leak.rate)
    }

    /// Trend contributed so far by the running leak
    pub fn leak_accumulated(&self) -> f64 {
        self.leak.map_or(0.0, |leak| leak.accumulated)
    }

    /// Immediately reclaim 10-20% of current usage
    pub fn simulate_garbage_collection(&mut self) -> f64 {
        let reclaimed = self.process.rng().gen_range(0.10..=0.20);
        let current = self.process.current();
        self.process.set_value(current * (1.0 - reclaimed))
    }

    fn leak_component(&mut self) -> f64 {
        match self.leak.as_mut() {
            Some(leak) => {
                // Ticks that drift off the grid never push past the total
                let step = leak.rate.min(leak.total - leak.accumulated).max(0.0);
                leak.accumulated += step;
                step
            }
            None => 0.0,
        }
    }
}

/// Ticks falling strictly inside `duration`, at least one
fn leak_ticks(duration: Duration, period: Duration) -> u64 {
    let period_ms = period.as_millis().max(1);
    let ticks = duration.as_millis().div_ceil(period_ms).saturating_sub(1);
    u64::try_from(ticks).unwrap_or(u64::MAX).max(1)
}

impl MetricGenerator for MemoryGenerator {
    fn kind(&self) -> MetricKind {
        MetricKind::Memory
    }

    fn next_value(&mut self, now: DateTime<Utc>, external_influence: f64) -> f64 {
        let period = DayPeriod::classify(local_time(now));
        let trend = self.process.trend_component() + self.leak_component();
        let noise = self.process.noise_component();
        let target = self.process.params().baseline * MEMORY_SEASONS.multiplier(period);
        let seasonal = self.process.seasonal_component(target);
        let spike = self.process.spike_component(period);
        let queued = self.process.take_influence();

        self.process
            .advance(trend + noise + seasonal + spike + external_influence + queued)
    }

    fn current_state(&self) -> MetricState {
        self.process.state()
    }

    fn current(&self) -> f64 {
        self.process.current()
    }

    fn apply_external_influence(&mut self, influence: f64) {
        self.process.queue_influence(influence);
    }
}
