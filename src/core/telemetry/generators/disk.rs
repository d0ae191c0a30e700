use chrono::{DateTime, Utc};
use rand::rngs::StdRng;

use super::{
    local_time, DayPeriod, MetricGenerator, ProcessParams, SeasonalProfile, StochasticProcess,
};
use crate::core::telemetry::metrics::{MetricKind, MetricState};

/// Weakest volatility; the constant drift models organic data growth
pub const DISK_PARAMS: ProcessParams = ProcessParams {
    min_bound: 0.0,
    max_bound: 100.0,
    baseline: 60.0,
    trend_strength: 0.5,
    noise_strength: 0.5,
    volatility: 0.3,
    seasonal_strength: 0.05,
    drift: 0.01,
};

/// Write activity, not a level: disk usage never falls back on its own
const DISK_SEASONS: SeasonalProfile = SeasonalProfile {
    business_hours: 1.2,
    off_hours: 1.0,
    night: 0.9,
    weekend: 0.95,
};

/// Disk usage in percent
#[derive(Debug, Clone)]
pub struct DiskGenerator {
    process: StochasticProcess,
}

impl DiskGenerator {
    pub fn new(initial: f64, rng: StdRng) -> Self {
        Self {
            process: StochasticProcess::new(DISK_PARAMS, initial, rng),
        }
    }

    pub fn resume(state: &MetricState, rng: StdRng) -> Self {
        Self {
            process: StochasticProcess::resume(DISK_PARAMS, state, rng),
        }
    }

    /// Free `percent` percent of the current usage
    pub fn simulate_disk_cleanup(&mut self, percent: f64) -> f64 {
        let current = self.process.current();
        self.process.set_value(current * (1.0 - percent / 100.0))
    }

    /// Grow the current usage by `percent` percent
    pub fn simulate_large_file_write(&mut self, percent: f64) -> f64 {
        let current = self.process.current();
        self.process.set_value(current * (1.0 + percent / 100.0))
    }
}

impl MetricGenerator for DiskGenerator {
    fn kind(&self) -> MetricKind {
        MetricKind::Disk
    }

    fn next_value(&mut self, now: DateTime<Utc>, external_influence: f64) -> f64 {
        let period = DayPeriod::classify(local_time(now));
        let trend = self.process.trend_component();
        let noise = self.process.noise_component();
        let seasonal =
            (DISK_SEASONS.multiplier(period) - 1.0) * self.process.params().seasonal_strength;
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
