use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::Rng;

use super::{
    local_time, round1, DayPeriod, MetricGenerator, ProcessParams, SeasonalProfile,
    StochasticProcess,
};
use crate::core::telemetry::metrics::{MetricKind, MetricState};
use crate::core::telemetry::scheduler::{Revert, ScheduledTask};

pub const CPU_PARAMS: ProcessParams = ProcessParams {
    min_bound: 0.0,
    max_bound: 100.0,
    baseline: 35.0,
    trend_strength: 5.0,
    noise_strength: 4.0,
    volatility: 1.2,
    seasonal_strength: 1.5,
    drift: 0.0,
};

/// Strongest business-hours effect of all metrics
const CPU_SEASONS: SeasonalProfile = SeasonalProfile {
    business_hours: 1.6,
    off_hours: 1.0,
    night: 0.55,
    weekend: 0.75,
};

/// CPU usage in percent
#[derive(Debug, Clone)]
pub struct CpuGenerator {
    process: StochasticProcess,
    process_usage: HashMap<String, f64>,
}

impl CpuGenerator {
    pub fn new(initial: f64, rng: StdRng) -> Self {
        Self {
            process: StochasticProcess::new(CPU_PARAMS, initial, rng),
            process_usage: HashMap::new(),
        }
    }

    pub fn resume(state: &MetricState, rng: StdRng) -> Self {
        Self {
            process: StochasticProcess::resume(CPU_PARAMS, state, rng),
            process_usage: HashMap::new(),
        }
    }

    /// Bump usage by `magnitude` and attribute it to `process_name`.
    ///
    /// The side-table entry is released 3-5 seconds later by the returned
    /// revert; the series itself keeps evolving from the bumped value.
    pub fn simulate_process_spike(&mut self, process_name: &str, magnitude: f64) -> Revert {
        let magnitude = if magnitude.is_finite() { magnitude } else { 0.0 };
        let amount = round1(magnitude);
        let value = self.process.set_value(self.process.current() + magnitude);
        *self
            .process_usage
            .entry(process_name.to_string())
            .or_insert(0.0) += amount;
        log::debug!(
            "cpu spike from {} (+{:.1}) -> {:.1}%",
            process_name,
            magnitude,
            value
        );

        let after = Duration::from_millis(self.process.rng().gen_range(3_000..=5_000));
        Revert::new(
            after,
            ScheduledTask::ReleaseProcess {
                name: process_name.to_string(),
                amount,
            },
        )
    }

    /// Subtract one spike's `amount` from the process entry, dropping the
    /// entry once nothing is left. Returns the remaining usage.
    pub fn release_process(&mut self, process_name: &str, amount: f64) -> Option<f64> {
        let usage = self.process_usage.get_mut(process_name)?;
        *usage = round1(*usage - amount);
        if *usage > 0.0 {
            return Some(*usage);
        }
        self.process_usage.remove(process_name);
        None
    }

    /// Forget every process entry
    pub fn clear_processes(&mut self) {
        self.process_usage.clear();
    }

    pub fn process_usage(&self) -> &HashMap<String, f64> {
        &self.process_usage
    }

    fn seasonal_target(&self, period: DayPeriod) -> f64 {
        self.process.params().baseline * CPU_SEASONS.multiplier(period)
    }
}

impl MetricGenerator for CpuGenerator {
    fn kind(&self) -> MetricKind {
        MetricKind::Cpu
    }

    fn next_value(&mut self, now: DateTime<Utc>, external_influence: f64) -> f64 {
        let period = DayPeriod::classify(local_time(now));
        let trend = self.process.trend_component();
        let noise = self.process.noise_component();
        let seasonal = self.process.seasonal_component(self.seasonal_target(period));
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
