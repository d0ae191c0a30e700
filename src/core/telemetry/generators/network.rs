use std::time::Duration;

use chrono::{DateTime, Timelike, Utc};
use rand::rngs::StdRng;
use rand::Rng;

use super::{local_time, DayPeriod, MetricGenerator, ProcessParams, StochasticProcess};
use crate::core::telemetry::metrics::{MetricKind, MetricState};
use crate::core::telemetry::scheduler::{Revert, ScheduledTask};

/// Network throughput in MB/s
pub const NETWORK_PARAMS: ProcessParams = ProcessParams {
    min_bound: 0.1,
    max_bound: 15.0,
    baseline: 3.0,
    trend_strength: 0.4,
    noise_strength: 0.8,
    volatility: 1.0,
    seasonal_strength: 1.2,
    drift: 0.0,
};

/// Traffic multiplier per local hour: morning and afternoon peaks,
/// an evening streaming bump and a night lull.
const HOURLY_TRAFFIC: [f64; 24] = [
    0.35, 0.3, 0.25, 0.25, 0.3, 0.4, // 00-05
    0.6, 0.9, 1.3, 1.6, 1.5, 1.4, // 06-11
    1.2, 1.4, 1.6, 1.5, 1.3, 1.1, // 12-17
    1.2, 1.4, 1.5, 1.2, 0.8, 0.5, // 18-23
];

const WEEKEND_TRAFFIC: f64 = 0.7;

pub fn hourly_multiplier(hour: u32) -> f64 {
    HOURLY_TRAFFIC[(hour as usize) % HOURLY_TRAFFIC.len()]
}

/// Network throughput in MB/s
#[derive(Debug, Clone)]
pub struct NetworkGenerator {
    process: StochasticProcess,
}

impl NetworkGenerator {
    pub fn new(initial: f64, rng: StdRng) -> Self {
        Self {
            process: StochasticProcess::new(NETWORK_PARAMS, initial, rng),
        }
    }

    pub fn resume(state: &MetricState, rng: StdRng) -> Self {
        Self {
            process: StochasticProcess::resume(NETWORK_PARAMS, state, rng),
        }
    }

    /// Multiply throughput by 3-5x; the revert restores the pre-spike value
    pub fn simulate_bandwidth_spike(&mut self, duration: Duration) -> Revert {
        let factor = self.process.rng().gen_range(3.0..=5.0);
        self.scale_for(duration, factor)
    }

    /// Throttle throughput to 0.5-0.7x; the revert restores the prior value
    pub fn simulate_network_congestion(&mut self, duration: Duration) -> Revert {
        let factor = self.process.rng().gen_range(0.5..=0.7);
        self.scale_for(duration, factor)
    }

    pub fn restore(&mut self, value: f64) -> f64 {
        self.process.set_value(value)
    }

    fn scale_for(&mut self, duration: Duration, factor: f64) -> Revert {
        let before = self.process.current();
        let value = self.process.set_value(before * factor);
        log::debug!(
            "network x{:.2} for {}s: {:.1} -> {:.1} MB/s",
            factor,
            duration.as_secs(),
            before,
            value
        );
        Revert::new(duration, ScheduledTask::RestoreNetwork { value: before })
    }

    fn seasonal_target(&self, now: DateTime<Utc>) -> (DayPeriod, f64) {
        let local = local_time(now);
        let period = DayPeriod::classify(local);
        let mut multiplier = hourly_multiplier(local.hour());
        if period == DayPeriod::Weekend {
            multiplier *= WEEKEND_TRAFFIC;
        }
        (period, self.process.params().baseline * multiplier)
    }
}

impl MetricGenerator for NetworkGenerator {
    fn kind(&self) -> MetricKind {
        MetricKind::Network
    }

    fn next_value(&mut self, now: DateTime<Utc>, external_influence: f64) -> f64 {
        let (period, target) = self.seasonal_target(now);
        let trend = self.process.trend_component();
        let noise = self.process.noise_component();
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

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_bandwidth_spike_and_restore() {
        let mut network = NetworkGenerator::new(2.0, StdRng::seed_from_u64(1));
        let revert = network.simulate_bandwidth_spike(Duration::from_secs(15));

        assert!((6.0..=10.0).contains(&network.current()));
        assert_eq!(revert.after, Duration::from_secs(15));
        assert_eq!(revert.task, ScheduledTask::RestoreNetwork { value: 2.0 });

        assert_eq!(network.restore(2.0), 2.0);
        assert_eq!(network.current_state().history.last(), Some(&2.0));
    }

    #[test]
    fn test_congestion_throttles() {
        let mut network = NetworkGenerator::new(4.0, StdRng::seed_from_u64(2));
        network.simulate_network_congestion(Duration::from_secs(20));
        assert!((2.0..=2.8).contains(&network.current()));
    }

    #[test]
    fn test_spike_never_exceeds_bound() {
        let mut network = NetworkGenerator::new(14.0, StdRng::seed_from_u64(3));
        network.simulate_bandwidth_spike(Duration::from_secs(1));
        assert_eq!(network.current(), 15.0);
    }

    #[test]
    fn test_hourly_table_has_night_lull() {
        assert!(hourly_multiplier(3) < hourly_multiplier(9));
        assert!(hourly_multiplier(3) < hourly_multiplier(20));
    }
}
