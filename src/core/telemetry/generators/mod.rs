//! Per-metric stochastic generators.
//!
//! Every generator composes a [`StochasticProcess`] by value and adds its own
//! seasonal shape and event methods on top. Each tick the next value is
//! `current + trend + noise + seasonal + spike + external`, clamped to the
//! metric bounds and rounded to one decimal.

mod cpu;
mod disk;
mod memory;
mod network;

pub use cpu::CpuGenerator;
pub use disk::DiskGenerator;
pub use memory::MemoryGenerator;
pub use network::NetworkGenerator;

use chrono::{DateTime, Datelike, Local, NaiveDateTime, Timelike, Utc, Weekday};
use rand::rngs::StdRng;
use rand::Rng;

use super::history::MetricHistory;
use super::metrics::{MetricKind, MetricState};

const TREND_DECAY: f64 = 0.95;
const TREND_STEP: f64 = 0.1;
const SEASONAL_PULL: f64 = 0.05;
const BUSINESS_SPIKE_PROBABILITY: f64 = 0.03;
const QUIET_SPIKE_PROBABILITY: f64 = 0.01;
const SPIKE_UP_PROBABILITY: f64 = 0.7;

/// Common contract of the four metric generators
pub trait MetricGenerator: Send {
    fn kind(&self) -> MetricKind;

    /// Advance one tick and return the new rounded value
    fn next_value(&mut self, now: DateTime<Utc>, external_influence: f64) -> f64;

    fn current_state(&self) -> MetricState;

    fn current(&self) -> f64;

    /// Queue an influence consumed by the next tick
    fn apply_external_influence(&mut self, influence: f64);
}

/// Tuning knobs of one metric's process
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProcessParams {
    pub min_bound: f64,
    pub max_bound: f64,
    /// Resting level the seasonal component pulls toward
    pub baseline: f64,
    pub trend_strength: f64,
    pub noise_strength: f64,
    pub volatility: f64,
    pub seasonal_strength: f64,
    /// Constant per-tick drift
    pub drift: f64,
}

impl ProcessParams {
    pub fn range(&self) -> f64 {
        self.max_bound - self.min_bound
    }

    /// Clamp into bounds; non-finite values fall back to the baseline
    pub fn clamp(&self, value: f64) -> f64 {
        if value.is_finite() {
            value.clamp(self.min_bound, self.max_bound)
        } else {
            self.baseline.clamp(self.min_bound, self.max_bound)
        }
    }
}

/// Coarse classification of wall-clock time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayPeriod {
    BusinessHours,
    OffHours,
    Night,
    Weekend,
}

impl DayPeriod {
    /// Weekday 09-17 is business hours, 22-06 is night on any day
    pub fn classify(at: NaiveDateTime) -> Self {
        let hour = at.hour();
        if !(6..22).contains(&hour) {
            return DayPeriod::Night;
        }
        if matches!(at.weekday(), Weekday::Sat | Weekday::Sun) {
            return DayPeriod::Weekend;
        }
        if (9..17).contains(&hour) {
            DayPeriod::BusinessHours
        } else {
            DayPeriod::OffHours
        }
    }

    pub fn is_business_hours(&self) -> bool {
        matches!(self, DayPeriod::BusinessHours)
    }
}

/// Seasonal multipliers applied to a metric's baseline
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeasonalProfile {
    pub business_hours: f64,
    pub off_hours: f64,
    pub night: f64,
    pub weekend: f64,
}

impl SeasonalProfile {
    pub fn multiplier(&self, period: DayPeriod) -> f64 {
        match period {
            DayPeriod::BusinessHours => self.business_hours,
            DayPeriod::OffHours => self.off_hours,
            DayPeriod::Night => self.night,
            DayPeriod::Weekend => self.weekend,
        }
    }
}

/// Local wall-clock time used for seasonal classification
pub fn local_time(now: DateTime<Utc>) -> NaiveDateTime {
    now.with_timezone(&Local).naive_local()
}

pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Shared random-walk machinery behind every generator
#[derive(Debug, Clone)]
pub struct StochasticProcess {
    params: ProcessParams,
    current: f64,
    trend: f64,
    pending_influence: f64,
    history: MetricHistory,
    rng: StdRng,
}

impl StochasticProcess {
    pub fn new(params: ProcessParams, initial: f64, rng: StdRng) -> Self {
        let current = round1(params.clamp(initial));
        Self {
            params,
            current,
            trend: 0.0,
            pending_influence: 0.0,
            history: MetricHistory::filled(current),
            rng,
        }
    }

    /// Resume from a previous snapshot's series
    pub fn resume(params: ProcessParams, state: &MetricState, rng: StdRng) -> Self {
        let current = round1(params.clamp(state.current));
        let mut history = MetricHistory::from_values(
            state.history.iter().map(|&v| round1(params.clamp(v))),
        );
        if history.is_empty() {
            history = MetricHistory::filled(current);
        }
        Self {
            params,
            current,
            trend: 0.0,
            pending_influence: 0.0,
            history,
            rng,
        }
    }

    pub fn params(&self) -> &ProcessParams {
        &self.params
    }

    pub fn current(&self) -> f64 {
        self.current
    }

    pub fn rng(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    pub fn state(&self) -> MetricState {
        MetricState {
            current: self.current,
            history: self.history.to_vec(),
            min: self.history.min().unwrap_or(self.current),
            max: self.history.max().unwrap_or(self.current),
        }
    }

    /// Exponentially smoothed random walk scaled by trend strength
    pub fn trend_component(&mut self) -> f64 {
        self.trend = self.trend * TREND_DECAY + self.rng.gen_range(-0.5..0.5) * TREND_STEP;
        self.trend * self.params.trend_strength + self.params.drift
    }

    pub fn noise_component(&mut self) -> f64 {
        self.rng.gen_range(-0.5..0.5) * self.params.noise_strength * self.params.volatility
    }

    /// Pull toward `target`, scaled by seasonal strength
    pub fn seasonal_component(&self, target: f64) -> f64 {
        (target - self.current) * self.params.seasonal_strength * SEASONAL_PULL
    }

    /// Rare one-tick perturbation of 10-30% of the range, biased upward
    pub fn spike_component(&mut self, period: DayPeriod) -> f64 {
        let probability = if period.is_business_hours() {
            BUSINESS_SPIKE_PROBABILITY
        } else {
            QUIET_SPIKE_PROBABILITY
        };
        if !self.rng.gen_bool(probability) {
            return 0.0;
        }

        let magnitude = self.rng.gen_range(0.1..0.3) * self.params.range();
        if self.rng.gen_bool(SPIKE_UP_PROBABILITY) {
            magnitude
        } else {
            -magnitude
        }
    }

    pub fn queue_influence(&mut self, influence: f64) {
        if influence.is_finite() {
            self.pending_influence += influence;
        }
    }

    /// Consume the queued influence
    pub fn take_influence(&mut self) -> f64 {
        std::mem::take(&mut self.pending_influence)
    }

    /// Apply a composed delta as one tick
    pub fn advance(&mut self, delta: f64) -> f64 {
        let delta = if delta.is_finite() { delta } else { 0.0 };
        self.set_value(self.current + delta)
    }

    /// Write a value directly, bypassing the delta pipeline.
    ///
    /// A non-finite value leaves the series at its current level.
    pub fn set_value(&mut self, value: f64) -> f64 {
        let value = if value.is_finite() { value } else { self.current };
        self.current = round1(self.params.clamp(value));
        self.history.push(self.current);
        self.current
    }
}
