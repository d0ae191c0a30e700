use std::collections::VecDeque;

pub const DEFAULT_HISTORY_SIZE: usize = 60;

/// Circular buffer holding the most recent values of one metric
#[derive(Debug, Clone)]
pub struct MetricHistory {
    capacity: usize,
    values: VecDeque<f64>,
}

impl MetricHistory {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_SIZE)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            values: VecDeque::with_capacity(capacity),
        }
    }

    /// Buffer pre-filled to capacity with `value`
    pub fn filled(value: f64) -> Self {
        let mut history = Self::new();
        history.values.extend(std::iter::repeat(value).take(history.capacity));
        history
    }

    /// Buffer seeded from an existing series, keeping only the newest values
    pub fn from_values<I: IntoIterator<Item = f64>>(values: I) -> Self {
        let mut history = Self::new();
        for value in values {
            history.push(value);
        }
        history
    }

    pub fn push(&mut self, value: f64) {
        if self.values.len() >= self.capacity {
            self.values.pop_front();
        }
        self.values.push_back(value);
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn min(&self) -> Option<f64> {
        self.values.iter().copied().reduce(f64::min)
    }

    pub fn max(&self) -> Option<f64> {
        self.values.iter().copied().reduce(f64::max)
    }

    pub fn to_vec(&self) -> Vec<f64> {
        self.values.iter().copied().collect()
    }
}

impl Default for MetricHistory {
    fn default() -> Self {
        Self::new()
    }
}
