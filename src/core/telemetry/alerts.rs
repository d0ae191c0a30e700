//! Threshold alerting.
//!
//! Evaluates metric readings against the live thresholds and produces at
//! most one alert per evaluation.

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use super::generators::round1;
use super::metrics::{Alert, AlertType, IdSequence, MetricKind};
use crate::error::{Result, SimError};

/// Warning/critical pair for one metric
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdPair {
    pub warning: f64,
    pub critical: f64,
}

impl ThresholdPair {
    pub const fn new(warning: f64, critical: f64) -> Self {
        Self { warning, critical }
    }
}

/// Alert thresholds, in percent (network in MB/s)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    pub cpu: ThresholdPair,
    pub memory: ThresholdPair,
    pub disk: ThresholdPair,
    pub network: ThresholdPair,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            cpu: ThresholdPair::new(70.0, 90.0),
            memory: ThresholdPair::new(80.0, 95.0),
            disk: ThresholdPair::new(85.0, 95.0),
            network: ThresholdPair::new(10.0, 13.0),
        }
    }
}

impl Thresholds {
    pub fn get(&self, kind: MetricKind) -> ThresholdPair {
        match kind {
            MetricKind::Cpu => self.cpu,
            MetricKind::Memory => self.memory,
            MetricKind::Disk => self.disk,
            MetricKind::Network => self.network,
        }
    }

    /// Reject non-finite, negative or inverted (warning > critical) pairs
    pub fn validate(&self) -> Result<()> {
        for kind in MetricKind::ALL {
            let pair = self.get(kind);
            if !pair.warning.is_finite() || !pair.critical.is_finite() {
                return Err(SimError::invalid_thresholds(format!(
                    "{} thresholds must be finite",
                    kind
                )));
            }
            if pair.warning < 0.0 || pair.critical < 0.0 {
                return Err(SimError::invalid_thresholds(format!(
                    "{} thresholds must not be negative",
                    kind
                )));
            }
            if pair.warning > pair.critical {
                return Err(SimError::invalid_thresholds(format!(
                    "{} warning ({}) is above critical ({})",
                    kind, pair.warning, pair.critical
                )));
            }
        }
        Ok(())
    }
}

/// Background alerts unrelated to threshold state
const RANDOM_ALERTS: &[(AlertType, &str)] = &[
    (AlertType::Info, "Scheduled backup completed successfully"),
    (AlertType::Info, "Configuration reloaded on api-gateway"),
    (AlertType::Info, "New deployment rolled out to production"),
    (AlertType::Info, "TLS certificate renewed for api.internal"),
    (AlertType::Warning, "SSL certificate expires in 14 days"),
    (
        AlertType::Warning,
        "Replication lag on db-replica-2 above 5s",
    ),
    (AlertType::Warning, "Slow query detected on orders table"),
    (AlertType::Warning, "Cache hit ratio dropped below 80%"),
    (AlertType::Error, "Health check failed for payment-service"),
    (AlertType::Error, "Connection pool exhausted on db-primary"),
    (AlertType::Error, "Message queue consumer lagging behind"),
];

fn metric_label(kind: MetricKind) -> &'static str {
    match kind {
        MetricKind::Cpu => "CPU usage",
        MetricKind::Memory => "memory usage",
        MetricKind::Disk => "disk usage",
        MetricKind::Network => "network traffic",
    }
}

pub struct AlertEvaluator {
    thresholds: Thresholds,
    ids: IdSequence,
    rng: StdRng,
}

impl AlertEvaluator {
    pub fn new(thresholds: Thresholds, rng: StdRng) -> Self {
        Self {
            thresholds,
            ids: IdSequence::new("alert"),
            rng,
        }
    }

    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    /// Validate then replace the live thresholds; the old set stays on error
    pub fn set_thresholds(&mut self, thresholds: Thresholds) -> Result<()> {
        thresholds.validate()?;
        self.thresholds = thresholds;
        Ok(())
    }

    /// Evaluate all four metrics in priority order
    pub fn check_thresholds(
        &mut self,
        cpu: f64,
        memory: f64,
        disk: f64,
        network: f64,
        now: DateTime<Utc>,
    ) -> Option<Alert> {
        self.check_readings(
            &[
                (MetricKind::Cpu, cpu),
                (MetricKind::Memory, memory),
                (MetricKind::Disk, disk),
                (MetricKind::Network, network),
            ],
            now,
        )
    }

    /// Evaluate a subset of readings in CPU, memory, disk, network order,
    /// critical before warning, returning the first match only.
    pub fn check_readings(
        &mut self,
        readings: &[(MetricKind, f64)],
        now: DateTime<Utc>,
    ) -> Option<Alert> {
        for kind in MetricKind::ALL {
            let Some(&(_, value)) = readings.iter().find(|(k, _)| *k == kind) else {
                continue;
            };
            let pair = self.thresholds.get(kind);
            let shown = round1(value);

            let alert = if value >= pair.critical {
                Some((
                    AlertType::Error,
                    format!("Critical {}: {}{}", metric_label(kind), shown, kind.unit()),
                ))
            } else if value >= pair.warning {
                Some((
                    AlertType::Warning,
                    format!("High {}: {}{}", metric_label(kind), shown, kind.unit()),
                ))
            } else {
                None
            };

            if let Some((alert_type, message)) = alert {
                return Some(self.make_alert(alert_type, message, now));
            }
        }
        None
    }

    pub fn generate_random_alert(&mut self, now: DateTime<Utc>) -> Alert {
        let (alert_type, message) = RANDOM_ALERTS
            .choose(&mut self.rng)
            .copied()
            .unwrap_or((AlertType::Info, "System check completed"));
        self.make_alert(alert_type, message.to_string(), now)
    }

    /// Alert built outside threshold evaluation (event injection)
    pub fn make_alert(
        &mut self,
        alert_type: AlertType,
        message: String,
        now: DateTime<Utc>,
    ) -> Alert {
        Alert {
            id: self.ids.next_id(now),
            timestamp: now,
            alert_type,
            message,
            acknowledged: false,
        }
    }
}
