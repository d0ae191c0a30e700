use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::SimError;

/// Maximum number of alerts and logs kept in a snapshot (newest first).
pub const RETENTION_CAP: usize = 100;

/// The four simulated metrics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricKind {
    Cpu,
    Memory,
    Disk,
    Network,
}

impl MetricKind {
    /// Fixed evaluation order used by alerting
    pub const ALL: [MetricKind; 4] = [
        MetricKind::Cpu,
        MetricKind::Memory,
        MetricKind::Disk,
        MetricKind::Network,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MetricKind::Cpu => "cpu",
            MetricKind::Memory => "memory",
            MetricKind::Disk => "disk",
            MetricKind::Network => "network",
        }
    }

    /// Unit suffix used in human readable messages
    pub fn unit(&self) -> &'static str {
        match self {
            MetricKind::Network => " MB/s",
            _ => "%",
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MetricKind {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cpu" => Ok(MetricKind::Cpu),
            "memory" | "mem" => Ok(MetricKind::Memory),
            "disk" => Ok(MetricKind::Disk),
            "network" | "net" => Ok(MetricKind::Network),
            other => Err(SimError::unknown_metric(other)),
        }
    }
}

/// State of one metric series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricState {
    pub current: f64,
    pub history: Vec<f64>,
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertType {
    Info,
    Warning,
    Error,
}

/// A single alert shown to operators
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "type")]
    pub alert_type: AlertType,
    pub message: String,
    pub acknowledged: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Warning,
    Error,
    Debug,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Info => "info",
            LogLevel::Warning => "warning",
            LogLevel::Error => "error",
            LogLevel::Debug => "debug",
        }
    }
}

/// A synthesized log line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub service: String,
    pub message: String,
}

/// Monotonic id source for alerts and log entries
#[derive(Debug, Clone)]
pub struct IdSequence {
    prefix: &'static str,
    next: u64,
}

impl IdSequence {
    pub fn new(prefix: &'static str) -> Self {
        Self { prefix, next: 1 }
    }

    /// Ids stay unique across engines restored from older snapshots
    pub fn next_id(&mut self, now: DateTime<Utc>) -> String {
        let id = format!("{}-{}-{}", self.prefix, now.timestamp_millis(), self.next);
        self.next += 1;
        id
    }
}

/// Per-metric last update timestamps
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LastUpdated {
    pub cpu: DateTime<Utc>,
    pub memory: DateTime<Utc>,
    pub disk: DateTime<Utc>,
    pub network: DateTime<Utc>,
}

impl LastUpdated {
    pub fn all(at: DateTime<Utc>) -> Self {
        Self {
            cpu: at,
            memory: at,
            disk: at,
            network: at,
        }
    }

    pub fn set(&mut self, kind: MetricKind, at: DateTime<Utc>) {
        match kind {
            MetricKind::Cpu => self.cpu = at,
            MetricKind::Memory => self.memory = at,
            MetricKind::Disk => self.disk = at,
            MetricKind::Network => self.network = at,
        }
    }
}

/// Complete engine snapshot handed to callers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemState {
    pub cpu: MetricState,
    pub memory: MetricState,
    pub disk: MetricState,
    pub network: MetricState,
    pub alerts: VecDeque<Alert>,
    pub logs: VecDeque<LogEntry>,
    pub last_updated: LastUpdated,
}

impl SystemState {
    pub fn metric(&self, kind: MetricKind) -> &MetricState {
        match kind {
            MetricKind::Cpu => &self.cpu,
            MetricKind::Memory => &self.memory,
            MetricKind::Disk => &self.disk,
            MetricKind::Network => &self.network,
        }
    }

    pub(crate) fn metric_mut(&mut self, kind: MetricKind) -> &mut MetricState {
        match kind {
            MetricKind::Cpu => &mut self.cpu,
            MetricKind::Memory => &mut self.memory,
            MetricKind::Disk => &mut self.disk,
            MetricKind::Network => &mut self.network,
        }
    }

    /// Prepend an alert, dropping the oldest past the retention cap
    pub(crate) fn push_alert(&mut self, alert: Alert) {
        self.alerts.push_front(alert);
        self.alerts.truncate(RETENTION_CAP);
    }

    /// Prepend a log entry, dropping the oldest past the retention cap
    pub(crate) fn push_log(&mut self, entry: LogEntry) {
        self.logs.push_front(entry);
        self.logs.truncate(RETENTION_CAP);
    }
}
