//! Log line synthesis.
//!
//! Templates are typed segment lists; every slot names a [`Token`] whose
//! value is drawn from that token's candidate list. Incident templates are a
//! separate set, only used when a metric is past its incident threshold.

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use super::metrics::{IdSequence, LogEntry, LogLevel, MetricKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    UserId,
    Time,
    Ip,
    Endpoint,
    Status,
    Count,
    Table,
    Path,
    Host,
    Job,
    Process,
    /// The triggering metric value, formatted with one decimal
    Value,
}

impl Token {
    pub fn candidates(&self) -> &'static [&'static str] {
        match self {
            Token::UserId => &["u-1042", "u-2291", "u-3307", "u-4815", "u-5120", "u-7734"],
            Token::Time => &["12", "35", "87", "142", "230", "512", "1250"],
            Token::Ip => &["10.0.1.15", "10.0.2.44", "172.16.0.8", "192.168.1.21", "10.0.3.102"],
            Token::Endpoint => &[
                "/api/users",
                "/api/orders",
                "/api/auth/login",
                "/api/products",
                "/health",
            ],
            Token::Status => &["200", "201", "204", "304", "400", "404", "500", "503"],
            Token::Count => &["3", "12", "48", "150", "512", "1024"],
            Token::Table => &["users", "orders", "sessions", "products", "audit_log"],
            Token::Path => &["/var/log/app", "/var/lib/postgresql", "/tmp/uploads", "/data/cache"],
            Token::Host => &["web-01", "web-02", "db-primary", "cache-01", "worker-03"],
            Token::Job => &["nightly-report", "cache-warmup", "index-rebuild", "log-rotation"],
            Token::Process => &["java", "node", "postgres", "python", "nginx", "chrome"],
            Token::Value => &[],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment {
    Text(&'static str),
    Slot(Token),
}

use Segment::{Slot, Text};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogTemplate {
    pub level: LogLevel,
    pub service: &'static str,
    pub segments: &'static [Segment],
}

impl LogTemplate {
    const fn new(level: LogLevel, service: &'static str, segments: &'static [Segment]) -> Self {
        Self {
            level,
            service,
            segments,
        }
    }

    /// Substitute every slot; `value` fills [`Token::Value`]
    pub fn render(&self, rng: &mut StdRng, value: Option<f64>) -> String {
        let mut message = String::new();
        for segment in self.segments {
            match segment {
                Text(text) => message.push_str(text),
                Slot(Token::Value) => match value {
                    Some(v) => message.push_str(&format!("{:.1}", v)),
                    None => message.push_str("n/a"),
                },
                Slot(token) => {
                    message.push_str(token.candidates().choose(rng).copied().unwrap_or("?"))
                }
            }
        }
        message
    }
}

const BACKGROUND_TEMPLATES: &[LogTemplate] = &[
    LogTemplate::new(
        LogLevel::Info,
        "auth-service",
        &[
            Text("User "),
            Slot(Token::UserId),
            Text(" logged in from "),
            Slot(Token::Ip),
        ],
    ),
    LogTemplate::new(
        LogLevel::Info,
        "auth-service",
        &[Text("Session refreshed for user "), Slot(Token::UserId)],
    ),
    LogTemplate::new(
        LogLevel::Info,
        "api-gateway",
        &[
            Text("GET "),
            Slot(Token::Endpoint),
            Text(" "),
            Slot(Token::Status),
            Text(" in "),
            Slot(Token::Time),
            Text("ms"),
        ],
    ),
    LogTemplate::new(
        LogLevel::Info,
        "api-gateway",
        &[
            Text("POST "),
            Slot(Token::Endpoint),
            Text(" completed in "),
            Slot(Token::Time),
            Text("ms"),
        ],
    ),
    LogTemplate::new(
        LogLevel::Info,
        "scheduler",
        &[
            Text("Job "),
            Slot(Token::Job),
            Text(" finished in "),
            Slot(Token::Time),
            Text("ms"),
        ],
    ),
    LogTemplate::new(
        LogLevel::Info,
        "database",
        &[Text("Vacuum completed on table "), Slot(Token::Table)],
    ),
    LogTemplate::new(
        LogLevel::Debug,
        "cache",
        &[
            Text("Evicted "),
            Slot(Token::Count),
            Text(" keys from "),
            Slot(Token::Host),
        ],
    ),
    LogTemplate::new(
        LogLevel::Debug,
        "database",
        &[
            Text("Query on "),
            Slot(Token::Table),
            Text(" returned "),
            Slot(Token::Count),
            Text(" rows in "),
            Slot(Token::Time),
            Text("ms"),
        ],
    ),
    LogTemplate::new(
        LogLevel::Debug,
        "api-gateway",
        &[
            Text("Routing "),
            Slot(Token::Endpoint),
            Text(" to "),
            Slot(Token::Host),
        ],
    ),
    LogTemplate::new(
        LogLevel::Warning,
        "api-gateway",
        &[
            Text("Slow response on "),
            Slot(Token::Endpoint),
            Text(": "),
            Slot(Token::Time),
            Text("ms"),
        ],
    ),
    LogTemplate::new(
        LogLevel::Warning,
        "database",
        &[
            Text("Lock wait on table "),
            Slot(Token::Table),
            Text(" exceeded "),
            Slot(Token::Time),
            Text("ms"),
        ],
    ),
    LogTemplate::new(
        LogLevel::Warning,
        "storage",
        &[
            Text("Directory "),
            Slot(Token::Path),
            Text(" holds "),
            Slot(Token::Count),
            Text(" stale files"),
        ],
    ),
    LogTemplate::new(
        LogLevel::Warning,
        "auth-service",
        &[
            Text("Failed login attempt for user "),
            Slot(Token::UserId),
            Text(" from "),
            Slot(Token::Ip),
        ],
    ),
    LogTemplate::new(
        LogLevel::Error,
        "api-gateway",
        &[
            Text("Upstream "),
            Slot(Token::Host),
            Text(" returned 502 for "),
            Slot(Token::Endpoint),
        ],
    ),
    LogTemplate::new(
        LogLevel::Error,
        "scheduler",
        &[
            Text("Job "),
            Slot(Token::Job),
            Text(" failed after "),
            Slot(Token::Count),
            Text(" retries"),
        ],
    ),
];

const CPU_INCIDENTS: &[LogTemplate] = &[
    LogTemplate::new(
        LogLevel::Error,
        "worker-pool",
        &[
            Text("Thread pool saturated on "),
            Slot(Token::Host),
            Text(", CPU at "),
            Slot(Token::Value),
            Text("%"),
        ],
    ),
    LogTemplate::new(
        LogLevel::Error,
        "api-gateway",
        &[
            Text("Request timeout on "),
            Slot(Token::Endpoint),
            Text(" under CPU pressure ("),
            Slot(Token::Value),
            Text("%)"),
        ],
    ),
    LogTemplate::new(
        LogLevel::Error,
        "monitor",
        &[
            Text("Process "),
            Slot(Token::Process),
            Text(" pinned CPU at "),
            Slot(Token::Value),
            Text("%"),
        ],
    ),
];

const MEMORY_INCIDENTS: &[LogTemplate] = &[
    LogTemplate::new(
        LogLevel::Error,
        "kernel",
        &[
            Text("OOM killer terminated "),
            Slot(Token::Process),
            Text(" at "),
            Slot(Token::Value),
            Text("% memory"),
        ],
    ),
    LogTemplate::new(
        LogLevel::Error,
        "cache",
        &[
            Text("Allocation failed on "),
            Slot(Token::Host),
            Text(", memory at "),
            Slot(Token::Value),
            Text("%"),
        ],
    ),
    LogTemplate::new(
        LogLevel::Error,
        "jvm",
        &[
            Text("GC overhead limit exceeded, heap at "),
            Slot(Token::Value),
            Text("%"),
        ],
    ),
];

const DISK_INCIDENTS: &[LogTemplate] = &[
    LogTemplate::new(
        LogLevel::Error,
        "storage",
        &[
            Text("No space left on device writing "),
            Slot(Token::Path),
            Text(" ("),
            Slot(Token::Value),
            Text("% used)"),
        ],
    ),
    LogTemplate::new(
        LogLevel::Error,
        "database",
        &[
            Text("WAL write failed on "),
            Slot(Token::Table),
            Text(", disk at "),
            Slot(Token::Value),
            Text("%"),
        ],
    ),
];

const NETWORK_INCIDENTS: &[LogTemplate] = &[
    LogTemplate::new(
        LogLevel::Error,
        "load-balancer",
        &[
            Text("Dropping connections from "),
            Slot(Token::Ip),
            Text(", throughput "),
            Slot(Token::Value),
            Text(" MB/s"),
        ],
    ),
    LogTemplate::new(
        LogLevel::Error,
        "api-gateway",
        &[
            Text("Upstream "),
            Slot(Token::Host),
            Text(" unreachable, link saturated at "),
            Slot(Token::Value),
            Text(" MB/s"),
        ],
    ),
];

/// Level above which a metric produces incident logs; stricter than alerting
pub fn incident_threshold(kind: MetricKind) -> f64 {
    match kind {
        MetricKind::Cpu | MetricKind::Memory => 85.0,
        MetricKind::Disk => 90.0,
        MetricKind::Network => 12.0,
    }
}

fn incident_templates(kind: MetricKind) -> &'static [LogTemplate] {
    match kind {
        MetricKind::Cpu => CPU_INCIDENTS,
        MetricKind::Memory => MEMORY_INCIDENTS,
        MetricKind::Disk => DISK_INCIDENTS,
        MetricKind::Network => NETWORK_INCIDENTS,
    }
}

pub struct LogSynthesizer {
    ids: IdSequence,
    rng: StdRng,
}

impl LogSynthesizer {
    pub fn new(rng: StdRng) -> Self {
        Self {
            ids: IdSequence::new("log"),
            rng,
        }
    }

    pub fn generate_random_log(&mut self, now: DateTime<Utc>) -> LogEntry {
        let template = BACKGROUND_TEMPLATES
            .choose(&mut self.rng)
            .copied()
            .unwrap_or(BACKGROUND_TEMPLATES[0]);
        self.render(&template, None, now)
    }

    /// Incident log for `kind` at `value`, or `None` below the incident level
    pub fn generate_correlated_error_log(
        &mut self,
        kind: MetricKind,
        value: f64,
        now: DateTime<Utc>,
    ) -> Option<LogEntry> {
        if value < incident_threshold(kind) {
            return None;
        }
        let template = incident_templates(kind).choose(&mut self.rng).copied()?;
        Some(self.render(&template, Some(value), now))
    }

    /// Plain entry recorded for an injected event
    pub fn event_log(&mut self, message: String, now: DateTime<Utc>) -> LogEntry {
        LogEntry {
            id: self.ids.next_id(now),
            timestamp: now,
            level: LogLevel::Info,
            service: "simulator".to_string(),
            message,
        }
    }

    fn render(
        &mut self,
        template: &LogTemplate,
        value: Option<f64>,
        now: DateTime<Utc>,
    ) -> LogEntry {
        LogEntry {
            id: self.ids.next_id(now),
            timestamp: now,
            level: template.level,
            service: template.service.to_string(),
            message: template.render(&mut self.rng, value),
        }
    }
}
