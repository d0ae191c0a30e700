use chrono::{DateTime, Local, Utc};
use colored::*;

use crate::core::telemetry::{
    Alert, AlertType, LogEntry, LogLevel, MetricKind, SystemState, Thresholds,
};

const SPARK_BLOCKS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Format timestamp in local time (HH:MM:SS)
pub fn format_time(time: DateTime<Utc>) -> String {
    let local: DateTime<Local> = time.into();
    local.format("%H:%M:%S").to_string()
}

/// Render the newest `width` values as a block sparkline scaled to `[floor, ceiling]`
pub fn sparkline(values: &[f64], width: usize, floor: f64, ceiling: f64) -> String {
    let span = (ceiling - floor).max(f64::EPSILON);
    let start = values.len().saturating_sub(width);
    values[start..]
        .iter()
        .map(|&v| {
            let ratio = ((v - floor) / span).clamp(0.0, 1.0);
            let index = (ratio * (SPARK_BLOCKS.len() - 1) as f64).round() as usize;
            SPARK_BLOCKS[index]
        })
        .collect()
}

/// One metric's value coloured by its thresholds
pub fn format_metric(kind: MetricKind, value: f64, thresholds: &Thresholds) -> ColoredString {
    let pair = thresholds.get(kind);
    let text = format!("{:>5.1}{}", value, kind.unit());
    if value >= pair.critical {
        text.red().bold()
    } else if value >= pair.warning {
        text.yellow()
    } else {
        text.green()
    }
}

/// Single status line for the whole snapshot
pub fn format_summary(state: &SystemState, thresholds: &Thresholds) -> String {
    MetricKind::ALL
        .iter()
        .map(|&kind| {
            let metric = state.metric(kind);
            let ceiling = if kind == MetricKind::Network { 15.0 } else { 100.0 };
            format!(
                "{} {} {}",
                kind.as_str().to_uppercase().bold(),
                format_metric(kind, metric.current, thresholds),
                sparkline(&metric.history, 12, 0.0, ceiling).dimmed()
            )
        })
        .collect::<Vec<_>>()
        .join("  ")
}

pub fn format_alert(alert: &Alert) -> String {
    let tag = match alert.alert_type {
        AlertType::Info => "INFO".blue(),
        AlertType::Warning => "WARN".yellow(),
        AlertType::Error => "CRIT".red().bold(),
    };
    format!(
        "{} [{}] {}",
        format_time(alert.timestamp).dimmed(),
        tag,
        alert.message
    )
}

pub fn format_log(entry: &LogEntry) -> String {
    let level = match entry.level {
        LogLevel::Info => entry.level.as_str().green(),
        LogLevel::Warning => entry.level.as_str().yellow(),
        LogLevel::Error => entry.level.as_str().red(),
        LogLevel::Debug => entry.level.as_str().dimmed(),
    };
    format!(
        "{} {:<7} {:<14} {}",
        format_time(entry.timestamp).dimmed(),
        level,
        entry.service.cyan(),
        entry.message
    )
}
