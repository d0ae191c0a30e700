use chrono::{Duration, TimeZone, Utc};
use telesim::commands::simulate::{run_offline, run_offline_from};
use telesim::core::config::EngineConfig;

fn seeded() -> EngineConfig {
    EngineConfig {
        seed: Some(11),
        ..Default::default()
    }
}

#[test]
fn test_offline_run_is_reproducible() {
    let start = Utc.with_ymd_and_hms(2024, 3, 12, 10, 0, 0).unwrap();
    let a = run_offline_from(&seeded(), start, 120, &["cpuSpike"]).unwrap();
    let b = run_offline_from(&seeded(), start, 120, &["cpuSpike"]).unwrap();

    assert_eq!(a.cpu, b.cpu);
    assert_eq!(a.memory, b.memory);
    assert_eq!(a.disk, b.disk);
    assert_eq!(a.network, b.network);
    assert_eq!(a.alerts, b.alerts);
}

#[test]
fn test_offline_run_records_events() {
    let state = run_offline(&seeded(), 10, &["memoryLeak", "diskCleanup"]).unwrap();

    let simulator_logs = state
        .logs
        .iter()
        .filter(|entry| entry.service == "simulator")
        .count();
    assert_eq!(simulator_logs, 2);
    assert!(state
        .alerts
        .iter()
        .any(|alert| alert.message.starts_with("Memory leak detected")));
}

#[test]
fn test_offline_run_ticks_at_cadence() {
    let start = Utc.with_ymd_and_hms(2024, 3, 16, 23, 30, 0).unwrap();
    let state = run_offline_from(&seeded(), start, 4, &[]).unwrap();

    // Disk has not ticked yet, cpu last ticked at 3s
    assert_eq!(state.last_updated.disk, start);
    assert_eq!(state.last_updated.cpu, start + Duration::seconds(3));
    assert_eq!(state.last_updated.memory, start + Duration::seconds(4));
    assert_eq!(state.last_updated.network, start + Duration::seconds(4));
}
