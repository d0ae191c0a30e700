use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use telesim::core::config::{EngineConfig, InitialValues};
use telesim::core::telemetry::{
    Engine, ManualClock, MetricKind, ScheduledTask, ThresholdPair, Thresholds, RETENTION_CAP,
};
use telesim::SimError;

fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 6, 10, 0, 0).unwrap()
}

fn quiet_config(initial: InitialValues) -> EngineConfig {
    EngineConfig {
        seed: Some(1234),
        initial,
        background_log_probability: 0.0,
        random_alert_probability: 0.0,
        ..Default::default()
    }
}

fn engine_with(config: &EngineConfig) -> (Engine, ManualClock) {
    let clock = ManualClock::new(start());
    let engine = Engine::with_config(None, config, Arc::new(clock.clone())).unwrap();
    (engine, clock)
}

fn pending_applies(engine: &Engine, rule: usize) -> usize {
    engine
        .scheduler()
        .pending()
        .filter(|task| **task == ScheduledTask::ApplyCorrelation { rule })
        .count()
}

#[test]
fn test_invariants_hold_across_ticks_and_events() {
    let (mut engine, clock) = engine_with(&EngineConfig {
        seed: Some(99),
        ..Default::default()
    });
    let events = [
        "cpuSpike",
        "memoryLeak",
        "garbageCollection",
        "diskCleanup",
        "largeDiskWrite",
        "networkSpike",
        "networkCongestion",
    ];

    for tick in 0..600 {
        clock.advance_secs(1);
        if tick % 40 == 0 {
            engine.trigger_event(events[(tick / 40) % events.len()]);
        }
        let state = engine.update_metrics(None);

        for kind in MetricKind::ALL {
            let metric = state.metric(kind);
            let (low, high) = match kind {
                MetricKind::Network => (0.1, 15.0),
                _ => (0.0, 100.0),
            };
            assert!(metric.current >= low && metric.current <= high);
            assert!(metric.history.len() <= 60);
            let min = metric.history.iter().copied().fold(f64::INFINITY, f64::min);
            let max = metric.history.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            assert_eq!(metric.min, min);
            assert_eq!(metric.max, max);
        }
        assert!(state.alerts.len() <= RETENTION_CAP);
        assert!(state.logs.len() <= RETENTION_CAP);
    }
}

#[test]
fn test_correlation_guard_prevents_duplicate_effects() {
    let (mut engine, clock) = engine_with(&quiet_config(InitialValues {
        cpu: 80.0,
        ..Default::default()
    }));

    engine.trigger_event("cpuSpike");
    engine.trigger_event("cpuSpike");
    assert!(engine.correlation_rules()[0].active);
    assert_eq!(pending_applies(&engine, 0), 1);

    // The delayed effect lands once, after the 10s delay
    clock.advance_secs(9);
    engine.run_due_tasks();
    assert!(!engine.memory().is_leaking());
    clock.advance_secs(1);
    engine.run_due_tasks();
    assert!(engine.memory().is_leaking());
    assert_eq!(pending_applies(&engine, 0), 0);

    // Still inside delay + duration: another spike does not re-arm it
    engine.trigger_event("cpuSpike");
    assert_eq!(pending_applies(&engine, 0), 0);

    clock.advance_secs(60);
    engine.run_due_tasks();
    assert!(!engine.correlation_rules()[0].active);
    assert!(!engine.memory().is_leaking());
}

#[test]
fn test_memory_leak_event_raises_memory_trend() {
    let (mut engine, clock) = engine_with(&quiet_config(InitialValues::default()));

    // Memory ticks every 2s by default, so ticks at 2s..58s carry the leak
    engine.trigger_event("memoryLeak");
    let rate = engine.memory().leak_rate();
    assert!((15.0 - 1e-6..=30.0 + 1e-6).contains(&(rate * 29.0)));

    for _ in 0..29 {
        clock.advance_secs(2);
        engine.update_metrics(Some(MetricKind::Memory));
    }
    let contributed = engine.memory().leak_accumulated();
    assert!((contributed - rate * 29.0).abs() < 1e-6);
    assert!((15.0 - 1e-6..=30.0 + 1e-6).contains(&contributed));

    clock.advance_secs(2);
    engine.update_metrics(Some(MetricKind::Memory));
    assert!(!engine.memory().is_leaking());
    assert_eq!(engine.memory().leak_rate(), 0.0);
}

#[test]
fn test_second_leak_while_active_is_noop() {
    let (mut engine, _) = engine_with(&quiet_config(InitialValues::default()));

    engine.trigger_event("memoryLeak");
    let rate = engine.memory().leak_rate();
    let alerts = engine.get_state().alerts.len();
    let pending = engine.pending_tasks();

    engine.trigger_event("memoryLeak");
    assert_eq!(engine.memory().leak_rate(), rate);
    assert_eq!(engine.get_state().alerts.len(), alerts);
    assert_eq!(engine.pending_tasks(), pending);
}

#[test]
fn test_one_threshold_alert_per_update() {
    let zero = ThresholdPair::new(0.0, 0.0);
    let config = EngineConfig {
        thresholds: Thresholds {
            cpu: zero,
            memory: zero,
            disk: zero,
            network: zero,
        },
        ..quiet_config(InitialValues::default())
    };
    let (mut engine, clock) = engine_with(&config);

    clock.advance_secs(1);
    let state = engine.update_metrics(None);
    assert_eq!(state.alerts.len(), 1);
    assert!(state.alerts[0].message.starts_with("Critical CPU usage"));

    clock.advance_secs(1);
    let state = engine.update_metrics(Some(MetricKind::Disk));
    assert_eq!(state.alerts.len(), 2);
    assert!(state.alerts[0].message.starts_with("Critical disk usage"));
}

#[test]
fn test_retention_cap_newest_first() {
    let config = EngineConfig {
        seed: Some(5),
        background_log_probability: 1.0,
        random_alert_probability: 1.0,
        ..Default::default()
    };
    let (mut engine, clock) = engine_with(&config);

    let mut newest = String::new();
    for _ in 0..150 {
        clock.advance_secs(1);
        let state = engine.update_metrics(Some(MetricKind::Network));
        newest = state.alerts[0].id.clone();
    }

    let state = engine.get_state();
    assert_eq!(state.alerts.len(), RETENTION_CAP);
    assert_eq!(state.logs.len(), RETENTION_CAP);
    assert_eq!(state.alerts[0].id, newest);
    assert!(state.alerts[0].timestamp >= state.alerts[RETENTION_CAP - 1].timestamp);
}

#[test]
fn test_same_seed_same_run() {
    let config = EngineConfig {
        seed: Some(2024),
        ..Default::default()
    };
    let (mut a, clock_a) = engine_with(&config);
    let (mut b, clock_b) = engine_with(&config);

    for _ in 0..50 {
        clock_a.advance_secs(1);
        clock_b.advance_secs(1);
        a.update_metrics(None);
        b.update_metrics(None);
    }
    a.trigger_event("networkSpike");
    b.trigger_event("networkSpike");

    assert_eq!(a.get_state(), b.get_state());
}

#[test]
fn test_resume_from_snapshot() {
    let (mut engine, clock) = engine_with(&EngineConfig {
        seed: Some(3),
        ..Default::default()
    });
    for _ in 0..20 {
        clock.advance_secs(1);
        engine.update_metrics(None);
    }
    let snapshot = engine.get_state();

    let resumed = Engine::with_config(
        Some(snapshot.clone()),
        &EngineConfig::default(),
        Arc::new(clock.clone()),
    )
    .unwrap();
    let state = resumed.get_state();
    assert_eq!(state.cpu, snapshot.cpu);
    assert_eq!(state.network, snapshot.network);
    assert_eq!(state.alerts, snapshot.alerts);
    assert_eq!(state.last_updated, snapshot.last_updated);
}

#[test]
fn test_non_finite_inputs_never_reach_the_series() {
    let nan_start = quiet_config(InitialValues {
        cpu: f64::NAN,
        ..Default::default()
    });
    let clock = ManualClock::new(start());
    assert!(matches!(
        Engine::with_config(None, &nan_start, Arc::new(clock.clone())),
        Err(SimError::Config(_))
    ));

    let (engine, _) = engine_with(&quiet_config(InitialValues::default()));
    let mut snapshot = engine.get_state();
    snapshot.cpu.current = f64::NAN;
    snapshot.cpu.history[59] = f64::NAN;
    snapshot.network.current = f64::INFINITY;

    let mut resumed = Engine::with_config(
        Some(snapshot),
        &quiet_config(InitialValues::default()),
        Arc::new(clock.clone()),
    )
    .unwrap();
    for _ in 0..10 {
        clock.advance_secs(1);
        let state = resumed.update_metrics(None);
        for metric in [&state.cpu, &state.network] {
            assert!(metric.current.is_finite());
            assert!(metric.min.is_finite() && metric.max.is_finite());
            assert!(metric.history.iter().all(|v| v.is_finite()));
        }
        assert!((0.0..=100.0).contains(&state.cpu.current));
        assert!((0.1..=15.0).contains(&state.network.current));
    }
}

#[test]
fn test_overlapping_cpu_spikes_release_independently() {
    let (mut engine, clock) = engine_with(&quiet_config(InitialValues::default()));
    engine.trigger_event("cpuSpike");
    engine.trigger_event("cpuSpike");

    let pending_release = |engine: &Engine| -> f64 {
        engine
            .scheduler()
            .pending()
            .filter_map(|task| match task {
                ScheduledTask::ReleaseProcess { amount, .. } => Some(*amount),
                _ => None,
            })
            .sum()
    };

    // Usage always equals the share of spikes not yet released
    for _ in 0..5 {
        let usage: f64 = engine.process_usage().values().sum();
        assert!((usage - pending_release(&engine)).abs() < 1e-6);
        clock.advance_secs(1);
        engine.run_due_tasks();
    }
    assert!(engine.process_usage().is_empty());
    assert_eq!(pending_release(&engine), 0.0);
}

#[test]
fn test_new_rejects_inverted_thresholds() {
    let mut thresholds = Thresholds::default();
    thresholds.disk = ThresholdPair::new(97.0, 90.0);

    assert!(matches!(
        Engine::new(None, Some(thresholds)),
        Err(SimError::InvalidThresholds(_))
    ));
}

#[test]
fn test_update_thresholds_changes_alerting() {
    let (mut engine, clock) = engine_with(&quiet_config(InitialValues {
        cpu: 50.0,
        ..Default::default()
    }));
    let thresholds = Thresholds {
        cpu: ThresholdPair::new(1.0, 2.0),
        ..Default::default()
    };
    engine.update_thresholds(thresholds).unwrap();
    assert_eq!(engine.thresholds().cpu, ThresholdPair::new(1.0, 2.0));

    clock.advance_secs(1);
    let state = engine.update_metrics(Some(MetricKind::Cpu));
    assert!(state.alerts[0].message.starts_with("Critical CPU usage"));
}

#[test]
fn test_snapshot_is_json_serializable() {
    let (mut engine, clock) = engine_with(&EngineConfig {
        seed: Some(8),
        background_log_probability: 1.0,
        ..Default::default()
    });
    clock.advance_secs(1);
    engine.update_metrics(None);

    let json = serde_json::to_value(engine.get_state()).unwrap();
    for key in ["cpu", "memory", "disk", "network", "alerts", "logs", "last_updated"] {
        assert!(json.get(key).is_some(), "missing {}", key);
    }
    assert_eq!(json["cpu"]["history"].as_array().unwrap().len(), 60);
    assert!(json["logs"][0]["level"].is_string());
}
