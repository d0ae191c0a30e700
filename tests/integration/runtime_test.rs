use std::thread::sleep;
use std::time::Duration;

use telesim::core::config::{EngineConfig, TickCadence};
use telesim::core::telemetry::{SimulationRuntime, ThresholdPair, Thresholds};
use telesim::SimError;

fn fast_config() -> EngineConfig {
    EngineConfig {
        seed: Some(17),
        cadence: TickCadence {
            cpu_ms: 15,
            memory_ms: 20,
            disk_ms: 30,
            network_ms: 10,
        },
        random_alert_probability: 0.0,
        ..Default::default()
    }
}

#[test]
fn test_runtime_ticks_and_publishes_snapshots() {
    let runtime = SimulationRuntime::new(&fast_config()).unwrap();
    let initial = runtime.latest();

    sleep(Duration::from_millis(300));
    let state = runtime.latest();
    assert!(state.last_updated.cpu > initial.last_updated.cpu);
    assert!(state.last_updated.network > initial.last_updated.network);
    assert_eq!(state.cpu.history.len(), 60);

    runtime.shutdown().unwrap();
}

#[test]
fn test_runtime_events_and_thresholds() {
    let runtime = SimulationRuntime::new(&fast_config()).unwrap();

    runtime.trigger_event("garbageCollection").unwrap();
    runtime.trigger_event("notAnEvent").unwrap();

    let mut inverted = Thresholds::default();
    inverted.network = ThresholdPair::new(14.0, 12.0);
    assert!(matches!(
        runtime.update_thresholds(inverted),
        Err(SimError::InvalidThresholds(_))
    ));
    runtime.update_thresholds(Thresholds::default()).unwrap();

    sleep(Duration::from_millis(100));
    let state = runtime.latest();
    assert!(state
        .alerts
        .iter()
        .any(|alert| alert.message.starts_with("Garbage collection completed")));

    runtime.shutdown().unwrap();
}
