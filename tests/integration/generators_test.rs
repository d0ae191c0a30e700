use chrono::{TimeZone, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use telesim::core::telemetry::{
    AlertEvaluator, AlertType, CpuGenerator, DiskGenerator, LogLevel, LogSynthesizer,
    MemoryGenerator, MetricGenerator, MetricKind, NetworkGenerator, ThresholdPair, Thresholds,
};

fn assert_invariants(generator: &dyn MetricGenerator, min_bound: f64, max_bound: f64) {
    let state = generator.current_state();
    assert!(state.current >= min_bound && state.current <= max_bound);
    assert!(state.history.len() <= 60);
    let min = state.history.iter().copied().fold(f64::INFINITY, f64::min);
    let max = state.history.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    assert_eq!(state.min, min);
    assert_eq!(state.max, max);
}

#[test]
fn test_generators_respect_bounds_over_many_ticks() {
    let mut now = Utc.with_ymd_and_hms(2024, 3, 6, 10, 0, 0).unwrap();
    let mut generators: Vec<(Box<dyn MetricGenerator>, f64, f64)> = vec![
        (
            Box::new(CpuGenerator::new(30.0, StdRng::seed_from_u64(1))),
            0.0,
            100.0,
        ),
        (
            Box::new(MemoryGenerator::new(45.0, StdRng::seed_from_u64(2))),
            0.0,
            100.0,
        ),
        (
            Box::new(DiskGenerator::new(60.0, StdRng::seed_from_u64(3))),
            0.0,
            100.0,
        ),
        (
            Box::new(NetworkGenerator::new(2.5, StdRng::seed_from_u64(4))),
            0.1,
            15.0,
        ),
    ];

    for tick in 0..2_000 {
        // Step 37s so the run crosses every period of the day
        now += chrono::Duration::seconds(37);
        let push = if tick % 50 == 0 { 40.0 } else { 0.0 };
        for (generator, min_bound, max_bound) in generators.iter_mut() {
            generator.next_value(now, push);
            assert_invariants(generator.as_ref(), *min_bound, *max_bound);
        }
    }
}

#[test]
fn test_values_are_rounded_to_one_decimal() {
    let mut cpu = CpuGenerator::new(30.0, StdRng::seed_from_u64(5));
    let now = Utc::now();
    for _ in 0..200 {
        let value = cpu.next_value(now, 0.0);
        assert!(((value * 10.0).round() - value * 10.0).abs() < 1e-6);
    }
}

#[test]
fn test_critical_cpu_alert_after_climb() {
    let thresholds = Thresholds {
        cpu: ThresholdPair::new(70.0, 90.0),
        ..Default::default()
    };
    let mut evaluator = AlertEvaluator::new(thresholds, StdRng::seed_from_u64(6));
    let mut cpu = CpuGenerator::new(30.0, StdRng::seed_from_u64(7));
    let now = Utc::now();

    let mut value = cpu.current();
    for _ in 0..500 {
        value = cpu.next_value(now, 10.0);
        if value >= 90.0 {
            break;
        }
    }
    assert!(value >= 90.0);

    // Memory, disk and network are breaching too, but CPU wins
    let alert = evaluator
        .check_thresholds(value, 99.0, 99.0, 14.5, now)
        .unwrap();
    assert_eq!(alert.alert_type, AlertType::Error);
    assert_eq!(alert.message, format!("Critical CPU usage: {}%", value));
}

#[test]
fn test_disk_cleanup_scenario() {
    let mut disk = DiskGenerator::new(60.0, StdRng::seed_from_u64(8));
    let value = disk.simulate_disk_cleanup(10.0);

    assert_eq!(value, 54.0);
    assert_eq!(disk.current_state().history.last(), Some(&54.0));
}

#[test]
fn test_correlated_error_log_scenario() {
    let mut logs = LogSynthesizer::new(StdRng::seed_from_u64(9));
    let now = Utc::now();

    assert!(logs
        .generate_correlated_error_log(MetricKind::Cpu, 80.0, now)
        .is_none());
    let entry = logs
        .generate_correlated_error_log(MetricKind::Cpu, 92.0, now)
        .unwrap();
    assert_eq!(entry.level, LogLevel::Error);
}

#[test]
fn test_memory_leak_then_normal_fluctuation() {
    let mut memory = MemoryGenerator::new(40.0, StdRng::seed_from_u64(10));
    let now = Utc::now();

    memory
        .simulate_memory_leak(std::time::Duration::from_secs(60))
        .unwrap();
    for _ in 0..60 {
        memory.next_value(now, 0.0);
    }
    let contributed = memory.end_memory_leak().unwrap();
    assert!((15.0..=30.0 + 1e-9).contains(&contributed));

    // Once ended, ticks no longer carry the leak
    for _ in 0..10 {
        memory.next_value(now, 0.0);
        assert_eq!(memory.leak_rate(), 0.0);
        assert_eq!(memory.leak_accumulated(), 0.0);
    }
}
