//! Cross-metric propagation.
//!
//! A rule fires when its source metric reaches the threshold: the effect on
//! the target lands after `delay`, and the rule stays armed-off (`active`)
//! until `delay + duration` has passed so a sustained reading cannot stack
//! effects.

use std::time::Duration;

use chrono::{DateTime, Utc};

use super::metrics::MetricKind;
use super::scheduler::{ScheduledTask, Scheduler};

#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationRule {
    pub source: MetricKind,
    pub target: MetricKind,
    pub threshold: f64,
    pub impact: f64,
    pub delay: Duration,
    pub duration: Duration,
    pub active: bool,
    pub start_time: Option<DateTime<Utc>>,
}

/// What applying a rule does to its target generator
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CorrelationEffect {
    MemoryLeak { duration: Duration },
    LargeDiskWrite { percent: f64 },
    BandwidthSpike { duration: Duration },
    /// Queued external influence on the target's next tick
    Nudge { target: MetricKind, amount: f64 },
}

impl CorrelationRule {
    pub fn new(
        source: MetricKind,
        target: MetricKind,
        threshold: f64,
        impact: f64,
        delay: Duration,
        duration: Duration,
    ) -> Self {
        Self {
            source,
            target,
            threshold,
            impact,
            delay,
            duration,
            active: false,
            start_time: None,
        }
    }

    /// Map the rule onto its target's specialized simulation
    pub fn effect(&self) -> CorrelationEffect {
        match self.target {
            MetricKind::Memory => CorrelationEffect::MemoryLeak {
                duration: self.duration,
            },
            MetricKind::Disk => CorrelationEffect::LargeDiskWrite {
                percent: self.impact * 100.0,
            },
            MetricKind::Network => CorrelationEffect::BandwidthSpike {
                duration: self.duration,
            },
            MetricKind::Cpu => CorrelationEffect::Nudge {
                target: MetricKind::Cpu,
                amount: self.impact * 100.0,
            },
        }
    }
}

pub fn default_rules() -> Vec<CorrelationRule> {
    vec![
        CorrelationRule::new(
            MetricKind::Cpu,
            MetricKind::Memory,
            85.0,
            0.3,
            Duration::from_secs(10),
            Duration::from_secs(60),
        ),
        CorrelationRule::new(
            MetricKind::Memory,
            MetricKind::Disk,
            90.0,
            0.05,
            Duration::from_secs(15),
            Duration::from_secs(120),
        ),
        CorrelationRule::new(
            MetricKind::Cpu,
            MetricKind::Network,
            90.0,
            0.5,
            Duration::from_secs(5),
            Duration::from_secs(30),
        ),
        CorrelationRule::new(
            MetricKind::Network,
            MetricKind::Cpu,
            12.0,
            0.1,
            Duration::from_secs(3),
            Duration::from_secs(20),
        ),
    ]
}

#[derive(Debug, Clone)]
pub struct CorrelationEngine {
    rules: Vec<CorrelationRule>,
}

impl CorrelationEngine {
    pub fn new(rules: Vec<CorrelationRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[CorrelationRule] {
        &self.rules
    }

    pub fn rule(&self, index: usize) -> Option<&CorrelationRule> {
        self.rules.get(index)
    }

    /// Inspect a fresh `value` of `source` and schedule effects for every
    /// inactive rule it trips. Returns the indices of the rules triggered.
    pub fn check(
        &mut self,
        source: MetricKind,
        value: f64,
        now: DateTime<Utc>,
        scheduler: &mut Scheduler,
    ) -> Vec<usize> {
        let mut triggered = Vec::new();

        for (index, rule) in self.rules.iter_mut().enumerate() {
            if rule.source != source || rule.active || value < rule.threshold {
                continue;
            }

            rule.active = true;
            rule.start_time = Some(now);
            scheduler.schedule_after(
                now,
                rule.delay,
                ScheduledTask::ApplyCorrelation { rule: index },
            );
            scheduler.schedule_after(
                now,
                rule.delay + rule.duration,
                ScheduledTask::ReleaseRule { rule: index },
            );
            log::info!(
                "correlation {} -> {} triggered at {:.1} (threshold {:.1})",
                rule.source,
                rule.target,
                value,
                rule.threshold
            );
            triggered.push(index);
        }

        triggered
    }

    pub fn release(&mut self, index: usize) {
        if let Some(rule) = self.rules.get_mut(index) {
            rule.active = false;
            rule.start_time = None;
            log::debug!("correlation {} -> {} re-armed", rule.source, rule.target);
        }
    }

    /// Re-arm every rule
    pub fn reset(&mut self) {
        for rule in &mut self.rules {
            rule.active = false;
            rule.start_time = None;
        }
    }
}

impl Default for CorrelationEngine {
    fn default() -> Self {
        Self::new(default_rules())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trigger_schedules_apply_and_release() {
        let mut engine = CorrelationEngine::default();
        let mut scheduler = Scheduler::new();
        let now = Utc::now();

        let triggered = engine.check(MetricKind::Cpu, 86.0, now, &mut scheduler);
        assert_eq!(triggered, vec![0]);
        assert!(engine.rules()[0].active);
        assert_eq!(engine.rules()[0].start_time, Some(now));
        assert_eq!(scheduler.len(), 2);

        assert!(scheduler.pop_due(now + chrono::Duration::seconds(9)).is_empty());
        assert_eq!(
            scheduler.pop_due(now + chrono::Duration::seconds(10)),
            vec![ScheduledTask::ApplyCorrelation { rule: 0 }]
        );
        assert_eq!(
            scheduler.pop_due(now + chrono::Duration::seconds(70)),
            vec![ScheduledTask::ReleaseRule { rule: 0 }]
        );
    }

    #[test]
    fn test_active_rule_does_not_retrigger() {
        let mut engine = CorrelationEngine::default();
        let mut scheduler = Scheduler::new();
        let now = Utc::now();

        engine.check(MetricKind::Cpu, 88.0, now, &mut scheduler);
        let again = engine.check(MetricKind::Cpu, 89.0, now, &mut scheduler);
        assert!(again.is_empty());
        assert_eq!(scheduler.len(), 2);

        engine.release(0);
        assert_eq!(
            engine.check(MetricKind::Cpu, 88.0, now, &mut scheduler),
            vec![0]
        );
    }

    #[test]
    fn test_high_cpu_trips_both_cpu_rules() {
        let mut engine = CorrelationEngine::default();
        let mut scheduler = Scheduler::new();

        let triggered = engine.check(MetricKind::Cpu, 95.0, Utc::now(), &mut scheduler);
        assert_eq!(triggered, vec![0, 2]);
        let active: Vec<bool> = engine.rules().iter().map(|rule| rule.active).collect();
        assert_eq!(active, vec![true, false, true, false]);
    }

    #[test]
    fn test_below_threshold_and_other_sources_ignored() {
        let mut engine = CorrelationEngine::default();
        let mut scheduler = Scheduler::new();
        let now = Utc::now();

        assert!(
            engine.check(MetricKind::Cpu, 84.9, now, &mut scheduler).is_empty()
        );
        assert!(
            engine.check(MetricKind::Disk, 99.0, now, &mut scheduler).is_empty()
        );
        assert!(scheduler.is_empty());
    }

    #[test]
    fn test_effect_mapping() {
        let rules = default_rules();
        assert_eq!(
            rules[0].effect(),
            CorrelationEffect::MemoryLeak {
                duration: Duration::from_secs(60)
            }
        );
        assert_eq!(
            rules[1].effect(),
            CorrelationEffect::LargeDiskWrite { percent: 5.0 }
        );
        assert_eq!(
            rules[3].effect(),
            CorrelationEffect::Nudge {
                target: MetricKind::Cpu,
                amount: 10.0
            }
        );
    }
}
