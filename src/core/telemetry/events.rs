use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::metrics::MetricKind;
use crate::error::SimError;

/// Operator-injected incidents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EngineEvent {
    CpuSpike,
    MemoryLeak,
    GarbageCollection,
    DiskCleanup,
    LargeDiskWrite,
    NetworkSpike,
    NetworkCongestion,
}

impl EngineEvent {
    pub const ALL: [EngineEvent; 7] = [
        EngineEvent::CpuSpike,
        EngineEvent::MemoryLeak,
        EngineEvent::GarbageCollection,
        EngineEvent::DiskCleanup,
        EngineEvent::LargeDiskWrite,
        EngineEvent::NetworkSpike,
        EngineEvent::NetworkCongestion,
    ];

    /// Wire name accepted by `Engine::trigger_event`
    pub fn name(&self) -> &'static str {
        match self {
            EngineEvent::CpuSpike => "cpuSpike",
            EngineEvent::MemoryLeak => "memoryLeak",
            EngineEvent::GarbageCollection => "garbageCollection",
            EngineEvent::DiskCleanup => "diskCleanup",
            EngineEvent::LargeDiskWrite => "largeDiskWrite",
            EngineEvent::NetworkSpike => "networkSpike",
            EngineEvent::NetworkCongestion => "networkCongestion",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            EngineEvent::CpuSpike => "Bump CPU by 20-40 points on a random process",
            EngineEvent::MemoryLeak => "Leak 15-30% memory over 60 seconds",
            EngineEvent::GarbageCollection => "Reclaim 10-20% of used memory",
            EngineEvent::DiskCleanup => "Free 5-15% of used disk",
            EngineEvent::LargeDiskWrite => "Grow disk usage by 3-8%",
            EngineEvent::NetworkSpike => "Multiply throughput 3-5x for 15 seconds",
            EngineEvent::NetworkCongestion => "Throttle throughput to 50-70% for 20 seconds",
        }
    }

    /// Metric the event acts on
    pub fn metric(&self) -> MetricKind {
        match self {
            EngineEvent::CpuSpike => MetricKind::Cpu,
            EngineEvent::MemoryLeak | EngineEvent::GarbageCollection => MetricKind::Memory,
            EngineEvent::DiskCleanup | EngineEvent::LargeDiskWrite => MetricKind::Disk,
            EngineEvent::NetworkSpike | EngineEvent::NetworkCongestion => MetricKind::Network,
        }
    }
}

impl fmt::Display for EngineEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EngineEvent {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EngineEvent::ALL
            .into_iter()
            .find(|event| event.name() == s)
            .ok_or_else(|| SimError::unknown_event(s))
    }
}
