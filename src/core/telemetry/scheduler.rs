//! Deferred one-shot tasks processed by the engine's own ticks.
//!
//! Nothing here runs on its own: the engine drains due tasks synchronously,
//! so dropping or shutting down the engine cancels everything still queued.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::time::Duration;

use chrono::{DateTime, Utc};

/// Work the engine performs when a deferred task fires
#[derive(Debug, Clone, PartialEq)]
pub enum ScheduledTask {
    /// Apply the effect of the correlation rule at this index
    ApplyCorrelation { rule: usize },
    /// Clear the active guard of the correlation rule at this index
    ReleaseRule { rule: usize },
    /// Stop an in-progress memory leak
    EndMemoryLeak,
    /// Write back the network value captured before a spike or congestion
    RestoreNetwork { value: f64 },
    /// Take one spike's share back out of the CPU side table
    ReleaseProcess { name: String, amount: f64 },
}

/// A task a generator wants run after `after` has elapsed
#[derive(Debug, Clone, PartialEq)]
pub struct Revert {
    pub after: Duration,
    pub task: ScheduledTask,
}

impl Revert {
    pub fn new(after: Duration, task: ScheduledTask) -> Self {
        Self { after, task }
    }
}

#[derive(Debug)]
struct Entry {
    fire_at: DateTime<Utc>,
    seq: u64,
    task: ScheduledTask,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.fire_at == other.fire_at && self.seq == other.seq
    }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    // Reversed so the BinaryHeap pops the earliest entry first
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .fire_at
            .cmp(&self.fire_at)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Priority queue of `(fire_at, task)` pairs, FIFO among equal times
#[derive(Debug, Default)]
pub struct Scheduler {
    queue: BinaryHeap<Entry>,
    next_seq: u64,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule_at(&mut self, fire_at: DateTime<Utc>, task: ScheduledTask) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.push(Entry { fire_at, seq, task });
    }

    pub fn schedule_after(&mut self, now: DateTime<Utc>, after: Duration, task: ScheduledTask) {
        self.schedule_at(now + to_chrono(after), task);
    }

    /// Remove and return every task due at or before `now`, earliest first
    pub fn pop_due(&mut self, now: DateTime<Utc>) -> Vec<ScheduledTask> {
        let mut due = Vec::new();
        while self.queue.peek().is_some_and(|entry| entry.fire_at <= now) {
            if let Some(entry) = self.queue.pop() {
                due.push(entry.task);
            }
        }
        due
    }

    /// Drop every pending task, returning how many were cancelled
    pub fn cancel_all(&mut self) -> usize {
        let cancelled = self.queue.len();
        self.queue.clear();
        cancelled
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Pending tasks in no particular order
    pub fn pending(&self) -> impl Iterator<Item = &ScheduledTask> {
        self.queue.iter().map(|entry| &entry.task)
    }
}

pub(crate) fn to_chrono(duration: Duration) -> chrono::Duration {
    let millis = duration.as_millis().min(i64::MAX as u128) as i64;
    chrono::Duration::milliseconds(millis)
}
