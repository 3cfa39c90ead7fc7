//! Metrics for the monitoring collaborator.
//!
//! Plain atomics, no exporter: an external collector reads
//! [`PartitionMetrics::snapshot`] and ships the values wherever it likes.

use serde::Serialize;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};

/// A value that can move up and down.
#[derive(Debug, Default)]
pub struct Gauge {
    value: AtomicI64,
}

impl Gauge {
    /// Create a gauge at zero.
    pub const fn new() -> Self {
        Self {
            value: AtomicI64::new(0),
        }
    }

    /// Set the gauge to a specific value.
    pub fn set(&self, value: i64) {
        self.value.store(value, Ordering::Relaxed);
    }

    /// Get the current value.
    pub fn get(&self) -> i64 {
        self.value.load(Ordering::Relaxed)
    }
}

/// A monotonically increasing count.
#[derive(Debug, Default)]
pub struct Counter {
    value: AtomicU64,
}

impl Counter {
    /// Create a counter at zero.
    pub const fn new() -> Self {
        Self {
            value: AtomicU64::new(0),
        }
    }

    /// Increment the counter by 1.
    pub fn inc(&self) {
        self.value.fetch_add(1, Ordering::Relaxed);
    }

    /// Get the current value.
    pub fn get(&self) -> u64 {
        self.value.load(Ordering::Relaxed)
    }
}

/// Gauges and counters describing one member's partition engine.
///
/// The engine keeps the assigned-partition gauge and the round counters
/// current; the member and universe gauges are set once at construction.
#[derive(Debug, Default)]
pub struct PartitionMetrics {
    /// Cluster member count.
    pub members: Gauge,
    /// Size of the partition universe.
    pub partitions_total: Gauge,
    /// Partitions currently published as owned by this member.
    pub partitions_assigned: Gauge,
    /// Dissemination rounds that dispatched a change.
    pub rounds: Counter,
    /// Listener invocations that panicked.
    pub listener_failures: Counter,
    /// Rounds whose fan-out exceeded the notification timeout.
    pub round_timeouts: Counter,
}

impl PartitionMetrics {
    /// Create a metrics set with everything at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Point-in-time copy of every metric, for scraping.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            members: self.members.get(),
            partitions_total: self.partitions_total.get(),
            partitions_assigned: self.partitions_assigned.get(),
            rounds: self.rounds.get(),
            listener_failures: self.listener_failures.get(),
            round_timeouts: self.round_timeouts.get(),
        }
    }
}

/// Plain-data copy of the current metric values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    /// Cluster member count.
    pub members: i64,
    /// Size of the partition universe.
    pub partitions_total: i64,
    /// Partitions currently published as owned by this member.
    pub partitions_assigned: i64,
    /// Dissemination rounds that dispatched a change.
    pub rounds: u64,
    /// Listener invocations that panicked.
    pub listener_failures: u64,
    /// Rounds whose fan-out exceeded the notification timeout.
    pub round_timeouts: u64,
}
