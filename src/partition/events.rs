//! Ownership-change events and the listener contract.

use crate::types::{Partition, PartitionId};
use serde::Serialize;
use std::collections::BTreeSet;

/// A change in this member's partition ownership.
///
/// Each event carries the *complete* ownership set after the change alongside
/// the delta from the previously published state. Listeners must treat an
/// event as a statement about current state: superseded intermediate sets are
/// dropped without notification, and a newly registered listener is anchored
/// by a catch-up event rather than a replay of history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PartitionChange {
    /// Ids newly owned by this member.
    pub added: BTreeSet<PartitionId>,
    /// Ids no longer owned by this member.
    pub removed: BTreeSet<PartitionId>,
    /// The complete ownership set after this change.
    pub partitions: BTreeSet<Partition>,
    /// Cluster member count at the time of the change.
    pub members: u32,
}

impl PartitionChange {
    /// Diff `next` against `current`, or `None` when nothing changed.
    pub(crate) fn diff(
        current: &BTreeSet<Partition>,
        next: &BTreeSet<Partition>,
        members: u32,
    ) -> Option<Self> {
        if current == next {
            return None;
        }
        Some(Self {
            added: next.difference(current).map(|p| p.id()).collect(),
            removed: current.difference(next).map(|p| p.id()).collect(),
            partitions: next.clone(),
            members,
        })
    }

    /// The catch-up event for a newly registered listener: the whole
    /// published set reported as added, nothing removed.
    pub(crate) fn catch_up(published: &BTreeSet<Partition>, members: u32) -> Self {
        Self {
            added: published.iter().map(|p| p.id()).collect(),
            removed: BTreeSet::new(),
            partitions: published.clone(),
            members,
        }
    }
}

/// Receives ownership-change notifications.
///
/// Implementations must tolerate being invoked from the engine's fan-out
/// tasks concurrently with their own work, and must not assume they see every
/// historical diff.
pub trait PartitionListener: Send + Sync + 'static {
    /// Called once per dissemination round with that round's change, and once
    /// at registration with the catch-up event.
    fn on_partitions_changed(&self, change: &PartitionChange);
}

/// Listener that ignores every event.
pub struct NoopPartitionListener;

impl PartitionListener for NoopPartitionListener {
    fn on_partitions_changed(&self, _change: &PartitionChange) {}
}

/// Listener that logs ownership changes.
pub struct LoggingPartitionListener;

impl PartitionListener for LoggingPartitionListener {
    fn on_partitions_changed(&self, change: &PartitionChange) {
        tracing::info!(
            added = change.added.len(),
            removed = change.removed.len(),
            owned = change.partitions.len(),
            members = change.members,
            "Partition ownership changed"
        );
    }
}
