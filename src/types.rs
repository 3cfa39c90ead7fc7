//! Core types used throughout the partition engine.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a single partition within the fixed universe.
pub type PartitionId = u32;

/// Identifier of one member process in the cluster, in `[0, members)`.
pub type MemberId = u32;

/// One shard of the overall workload, identified by a fixed integer id.
///
/// Partitions are created when the partition table is built and are compared,
/// hashed and ordered by id alone. They are plain values: cheap to copy and
/// safe to hold across ownership changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Partition {
    id: PartitionId,
}

impl Partition {
    /// Create a partition with the given id.
    pub fn new(id: PartitionId) -> Self {
        Self { id }
    }

    /// The partition id.
    pub fn id(&self) -> PartitionId {
        self.id
    }
}

impl fmt::Display for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "partition-{}", self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partition_identity() {
        assert_eq!(Partition::new(3), Partition::new(3));
        assert_ne!(Partition::new(3), Partition::new(4));
        assert!(Partition::new(3) < Partition::new(4));
        assert_eq!(Partition::new(7).id(), 7);
    }

    #[test]
    fn test_partition_display() {
        assert_eq!(Partition::new(42).to_string(), "partition-42");
    }
}
