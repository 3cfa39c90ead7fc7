//! The fixed partition universe and static assignment math.

use crate::config::AssignmentStrategy;
use crate::error::{Error, Result};
use crate::types::{MemberId, Partition, PartitionId};
use std::collections::BTreeSet;
use std::sync::Arc;

/// The fixed, ordered universe of all partitions, built once from
/// configuration and shared read-only for the process lifetime.
#[derive(Debug, Clone)]
pub struct PartitionTable {
    partitions: Arc<Vec<Partition>>,
}

impl PartitionTable {
    /// Build the table for a universe of `count` partitions, ids `0..count`.
    pub fn new(count: u32) -> Self {
        let partitions = (0..count).map(Partition::new).collect();
        Self {
            partitions: Arc::new(partitions),
        }
    }

    /// Number of partitions in the universe.
    pub fn len(&self) -> u32 {
        self.partitions.len() as u32
    }

    /// Whether the universe is empty. A validated configuration never
    /// produces an empty table.
    pub fn is_empty(&self) -> bool {
        self.partitions.is_empty()
    }

    /// Look up a partition by id.
    pub fn get(&self, id: PartitionId) -> Result<Partition> {
        self.partitions
            .get(id as usize)
            .copied()
            .ok_or(Error::InvalidPartitionId(id))
    }

    /// All partitions in id order.
    pub fn all(&self) -> impl Iterator<Item = Partition> + '_ {
        self.partitions.iter().copied()
    }

    /// The partitions `member_id` statically owns under `strategy`.
    ///
    /// `members` must be non-zero (guaranteed by a validated configuration).
    /// Under `Exclusive` the sets of any two members are disjoint and
    /// together cover the whole universe; under `All` every member owns
    /// everything.
    pub fn provision(
        &self,
        strategy: AssignmentStrategy,
        member_id: MemberId,
        members: u32,
    ) -> BTreeSet<Partition> {
        match strategy {
            AssignmentStrategy::All => self.all().collect(),
            AssignmentStrategy::Exclusive => (member_id..self.len())
                .step_by(members as usize)
                .map(Partition::new)
                .collect(),
        }
    }
}
