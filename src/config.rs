//! Configuration for the partition engine.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Policy mapping a member to the partitions it statically owns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssignmentStrategy {
    /// Disjoint round-robin striping: member `m` of `n` owns
    /// `{m, m + n, m + 2n, ...}`. Members' sets are pairwise disjoint and
    /// together cover the whole universe.
    Exclusive,

    /// Full replication: every member owns every partition. Used when each
    /// process must mirror full state.
    All,
    // TODO: a LoadBalanced strategy that weights assignment by reported member load.
}

impl FromStr for AssignmentStrategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if s.eq_ignore_ascii_case("exclusive") {
            Ok(AssignmentStrategy::Exclusive)
        } else if s.eq_ignore_ascii_case("all") {
            Ok(AssignmentStrategy::All)
        } else {
            Err(Error::UnrecognizedStrategy(s.to_string()))
        }
    }
}

impl fmt::Display for AssignmentStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssignmentStrategy::Exclusive => f.write_str("EXCLUSIVE"),
            AssignmentStrategy::All => f.write_str("ALL"),
        }
    }
}

/// Configuration for one member's partition engine.
#[derive(Debug, Clone)]
pub struct PartitionConfig {
    /// Total number of partitions in the fixed universe.
    pub partitions: u32,

    /// This member's id, in `[0, members)`.
    pub member_id: u32,

    /// Number of members sharing the partition universe.
    pub members: u32,

    /// How partitions are assigned to members.
    pub assignment_strategy: AssignmentStrategy,

    /// Upper bound on one dissemination round. Also bounds how long
    /// `publish_partitions` keeps its caller waiting.
    pub notification_timeout: Duration,
}

impl Default for PartitionConfig {
    fn default() -> Self {
        Self {
            partitions: 128,
            member_id: 0,
            members: 1,
            assignment_strategy: AssignmentStrategy::Exclusive,
            notification_timeout: Duration::from_secs(300),
        }
    }
}

impl PartitionConfig {
    /// Create a configuration for the given member of an `n`-member cluster.
    pub fn new(member_id: u32, members: u32) -> Self {
        Self {
            member_id,
            members,
            ..Default::default()
        }
    }

    /// Set the partition universe size.
    pub fn with_partitions(mut self, partitions: u32) -> Self {
        self.partitions = partitions;
        self
    }

    /// Set this member's id.
    pub fn with_member_id(mut self, member_id: u32) -> Self {
        self.member_id = member_id;
        self
    }

    /// Set the cluster member count.
    pub fn with_members(mut self, members: u32) -> Self {
        self.members = members;
        self
    }

    /// Set the assignment strategy.
    pub fn with_assignment_strategy(mut self, strategy: AssignmentStrategy) -> Self {
        self.assignment_strategy = strategy;
        self
    }

    /// Set the notification timeout.
    pub fn with_notification_timeout(mut self, timeout: Duration) -> Self {
        self.notification_timeout = timeout;
        self
    }

    /// Check the configuration invariants. Called at engine construction;
    /// a violation is fatal to startup.
    pub fn validate(&self) -> Result<()> {
        if self.partitions == 0 {
            return Err(Error::Config("partitions must be greater than zero".into()));
        }
        if self.members == 0 {
            return Err(Error::Config("members must be greater than zero".into()));
        }
        if self.members > self.partitions {
            return Err(Error::Config(format!(
                "members ({}) may not exceed partitions ({})",
                self.members, self.partitions
            )));
        }
        if self.member_id >= self.members {
            return Err(Error::Config(format!(
                "member id {} out of range for {} members",
                self.member_id, self.members
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PartitionConfig::default();
        assert_eq!(config.partitions, 128);
        assert_eq!(config.member_id, 0);
        assert_eq!(config.members, 1);
        assert_eq!(config.assignment_strategy, AssignmentStrategy::Exclusive);
        assert_eq!(config.notification_timeout, Duration::from_secs(300));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = PartitionConfig::new(2, 4)
            .with_partitions(32)
            .with_assignment_strategy(AssignmentStrategy::All)
            .with_notification_timeout(Duration::from_secs(5));

        assert_eq!(config.partitions, 32);
        assert_eq!(config.member_id, 2);
        assert_eq!(config.members, 4);
        assert_eq!(config.assignment_strategy, AssignmentStrategy::All);
        assert_eq!(config.notification_timeout, Duration::from_secs(5));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_partitions() {
        let config = PartitionConfig::default().with_partitions(0);
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_validate_rejects_zero_members() {
        let config = PartitionConfig::default().with_members(0);
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_validate_rejects_more_members_than_partitions() {
        let config = PartitionConfig::new(0, 16).with_partitions(8);
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_validate_rejects_member_id_out_of_range() {
        let config = PartitionConfig::new(3, 3).with_partitions(8);
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_strategy_from_str() {
        assert_eq!(
            "EXCLUSIVE".parse::<AssignmentStrategy>().unwrap(),
            AssignmentStrategy::Exclusive
        );
        assert_eq!(
            "all".parse::<AssignmentStrategy>().unwrap(),
            AssignmentStrategy::All
        );
        assert!(matches!(
            "LOADBALANCED".parse::<AssignmentStrategy>(),
            Err(Error::UnrecognizedStrategy(s)) if s == "LOADBALANCED"
        ));
    }

    #[test]
    fn test_strategy_display_round_trips() {
        for strategy in [AssignmentStrategy::Exclusive, AssignmentStrategy::All] {
            let parsed: AssignmentStrategy = strategy.to_string().parse().unwrap();
            assert_eq!(parsed, strategy);
        }
    }
}
