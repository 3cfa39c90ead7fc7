//! The partition-aware facade every sharded component talks to.

use crate::config::{AssignmentStrategy, PartitionConfig};
use crate::error::{Error, Result};
use crate::messaging::{PlatformMessage, ZERO_UUID};
use crate::metrics::PartitionMetrics;
use crate::partition::events::PartitionListener;
use crate::partition::publisher::{PartitionPublisher, Subscription};
use crate::partition::table::PartitionTable;
use crate::types::{MemberId, Partition, PartitionId};
use regex::Regex;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, LazyLock};
use uuid::Uuid;

/// Hub ids look like `ABC-1234`: three word characters, a dash, four digits.
static HUB_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\w{3}-(\d{4})$").expect("hub id pattern compiles"));

/// Deterministic partition lookup and ownership dissemination for one
/// cluster member.
///
/// Construct one per process and hand it (behind an `Arc`) to every
/// partition-aware component. Lookups are non-blocking reads of immutable
/// state; ownership updates flow through
/// [`publish_partitions`](Self::publish_partitions) and reach registered
/// [`PartitionListener`]s.
pub struct Partitioner {
    config: PartitionConfig,
    table: PartitionTable,
    /// Round-robin fallback for messages with neither place nor hub context.
    /// Wraps silently on overflow.
    next_fallback: AtomicU32,
    publisher: PartitionPublisher,
    metrics: Arc<PartitionMetrics>,
}

impl Partitioner {
    /// Build a partitioner from the given configuration, registering the
    /// initial listeners. Fails fast on an invalid configuration.
    ///
    /// Must be called from within a Tokio runtime: dissemination runs on a
    /// background task that lives as long as the partitioner.
    pub fn new(
        config: PartitionConfig,
        listeners: Vec<Arc<dyn PartitionListener>>,
    ) -> Result<Self> {
        config.validate()?;

        let metrics = Arc::new(PartitionMetrics::new());
        metrics.members.set(config.members as i64);
        metrics.partitions_total.set(config.partitions as i64);

        let table = PartitionTable::new(config.partitions);
        let publisher = PartitionPublisher::new(
            config.members,
            config.notification_timeout,
            listeners,
            Arc::clone(&metrics),
        );

        Ok(Self {
            config,
            table,
            next_fallback: AtomicU32::new(0),
            publisher,
            metrics,
        })
    }

    /// Total number of partitions in the universe.
    pub fn partition_count(&self) -> u32 {
        self.config.partitions
    }

    /// Number of members sharing the partition universe.
    pub fn member_count(&self) -> u32 {
        self.config.members
    }

    /// This member's id.
    pub fn member_id(&self) -> MemberId {
        self.config.member_id
    }

    /// The configured assignment strategy.
    pub fn assignment_strategy(&self) -> AssignmentStrategy {
        self.config.assignment_strategy
    }

    /// Engine metrics, for the monitoring collaborator.
    pub fn metrics(&self) -> &PartitionMetrics {
        &self.metrics
    }

    /// The full partition universe in id order.
    pub fn all_partitions(&self) -> Vec<Partition> {
        self.table.all().collect()
    }

    /// The currently published ownership set for this member. A lock-free
    /// snapshot read; safe to call from any task at any rate.
    pub fn assigned_partitions(&self) -> BTreeSet<Partition> {
        (*self.publisher.published()).clone()
    }

    /// Look up a partition by id.
    pub fn partition_by_id(&self, id: PartitionId) -> Result<Partition> {
        self.table.get(id)
    }

    /// Deterministically map a place to its partition.
    ///
    /// Stable across processes and restarts: the low 64 bits of the place id
    /// are floor-reduced modulo the partition count, so every member routes
    /// the same place identically. The all-zero sentinel id is reserved and
    /// never routes.
    pub fn partition_for_place(&self, place_id: Uuid) -> Result<Partition> {
        if place_id == ZERO_UUID {
            return Err(Error::UnroutablePlaceId(place_id));
        }
        let (_, low) = place_id.as_u64_pair();
        let id = (low as i64).rem_euclid(self.config.partitions as i64) as PartitionId;
        self.partition_by_id(id)
    }

    /// Map a hub to its partition by the numeric suffix of its printed id.
    pub fn partition_for_hub(&self, hub_id: &str) -> Result<Partition> {
        let digits = HUB_ID
            .captures(hub_id)
            .and_then(|captures| captures.get(1))
            .ok_or_else(|| Error::InvalidHubId(hub_id.to_string()))?;
        let id: u32 = digits.as_str().parse().expect("hub id suffix is four digits");
        self.partition_by_id(id % self.config.partitions)
    }

    /// Route a message to a partition.
    ///
    /// Priority: the message's place id, else the source hub id (messages
    /// from unclaimed hubs are partitioned by hub), else a shared round-robin
    /// counter that spreads context-free traffic across the universe.
    pub fn partition_for_message(&self, message: &PlatformMessage) -> Result<Partition> {
        if let Some(place_id) = message.place_id() {
            return self.partition_for_place(place_id);
        }

        if let Some(hub_id) = message.source().hub_id() {
            return self.partition_for_hub(hub_id);
        }

        let next = self
            .next_fallback
            .fetch_add(1, Ordering::Relaxed)
            .wrapping_add(1);
        self.partition_by_id(next % self.config.partitions)
    }

    /// The partitions `member_id` statically owns under the configured
    /// strategy. Pure: depends only on configuration, never on what has been
    /// published.
    pub fn provision_partitions(&self, member_id: MemberId) -> BTreeSet<Partition> {
        self.table
            .provision(self.config.assignment_strategy, member_id, self.config.members)
    }

    /// Announce a new ownership set for this member and wait for it to be
    /// disseminated, bounded by the notification timeout. Never fails: a
    /// timed-out wait is logged and the round completes in the background.
    ///
    /// Rapid calls coalesce to the newest set; superseded intermediate sets
    /// are dropped without notification.
    pub async fn publish_partitions(&self, partitions: BTreeSet<Partition>) {
        self.publisher.publish(partitions).await;
    }

    /// Publish the statically provisioned set for this member.
    ///
    /// Cluster-less deployments call this once at startup; clustered
    /// deployments let the coordination service drive
    /// [`publish_partitions`](Self::publish_partitions) instead.
    pub async fn publish_member_partitions(&self) {
        let partitions = self.provision_partitions(self.config.member_id);
        self.publish_partitions(partitions).await;
    }

    /// Register a listener for ownership changes. The listener is
    /// immediately and synchronously caught up with the currently published
    /// set, then notified on every subsequent round.
    pub fn add_partition_listener(&self, listener: Arc<dyn PartitionListener>) -> Subscription {
        self.publisher.add_listener(listener)
    }
}

impl fmt::Display for Partitioner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Partitioner [total partitions={}, assigned partitions={}, listeners={}]",
            self.config.partitions,
            self.publisher.published().len(),
            self.publisher.listener_count()
        )
    }
}

impl fmt::Debug for Partitioner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Partitioner")
            .field("partitions", &self.config.partitions)
            .field("members", &self.config.members)
            .field("member_id", &self.config.member_id)
            .field("strategy", &self.config.assignment_strategy)
            .finish()
    }
}
