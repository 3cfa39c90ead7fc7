//! Partition assignment and dissemination for the Hearth smart-home platform.
//!
//! Hearth worker processes jointly own a large population of places
//! (households) and hubs (on-premise gateways). This crate is the sharding
//! core each process embeds:
//!
//! - a fixed universe of [`Partition`]s built once from configuration
//! - static assignment ([`AssignmentStrategy`]) deciding which partitions a
//!   member owns
//! - deterministic routing of place ids, hub ids and messages to partitions,
//!   identical on every member without coordination
//! - dissemination of ownership changes to local [`PartitionListener`]s with
//!   bounded-time, fault-isolated, latest-state semantics
//!
//! # Example
//!
//! ```rust,no_run
//! use hearth_partition::{
//!     LoggingPartitionListener, PartitionConfig, Partitioner,
//! };
//! use std::sync::Arc;
//! use uuid::Uuid;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Member 1 of a 4-member cluster sharing 128 partitions.
//!     let config = PartitionConfig::new(1, 4);
//!     let partitioner = Partitioner::new(config, vec![])?;
//!
//!     // Per-partition components subscribe to ownership changes.
//!     let subscription =
//!         partitioner.add_partition_listener(Arc::new(LoggingPartitionListener));
//!
//!     // Cluster-less deployments publish the static stripe at startup;
//!     // clustered ones let the coordination service call
//!     // `publish_partitions` whenever membership changes.
//!     partitioner.publish_member_partitions().await;
//!
//!     // Routing is deterministic and never blocks.
//!     let place = Uuid::parse_str("01b5e865-f564-47cc-a760-8dee5b2cad93")?;
//!     let partition = partitioner.partition_for_place(place)?;
//!     println!("{place} lives on {partition}");
//!
//!     subscription.cancel();
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │                     Partitioner                      │
//! │   lookups: place / hub / message → Partition         │
//! │   provisioning: (member, strategy) → owned set       │
//! └───────────────────────────┬──────────────────────────┘
//!                             │ publish_partitions
//!                             ▼
//! ┌──────────────────────────────────────────────────────┐
//! │              PartitionPublisher (worker)             │
//! │   pending ──diff──▶ PartitionChange                  │
//! │   fan-out (parallel, deadline) ──▶ listeners         │
//! │   swap ──▶ published snapshot                        │
//! └──────────────────────────────────────────────────────┘
//! ```
//!
//! Cluster membership, message transport and the per-partition work itself
//! live in other services; this crate only answers "who owns this?" and tells
//! local components when the answer changes.

pub mod config;
pub mod error;
pub mod messaging;
pub mod metrics;
pub mod partition;
pub mod types;

// Re-export the main types for convenience
pub use config::{AssignmentStrategy, PartitionConfig};
pub use error::{Error, Result};
pub use messaging::{Address, PlatformMessage, PlatformMessageBuilder, ZERO_UUID};
pub use metrics::{MetricsSnapshot, PartitionMetrics};
pub use partition::{
    LoggingPartitionListener, NoopPartitionListener, PartitionChange, PartitionListener,
    PartitionTable, Partitioner, Subscription,
};
pub use types::{MemberId, Partition, PartitionId};
