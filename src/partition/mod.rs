//! Partition universe, static assignment and ownership dissemination.
//!
//! Every member process builds the same fixed [`PartitionTable`] from
//! configuration and can therefore answer "who owns this place/hub/message"
//! without coordination. Which partitions *this* member currently owns is
//! decided elsewhere (statically via [`AssignmentStrategy`], or by a cluster
//! coordination service) and flows through the [`Partitioner`] facade to
//! local listeners:
//!
//! ```text
//!  coordinator ──publish_partitions──▶ ┌──────────────────────────────┐
//!                                      │          Partitioner         │
//!  place / hub / message ──lookup────▶ │  ┌────────────────────────┐  │
//!                                      │  │    PartitionTable      │  │
//!                                      │  │  0 │ 1 │ 2 │ ... │ N-1 │  │
//!                                      │  └────────────────────────┘  │
//!                                      │  ┌────────────────────────┐  │
//!                                      │  │   PartitionPublisher   │  │
//!                                      │  │ pending ─diff─▶ change │  │
//!                                      │  │ fan-out ─▶ listeners   │  │
//!                                      │  │ swap ─▶ published      │  │
//!                                      │  └────────────────────────┘  │
//!                                      └──────────────────────────────┘
//! ```
//!
//! Ownership updates are serialized: one background worker diffs each new set
//! against the published one, notifies every [`PartitionListener`] in
//! parallel under a deadline, and then swaps the published snapshot. Lookups
//! never touch the dissemination lock.
//!
//! [`AssignmentStrategy`]: crate::config::AssignmentStrategy

mod events;
mod partitioner;
mod publisher;
mod table;

pub use events::{
    LoggingPartitionListener, NoopPartitionListener, PartitionChange, PartitionListener,
};
pub use partitioner::Partitioner;
pub use publisher::Subscription;
pub use table::PartitionTable;
