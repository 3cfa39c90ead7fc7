//! Error types for the partition engine.

use crate::types::PartitionId;
use thiserror::Error;
use uuid::Uuid;

/// Result type alias for partition engine operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the partition engine.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration rejected at construction time.
    #[error("config error: {0}")]
    Config(String),

    /// Partition id outside the configured universe.
    #[error("invalid partition id: {0}")]
    InvalidPartitionId(PartitionId),

    /// Hub id that does not match the `ABC-1234` shape.
    #[error("[{0}] is not a valid hub id")]
    InvalidHubId(String),

    /// The all-zero place id is reserved and never maps to a partition.
    #[error("place id {0} is not associated with any partition")]
    UnroutablePlaceId(Uuid),

    /// Assignment strategy string not recognized at config parse time.
    #[error("unrecognized partition assignment strategy: {0}")]
    UnrecognizedStrategy(String),
}
