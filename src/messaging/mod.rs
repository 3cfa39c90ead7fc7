//! Narrow messaging-layer shapes the partition engine routes by.
//!
//! The real message bus lives in other services. Routing only needs to know
//! whether a message carries a place id and whether its source address is a
//! hub, so this module carries exactly those shapes and nothing else: no
//! payloads, no codecs, no transport.

mod address;
mod message;

pub use address::{Address, ZERO_UUID};
pub use message::{PlatformMessage, PlatformMessageBuilder};
