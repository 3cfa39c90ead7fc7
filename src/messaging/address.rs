//! Source and destination addressing for platform messages.

use std::fmt;
use uuid::Uuid;

/// The all-zero UUID, reserved as a sentinel. It never identifies a real
/// place and never resolves to a partition.
pub const ZERO_UUID: Uuid = Uuid::nil();

/// Where a message comes from or is delivered to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Address {
    /// An on-premise gateway, identified by its printed hub id (`"ABC-1234"`).
    Hub {
        /// The hub's printed id.
        hub_id: String,
    },

    /// A platform service, identified by name.
    Service {
        /// The service name.
        name: String,
    },

    /// A connected client session.
    Client {
        /// The client session id.
        session_id: Uuid,
    },

    /// Broadcast to all interested parties.
    Broadcast,
}

impl Address {
    /// A hub service address.
    pub fn hub(hub_id: impl Into<String>) -> Self {
        Address::Hub {
            hub_id: hub_id.into(),
        }
    }

    /// A platform service address.
    pub fn service(name: impl Into<String>) -> Self {
        Address::Service { name: name.into() }
    }

    /// A client session address.
    pub fn client(session_id: Uuid) -> Self {
        Address::Client { session_id }
    }

    /// Whether this address identifies a hub.
    pub fn is_hub(&self) -> bool {
        matches!(self, Address::Hub { .. })
    }

    /// The hub id, if this is a hub address.
    pub fn hub_id(&self) -> Option<&str> {
        match self {
            Address::Hub { hub_id } => Some(hub_id),
            _ => None,
        }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Address::Hub { hub_id } => write!(f, "hub:{hub_id}"),
            Address::Service { name } => write!(f, "service:{name}"),
            Address::Client { session_id } => write!(f, "client:{session_id}"),
            Address::Broadcast => f.write_str("broadcast"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hub_classification() {
        let hub = Address::hub("ABC-1234");
        assert!(hub.is_hub());
        assert_eq!(hub.hub_id(), Some("ABC-1234"));

        let service = Address::service("status");
        assert!(!service.is_hub());
        assert_eq!(service.hub_id(), None);

        assert!(!Address::Broadcast.is_hub());
    }

    #[test]
    fn test_zero_uuid_is_all_zero() {
        assert_eq!(ZERO_UUID.as_u128(), 0);
    }

    #[test]
    fn test_display() {
        assert_eq!(Address::hub("AAA-0001").to_string(), "hub:AAA-0001");
        assert_eq!(Address::service("status").to_string(), "service:status");
        assert_eq!(Address::Broadcast.to_string(), "broadcast");
    }
}
