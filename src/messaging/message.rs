//! Platform message envelope, reduced to the fields routing needs.

use crate::messaging::address::Address;
use uuid::Uuid;

/// A message moving through the platform.
///
/// Only the routing-relevant envelope is modeled here: the source and
/// destination addresses and the optional place the message concerns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformMessage {
    source: Address,
    destination: Address,
    place_id: Option<Uuid>,
}

impl PlatformMessage {
    /// Start building a message.
    pub fn builder() -> PlatformMessageBuilder {
        PlatformMessageBuilder::default()
    }

    /// A broadcast from the given source with no place context, e.g. the
    /// connection events an unclaimed hub emits.
    pub fn broadcast(source: Address) -> Self {
        Self {
            source,
            destination: Address::Broadcast,
            place_id: None,
        }
    }

    /// Where the message came from.
    pub fn source(&self) -> &Address {
        &self.source
    }

    /// Where the message is going.
    pub fn destination(&self) -> &Address {
        &self.destination
    }

    /// The place this message concerns, if any.
    pub fn place_id(&self) -> Option<Uuid> {
        self.place_id
    }
}

/// Builder for [`PlatformMessage`].
#[derive(Debug, Default)]
pub struct PlatformMessageBuilder {
    source: Option<Address>,
    destination: Option<Address>,
    place_id: Option<Uuid>,
}

impl PlatformMessageBuilder {
    /// Set the source address.
    pub fn from(mut self, source: Address) -> Self {
        self.source = Some(source);
        self
    }

    /// Set the destination address.
    pub fn to(mut self, destination: Address) -> Self {
        self.destination = Some(destination);
        self
    }

    /// Set the place this message concerns.
    pub fn with_place_id(mut self, place_id: Uuid) -> Self {
        self.place_id = Some(place_id);
        self
    }

    /// Build the message. Unset addresses default to broadcast.
    pub fn build(self) -> PlatformMessage {
        PlatformMessage {
            source: self.source.unwrap_or(Address::Broadcast),
            destination: self.destination.unwrap_or(Address::Broadcast),
            place_id: self.place_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let place = Uuid::from_u64_pair(10, 3);
        let message = PlatformMessage::builder()
            .from(Address::client(Uuid::from_u64_pair(0, 1)))
            .to(Address::service("status"))
            .with_place_id(place)
            .build();

        assert_eq!(message.place_id(), Some(place));
        assert_eq!(message.destination(), &Address::service("status"));
        assert!(!message.source().is_hub());
    }

    #[test]
    fn test_broadcast_from_hub() {
        let message = PlatformMessage::broadcast(Address::hub("AAA-0007"));
        assert_eq!(message.place_id(), None);
        assert_eq!(message.source().hub_id(), Some("AAA-0007"));
        assert_eq!(message.destination(), &Address::Broadcast);
    }
}
