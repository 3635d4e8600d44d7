//! Party identifiers.
//!
//! Unlike a uuid- or key-derived id, a party in this protocol is addressed by the
//! plain name it was configured with (`localName` / an entry of `allParties`), so
//! `PartyId` wraps a `String` rather than raw bytes.

use std::fmt::{self, Debug, Display, Formatter};

/// Identifies a party by its configured name (e.g. `"server"`, `"alice"`).
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PartyId(String);

impl PartyId {
    /// Wraps a name as a `PartyId`.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the party's name.
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PartyId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for PartyId {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

impl Display for PartyId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Debug for PartyId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "PartyId({})", self.0)
    }
}

/// A message tagged with the party that sent it.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PartyMessage<T> {
    /// The sender's party id.
    pub sender: PartyId,

    /// The message payload.
    pub message: T,
}

impl<T> PartyMessage<T> {
    /// Builds a new tagged message.
    pub fn new(sender: PartyId, message: T) -> Self {
        Self { sender, message }
    }

    /// Splits this message into its sender and payload.
    pub fn into_parts(self) -> (PartyId, T) {
        (self.sender, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_is_by_name() {
        assert_eq!(PartyId::from("alice"), PartyId::from("alice".to_string()));
        assert_ne!(PartyId::from("alice"), PartyId::from("bob"));
    }

    #[test]
    fn display_round_trips_name() {
        let id = PartyId::from("server");
        assert_eq!(id.name(), "server");
        assert_eq!(id.to_string(), "server");
    }
}
