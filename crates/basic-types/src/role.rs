//! The role a party plays in one protocol run.

/// Whether a party is the server (who learns the result) or a client.
///
/// Represented as a tagged enum rather than as distinct `Server`/`Client`
/// trait implementations: the ring topology is data (a role-to-neighbor
/// table), not a type hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Role {
    /// The party that learns the threshold intersection.
    Server,

    /// A party that contributes a key share and set, but learns nothing.
    Client,
}

impl Role {
    /// Returns true for the server role.
    pub fn is_server(self) -> bool {
        matches!(self, Role::Server)
    }
}
