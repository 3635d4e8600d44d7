//! Broadcast/collect helpers over the full party list, and ring-neighbor
//! lookup, both addressed through a shared [`ChannelRegistry`].

use std::sync::Arc;

use basic_types::PartyId;
use bigint::BigUint;
use elgamal::Ciphertext;

use crate::endpoint::ChannelRegistry;
use crate::errors::NetError;

/// The registry key a party uses locally for the ring connection it dials
/// itself (to its right neighbor), and the literal name it sends over the
/// wire when dialing that connection — announcing "I am your left
/// neighbor" regardless of its own real identity.
///
/// Using fixed role names for the two ring connections, distinct from the
/// real party-identifier keys used for server/client addressing, is what
/// lets a party's ring neighbor and its server both resolve to the same
/// remote peer (common in small rings) without one connection's registry
/// entry silently overwriting the other's.
pub const RING_RIGHT_KEY: &str = "right";

/// The registry key a party uses locally for the inbound ring connection
/// accepted from its left neighbor. This is also the literal wire name every
/// ring-right dial announces itself as, so the accepting side always files
/// it under this same reserved key.
pub const RING_LEFT_KEY: &str = "left";

/// Routes messages to peers by the fixed party list every party agrees on,
/// and resolves the ring's left/right neighbors from that same ordering.
pub struct RingRouter {
    local: PartyId,
    party_list: Vec<PartyId>,
    registry: Arc<ChannelRegistry>,
}

impl RingRouter {
    /// Builds a router over `party_list` (the full, fixed membership in ring
    /// order) for `local`, resolving channels through `registry`.
    pub fn new(local: PartyId, party_list: Vec<PartyId>, registry: Arc<ChannelRegistry>) -> Self {
        Self { local, party_list, registry }
    }

    /// The configured party list, in ring order.
    pub fn party_list(&self) -> &[PartyId] {
        &self.party_list
    }

    /// This party's own id.
    pub fn local(&self) -> &PartyId {
        &self.local
    }

    /// The party that sends to this one on the ring (the previous entry in
    /// `party_list`, wrapping around).
    pub fn left_neighbor(&self) -> Option<&PartyId> {
        self.neighbor(-1)
    }

    /// The party this one sends to on the ring (the next entry in
    /// `party_list`, wrapping around).
    pub fn right_neighbor(&self) -> Option<&PartyId> {
        self.neighbor(1)
    }

    fn neighbor(&self, offset: isize) -> Option<&PartyId> {
        let len = self.party_list.len();
        if len == 0 {
            return None;
        }
        let index = self.party_list.iter().position(|p| p == &self.local)?;
        let shifted = (index as isize + offset).rem_euclid(len as isize) as usize;
        self.party_list.get(shifted)
    }

    /// Every party other than this one, in `party_list` order.
    pub fn other_parties(&self) -> impl Iterator<Item = &PartyId> {
        self.party_list.iter().filter(move |p| *p != &self.local)
    }

    /// Sends `value` to every other party, in `party_list` order.
    pub async fn broadcast_bigint(&self, value: &BigUint) -> Result<(), NetError> {
        for peer in self.other_parties().cloned().collect::<Vec<_>>() {
            self.registry.get(&peer).await?.send_bigint(value)?;
        }
        Ok(())
    }

    /// Receives one field number from every other party, in `party_list`
    /// order.
    pub async fn collect_bigints(&self) -> Result<Vec<BigUint>, NetError> {
        let mut out = Vec::with_capacity(self.party_list.len().saturating_sub(1));
        for peer in self.other_parties().cloned().collect::<Vec<_>>() {
            out.push(self.registry.get(&peer).await?.receive_bigint().await?);
        }
        Ok(out)
    }

    /// Sends `ciphertext` to every other party, in `party_list` order.
    pub async fn broadcast_ciphertext(&self, ciphertext: &Ciphertext) -> Result<(), NetError> {
        for peer in self.other_parties().cloned().collect::<Vec<_>>() {
            self.registry.get(&peer).await?.send_ciphertext(ciphertext)?;
        }
        Ok(())
    }

    /// Receives one ciphertext from every other party, in `party_list`
    /// order.
    pub async fn collect_ciphertexts(&self) -> Result<Vec<Ciphertext>, NetError> {
        let mut out = Vec::with_capacity(self.party_list.len().saturating_sub(1));
        for peer in self.other_parties().cloned().collect::<Vec<_>>() {
            out.push(self.registry.get(&peer).await?.receive_ciphertext().await?);
        }
        Ok(out)
    }

    /// Looks up the channel registry directly, for callers that need a
    /// specific named peer (e.g. every client addressing `server`).
    pub fn registry(&self) -> &Arc<ChannelRegistry> {
        &self.registry
    }

    /// The reserved registry key for this party's own outbound ring
    /// connection, regardless of which real party it happens to resolve to.
    pub fn ring_right_key() -> PartyId {
        PartyId::from(RING_RIGHT_KEY)
    }

    /// The reserved registry key (and wire announcement) for this party's
    /// inbound ring connection.
    pub fn ring_left_key() -> PartyId {
        PartyId::from(RING_LEFT_KEY)
    }
}
