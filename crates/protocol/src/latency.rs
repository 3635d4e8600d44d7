//! A one-shot latency probe around the ring, recovered from the original's
//! `RingLatency` step: the server sends a small fixed-size probe to its
//! right neighbor, every client forwards it on, and the server measures the
//! time until it arrives back from its left neighbor.

use std::time::{Duration, Instant};

use crate::errors::ProtocolError;
use crate::party::Party;

/// Sends a probe around the full ring and, for the server, returns how long
/// the round trip took. Clients return `None`.
pub async fn measure(party: &Party) -> Result<Option<Duration>, ProtocolError> {
    party.router.right_neighbor().ok_or(ProtocolError::MissingNeighbor { which: "right" })?;
    party.router.left_neighbor().ok_or(ProtocolError::MissingNeighbor { which: "left" })?;
    let right = net::RingRouter::ring_right_key();
    let left = net::RingRouter::ring_left_key();

    if party.role.is_server() {
        let start = Instant::now();
        party.router.registry().get(&right).await?.send_probe();
        party.router.registry().get(&left).await?.receive_probe().await?;
        let elapsed = start.elapsed();
        tracing::debug!(?elapsed, "ring latency");
        Ok(Some(elapsed))
    } else {
        party.router.registry().get(&left).await?.receive_probe().await?;
        party.router.registry().get(&right).await?.send_probe();
        Ok(None)
    }
}
