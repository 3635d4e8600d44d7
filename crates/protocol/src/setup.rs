//! Connection establishment: every party binds its own listener, dials the
//! outbound channels its role requires, and waits until every expected
//! channel has arrived.
//!
//! Two distinct dial patterns are used, recovered from the original
//! `Participant::InitializeClient`/`InitializeServer`:
//!
//! - **Star dial** (clients only, to the server): announces the dialer's own
//!   real party identity over the wire, so the server can file the inbound
//!   connection under that specific client's name for later broadcast/
//!   collect addressing.
//! - **Ring dial** (every party, to its right neighbor): always announces
//!   the fixed literal `"left"`, and is filed locally under the fixed
//!   literal `"right"` (see [`net::RING_LEFT_KEY`]/[`net::RING_RIGHT_KEY`]).
//!   Keying the two ring connections by role rather than by the neighbor's
//!   real identity is what lets a small ring (where a party's right
//!   neighbor and its server happen to be the same remote peer) open two
//!   independent sockets instead of one dial's registry entry silently
//!   replacing the other's.

use std::sync::Arc;

use basic_types::PartyId;
use net::{ChannelRegistry, RingRouter};
use otmpsi_config::PartyConfig;

use crate::errors::ProtocolError;

/// Binds this party's listener and opens every outbound channel its role
/// requires, blocking until the full expected channel count has arrived:
/// `N + 1` for the server (one per client, plus its own ring dial, plus the
/// inbound ring connection from its left neighbor), `3` for a client (the
/// server, its own ring dial, and the inbound ring connection).
pub async fn establish_connections(config: &PartyConfig) -> Result<Arc<ChannelRegistry>, ProtocolError> {
    let registry = ChannelRegistry::new();
    let field_width = config.buffer_size;
    let local_id = PartyId::from(config.local_name.clone());
    let bind_addr = format!("0.0.0.0:{}", config.port);

    net::listen(&bind_addr, field_width, registry.clone()).await?;

    if config.is_server {
        net::connect(
            &config.right_neighbor_address,
            RingRouter::ring_right_key(),
            &RingRouter::ring_left_key(),
            field_width,
            &registry,
        )
        .await?;
        let target = config.number_of_parties as usize + 1;
        net::wait_for_channel_count(&registry, target).await;
    } else {
        let server_id = server_identity(config);
        net::connect(&config.server_address, server_id, &local_id, field_width, &registry).await?;
        net::connect(
            &config.right_neighbor_address,
            RingRouter::ring_right_key(),
            &RingRouter::ring_left_key(),
            field_width,
            &registry,
        )
        .await?;
        net::wait_for_channel_count(&registry, 3).await;
    }

    Ok(registry)
}

/// The server's real party identity, by convention the first entry of
/// `allParties`.
pub fn server_identity(config: &PartyConfig) -> PartyId {
    config
        .all_parties
        .first()
        .cloned()
        .map(PartyId::from)
        .unwrap_or_else(|| PartyId::from(config.local_name.clone()))
}
