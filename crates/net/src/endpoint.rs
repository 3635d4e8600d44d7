//! Dialing, accepting, and tracking the set of named channels one party
//! holds open at once.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use basic_types::PartyId;
use tokio::io::AsyncReadExt;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

use crate::channel::TcpChannel;
use crate::errors::NetError;
use crate::wire::{self, NAME_SIZE_LIMIT};

const CONNECT_RETRY_LIMIT: u32 = 20;
const CONNECT_RETRY_DELAY: Duration = Duration::from_secs(3);
const CHANNEL_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// The set of named channels a party has established so far, shared between
/// the accept loop and whatever code is waiting for a given peer to show up.
pub struct ChannelRegistry {
    channels: RwLock<HashMap<PartyId, Arc<TcpChannel>>>,
}

impl ChannelRegistry {
    /// Builds an empty registry.
    pub fn new() -> Arc<Self> {
        Arc::new(Self { channels: RwLock::new(HashMap::new()) })
    }

    /// Registers a channel, replacing any existing one under the same name.
    pub async fn insert(&self, channel: TcpChannel) {
        let peer = channel.peer().clone();
        self.channels.write().await.insert(peer, Arc::new(channel));
    }

    /// Looks up a channel by peer name.
    pub async fn get(&self, peer: &PartyId) -> Result<Arc<TcpChannel>, NetError> {
        self.channels
            .read()
            .await
            .get(peer)
            .cloned()
            .ok_or_else(|| NetError::ChannelNotFound(peer.name().to_string()))
    }

    /// How many channels are currently registered.
    pub async fn len(&self) -> usize {
        self.channels.read().await.len()
    }

    /// Every registered peer name, in no particular order.
    pub async fn peers(&self) -> Vec<PartyId> {
        self.channels.read().await.keys().cloned().collect()
    }
}

/// Blocks until the registry holds at least `target` channels, polling every
/// [`CHANNEL_POLL_INTERVAL`].
pub async fn wait_for_channel_count(registry: &ChannelRegistry, target: usize) {
    while registry.len().await < target {
        tokio::time::sleep(CHANNEL_POLL_INTERVAL).await;
    }
}

/// Spawns a loop that accepts incoming connections on `bind_addr`, reads each
/// connecting peer's name handshake, and registers a channel for it.
pub async fn listen(
    bind_addr: &str,
    field_width: usize,
    registry: Arc<ChannelRegistry>,
) -> Result<JoinHandle<()>, NetError> {
    let listener = TcpListener::bind(bind_addr).await?;
    Ok(tokio::spawn(async move {
        loop {
            let (stream, addr) = match listener.accept().await {
                Ok(pair) => pair,
                Err(err) => {
                    tracing::warn!(%err, "accept failed");
                    continue;
                }
            };
            let registry = registry.clone();
            tokio::spawn(async move {
                if let Err(err) = accept_one(stream, field_width, &registry).await {
                    tracing::warn!(%addr, %err, "failed to complete handshake with peer");
                }
            });
        }
    }))
}

async fn accept_one(stream: TcpStream, field_width: usize, registry: &ChannelRegistry) -> Result<(), NetError> {
    let (mut read_half, write_half) = stream.into_split();
    let mut name_buf = [0u8; NAME_SIZE_LIMIT];
    read_half.read_exact(&mut name_buf).await?;
    let peer = PartyId::from(wire::decode_name(&name_buf));
    let channel = TcpChannel::new(peer, read_half, write_half, field_width);
    registry.insert(channel).await;
    Ok(())
}

/// Dials `address`, retrying up to [`CONNECT_RETRY_LIMIT`] times, sends the
/// local name handshake, and registers the resulting channel under
/// `remote_name`.
///
/// # Errors
///
/// Returns [`NetError::ConnectRetriesExhausted`] if every attempt fails.
pub async fn connect(
    address: &str,
    remote_name: PartyId,
    local_name: &PartyId,
    field_width: usize,
    registry: &ChannelRegistry,
) -> Result<(), NetError> {
    let mut attempts = 0;
    let stream = loop {
        attempts += 1;
        match TcpStream::connect(address).await {
            Ok(stream) => break stream,
            Err(err) if attempts < CONNECT_RETRY_LIMIT => {
                tracing::warn!(%address, attempt = attempts, %err, "connect failed, retrying");
                tokio::time::sleep(CONNECT_RETRY_DELAY).await;
            }
            Err(_) => {
                return Err(NetError::ConnectRetriesExhausted {
                    address: address.to_string(),
                    attempts,
                })
            }
        }
    };

    let (read_half, mut write_half) = stream.into_split();
    let handshake = wire::encode_name(local_name.name())?;
    tokio::io::AsyncWriteExt::write_all(&mut write_half, &handshake).await?;

    let channel = TcpChannel::new(remote_name, read_half, write_half, field_width);
    registry.insert(channel).await;
    Ok(())
}
