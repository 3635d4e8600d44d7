//! A single named, bidirectional channel to one peer.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use basic_types::PartyId;
use bigint::BigUint;
use elgamal::Ciphertext;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::sync::{Mutex as AsyncMutex, Notify};
use tokio::task::JoinHandle;

use crate::errors::NetError;

/// A double-buffered, mutex-guarded outbound queue.
///
/// Writers append to the active buffer under a short-lived lock and return
/// immediately; a single background task swaps the buffer out (leaving a
/// fresh, empty one in its place) and writes the swapped-out bytes to the
/// socket without holding the lock, so a slow write never blocks a caller
/// appending more data.
struct OutboundWriter {
    buffer: std::sync::Mutex<Vec<u8>>,
    notify: Notify,
}

impl OutboundWriter {
    fn new() -> Arc<Self> {
        Arc::new(Self { buffer: std::sync::Mutex::new(Vec::new()), notify: Notify::new() })
    }

    fn push(&self, bytes: &[u8]) {
        let mut guard = self.buffer.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        guard.extend_from_slice(bytes);
        drop(guard);
        self.notify.notify_one();
    }

    fn swap_out(&self) -> Vec<u8> {
        let mut guard = self.buffer.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        std::mem::take(&mut *guard)
    }
}

fn spawn_writer_task(writer: Arc<OutboundWriter>, mut socket: OwnedWriteHalf) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            writer.notify.notified().await;
            let pending = writer.swap_out();
            if pending.is_empty() {
                continue;
            }
            if socket.write_all(&pending).await.is_err() {
                return;
            }
        }
    })
}

/// A bidirectional channel addressed by the peer's configured name.
///
/// Sends are asynchronous and buffered through [`OutboundWriter`]; receives
/// block on the read half directly, mirroring the original's synchronous
/// `Read` call on the (separately owned) receive side of the socket.
pub struct TcpChannel {
    peer: PartyId,
    read_half: AsyncMutex<OwnedReadHalf>,
    writer: Arc<OutboundWriter>,
    _writer_task: JoinHandle<()>,
    field_width: usize,
    bytes_sent: AtomicU64,
    bytes_received: AtomicU64,
}

impl TcpChannel {
    /// Wraps a connected socket, already past the name handshake, as a named
    /// channel.
    pub fn new(peer: PartyId, read_half: OwnedReadHalf, write_half: OwnedWriteHalf, field_width: usize) -> Self {
        let writer = OutboundWriter::new();
        let task = spawn_writer_task(writer.clone(), write_half);
        Self {
            peer,
            read_half: AsyncMutex::new(read_half),
            writer,
            _writer_task: task,
            field_width,
            bytes_sent: AtomicU64::new(0),
            bytes_received: AtomicU64::new(0),
        }
    }

    /// The peer this channel is connected to.
    pub fn peer(&self) -> &PartyId {
        &self.peer
    }

    /// Total bytes queued for sending over this channel's lifetime.
    pub fn bytes_sent(&self) -> u64 {
        self.bytes_sent.load(Ordering::Relaxed)
    }

    /// Total bytes read from this channel's lifetime.
    pub fn bytes_received(&self) -> u64 {
        self.bytes_received.load(Ordering::Relaxed)
    }

    /// Encodes and queues a single field number for sending.
    pub fn send_bigint(&self, value: &BigUint) -> Result<(), NetError> {
        let bytes = bigint::to_fixed_bytes(value, self.field_width)?;
        self.bytes_sent.fetch_add(bytes.len() as u64, Ordering::Relaxed);
        self.writer.push(&bytes);
        Ok(())
    }

    /// Blocks until exactly one field number has arrived and decodes it.
    pub async fn receive_bigint(&self) -> Result<BigUint, NetError> {
        let mut buf = vec![0u8; self.field_width];
        {
            let mut guard = self.read_half.lock().await;
            guard.read_exact(&mut buf).await?;
        }
        self.bytes_received.fetch_add(buf.len() as u64, Ordering::Relaxed);
        Ok(bigint::from_fixed_bytes(&buf))
    }

    /// Sends a ciphertext as two sequential field numbers (`c1` then `c2`).
    pub fn send_ciphertext(&self, ciphertext: &Ciphertext) -> Result<(), NetError> {
        self.send_bigint(&ciphertext.c1)?;
        self.send_bigint(&ciphertext.c2)
    }

    /// Receives a ciphertext as two sequential field numbers (`c1` then
    /// `c2`).
    pub async fn receive_ciphertext(&self) -> Result<Ciphertext, NetError> {
        let c1 = self.receive_bigint().await?;
        let c2 = self.receive_bigint().await?;
        Ok(Ciphertext::new(c1, c2))
    }

    /// Sends a short, fixed 2-byte probe, used by the ring latency
    /// measurement.
    pub fn send_probe(&self) {
        self.writer.push(&[0u8; 2]);
    }

    /// Receives a short, fixed 2-byte probe.
    pub async fn receive_probe(&self) -> Result<(), NetError> {
        let mut buf = [0u8; 2];
        let mut guard = self.read_half.lock().await;
        guard.read_exact(&mut buf).await?;
        Ok(())
    }
}
