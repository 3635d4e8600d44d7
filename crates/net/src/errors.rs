//! Errors produced by the ring channel layer.

use thiserror::Error;

/// Errors raised while connecting, accepting, or exchanging field numbers.
#[derive(Debug, Error)]
pub enum NetError {
    /// An I/O error occurred on the underlying socket.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// A fixed-width field number could not be encoded.
    #[error(transparent)]
    Encoding(#[from] bigint::BigIntError),

    /// A remote party's handshake name did not match any configured party.
    #[error("unknown peer name {0:?} during handshake")]
    UnknownPeer(String),

    /// A named channel was looked up but never registered.
    #[error("no channel registered for {0:?}")]
    ChannelNotFound(String),

    /// Dialing a peer exhausted every retry attempt.
    #[error("failed to connect to {address} after {attempts} attempts")]
    ConnectRetriesExhausted {
        /// The address that was being dialed.
        address: String,
        /// How many attempts were made.
        attempts: u32,
    },
}
