//! Errors that can arise while orchestrating one protocol run.

use thiserror::Error;

/// Errors produced during setup, the ring pass, or decryption/extraction.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// A network-layer error (connection, handshake, or field number I/O).
    #[error(transparent)]
    Net(#[from] net::NetError),

    /// A state machine driving a collection round failed.
    #[error(transparent)]
    StateMachine(#[from] state_machine::errors::StateMachineError),

    /// A domain-parameter or key error from the ElGamal layer.
    #[error(transparent)]
    ElGamal(#[from] elgamal::ElGamalError),

    /// A big-integer arithmetic error.
    #[error(transparent)]
    BigInt(#[from] bigint::BigIntError),

    /// The ring topology has no configured left or right neighbor for this
    /// party (an empty or single-entry party list).
    #[error("no {which} neighbor configured for this party")]
    MissingNeighbor {
        /// Which neighbor was missing (`"left"` or `"right"`).
        which: &'static str,
    },

    /// The enhanced variant's count extraction needs the vote base produced
    /// during `prepare`, which only the server holds.
    #[error("enhanced extraction requires a server-prepared vote base")]
    MissingVoteBase,
}
