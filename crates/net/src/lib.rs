//! The ring's network layer: fixed-width field-number channels, connection
//! setup, and broadcast/collect helpers over the party list.

#![deny(missing_docs)]
#![forbid(unsafe_code)]
#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::iterator_step_by_zero,
    clippy::invalid_regex,
    clippy::string_slice,
    clippy::unimplemented,
    clippy::todo
)]

mod channel;
mod endpoint;
mod errors;
mod router;
mod wire;

pub use channel::TcpChannel;
pub use endpoint::{connect, listen, wait_for_channel_count, ChannelRegistry};
pub use errors::NetError;
pub use router::{RingRouter, RING_LEFT_KEY, RING_RIGHT_KEY};
pub use wire::NAME_SIZE_LIMIT;
