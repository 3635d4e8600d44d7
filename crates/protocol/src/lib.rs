//! OT-MPSI: ties connection setup, distributed key generation, the ring
//! pass, and mutual decryption together into one protocol round, in either
//! the base or enhanced variant.

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

mod base;
mod dkg;
mod enhanced;
mod errors;
mod latency;
mod mutual_decrypt;
mod party;
mod setup;

use std::time::Duration;

use rand::RngCore;

pub use errors::ProtocolError;
pub use party::Party;
pub use setup::{establish_connections, server_identity};

/// Which protocol variant a round runs under.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Variant {
    /// One mutual decryption round per bloom filter position.
    Base,
    /// One mutual decryption round per locally hit element, with a
    /// precomputed count-extraction table.
    Enhanced,
}

/// What one completed round produced.
#[derive(Debug, Default)]
pub struct RoundOutcome {
    /// Elements that met the occurrence threshold, with their recovered
    /// count. Always empty for clients.
    pub intersection: Vec<(u32, bloom::Element)>,

    /// The ring's round-trip latency, if measured this round. Always
    /// `None` for clients.
    pub ring_latency: Option<Duration>,
}

impl Party {
    /// Runs distributed key generation, producing the aggregate public key
    /// every subsequent round encrypts under. Call once after connections
    /// are established and before the first [`Party::run_round`].
    pub async fn run_dkg(&mut self) -> Result<(), ProtocolError> {
        if self.role.is_server() {
            dkg::run_server(self).await
        } else {
            dkg::run_client(self).await
        }
    }

    /// Measures the ring's round-trip latency. Always `Ok(None)` for
    /// clients.
    pub async fn measure_ring_latency(&self) -> Result<Option<Duration>, ProtocolError> {
        latency::measure(self).await
    }

    /// Runs one full protocol round under `variant`: prepare, ring pass,
    /// mutual decryption, count extraction, and (for the server) threshold
    /// intersection.
    ///
    /// The same party can call this repeatedly, optionally interleaved with
    /// [`Party::reset_elements`] to feed a different local set each time;
    /// connection setup and key generation run only once.
    pub async fn run_round<R: RngCore>(&self, variant: Variant, rng: &mut R) -> Result<RoundOutcome, ProtocolError> {
        let mut prepared = base::prepare(self, rng)?;
        base::ring_pass(self, &mut prepared).await?;

        let intersection = match variant {
            Variant::Base => {
                let decrypted = base::decrypt(self, &prepared, rng).await?;
                if self.role.is_server() {
                    let params = self.key_holder.params();
                    let counts = base::extract_counts(params, self.num_parties(), self.threshold(), &decrypted);
                    base::find_intersection(self, &counts)
                } else {
                    Vec::new()
                }
            }
            Variant::Enhanced => {
                let decrypted = enhanced::decrypt(self, &prepared, rng).await?;
                if self.role.is_server() {
                    let vote_base = prepared.vote_base.clone().ok_or(ProtocolError::MissingVoteBase)?;
                    let params = self.key_holder.params();
                    let table = enhanced::build_count_table(params, &vote_base, self.num_parties(), self.threshold())?;
                    let counts = enhanced::extract_counts(params, &table, self.config.number_of_hash_functions, &decrypted);
                    enhanced::find_intersection(self, &counts)
                } else {
                    Vec::new()
                }
            }
        };

        Ok(RoundOutcome { intersection, ring_latency: None })
    }
}
