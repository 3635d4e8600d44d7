//! A single party's full state for one protocol run: its key share, local
//! bloom filter, and the ring router it reaches the rest of the party list
//! through.

use std::sync::Arc;

use basic_types::{PartyId, Role};
use bloom::{BloomFilter, Element};
use elgamal::{FieldParams, KeyHolder};
use net::{ChannelRegistry, RingRouter};
use otmpsi_config::PartyConfig;
use rand::RngCore;

use crate::errors::ProtocolError;

/// Everything one party needs to run the protocol: its role, key material,
/// local (inverted) bloom filter, and routing to the rest of the party list.
pub struct Party {
    /// Whether this party is the server or a client.
    pub role: Role,

    /// This party's threshold ElGamal key share and (after DKG) the
    /// aggregate public key.
    pub key_holder: KeyHolder,

    /// This party's local elements, hashed into `local_bloom` and, for the
    /// server, checked against the final counting filter.
    pub elements: Vec<Element>,

    /// This party's local bloom filter, inverted after every element has
    /// been inserted: a set bit means this position was missed locally.
    pub local_bloom: BloomFilter,

    /// Routes broadcast/collect calls and ring-neighbor lookups to the
    /// rest of the party list.
    pub router: RingRouter,

    /// The run's sizing/threshold configuration.
    pub config: PartyConfig,
}

impl Party {
    /// Builds a party from its role, elements, domain parameters, and
    /// configuration, wiring up a fresh key share and local bloom filter.
    ///
    /// `registry` must already hold a connected channel for every other
    /// party in `config.all_parties` (see [`net::connect`]/[`net::listen`]).
    /// The bloom filter's hash seeds come from `config.hash_seeds`, shared
    /// across every party in the deployment.
    pub fn new<R: RngCore>(
        role: Role,
        elements: Vec<Element>,
        field_params: FieldParams,
        config: PartyConfig,
        registry: Arc<ChannelRegistry>,
        rng: &mut R,
    ) -> Result<Self, ProtocolError> {
        let key_holder = KeyHolder::generate(field_params, rng)?;

        let mut local_bloom = BloomFilter::new(config.bloom_filter_size, config.hash_seeds.clone());
        for &element in &elements {
            local_bloom.insert(element);
        }
        local_bloom.invert();

        let local_name = PartyId::from(config.local_name.clone());
        let party_list: Vec<PartyId> = config.all_parties.iter().cloned().map(PartyId::from).collect();
        let router = RingRouter::new(local_name, party_list, registry);

        Ok(Self { role, key_holder, elements, local_bloom, router, config })
    }

    /// The number of bloom filter bit positions, `B`.
    pub fn bloom_size(&self) -> usize {
        self.config.bloom_filter_size
    }

    /// `N`, the total number of parties.
    pub fn num_parties(&self) -> u32 {
        self.config.number_of_parties
    }

    /// `t`, the occurrence threshold.
    pub fn threshold(&self) -> u32 {
        self.config.threshold
    }

    /// The party addressed by the configured `server` role. By convention
    /// the first entry of `allParties` is the server.
    pub fn server_id(&self) -> PartyId {
        self.router
            .party_list()
            .first()
            .cloned()
            .unwrap_or_else(|| self.router.local().clone())
    }

    /// Replaces this party's local element set and rebuilds its inverted
    /// bloom filter, so the same connections and key material can be reused
    /// across multiple rounds with different inputs.
    pub fn reset_elements(&mut self, elements: Vec<Element>) {
        self.local_bloom.clear();
        for &element in &elements {
            self.local_bloom.insert(element);
        }
        self.local_bloom.invert();
        self.elements = elements;
    }
}
