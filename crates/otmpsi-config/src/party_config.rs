//! Per-run party configuration: set sizes, ring addressing, and the
//! threshold/party-count parameters the protocol validates against the
//! field parameters before a run starts.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;
use crate::field_params::FieldParamsFile;

/// One party's full configuration, loaded from a flat JSON document.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PartyConfig {
    /// Number of elements in this party's locally generated set.
    #[serde(rename = "setSize")]
    pub set_size: usize,

    /// Number of bit positions / cells in every bloom filter this run uses.
    #[serde(rename = "bloomFilterSize")]
    pub bloom_filter_size: usize,

    /// Number of elements this party's set shares with the rest, when
    /// generating a synthetic set.
    #[serde(rename = "sameNum")]
    pub same_num: usize,

    /// RNG seed used to generate the shared elements.
    #[serde(rename = "sameSeed")]
    pub same_seed: u64,

    /// RNG seed used to generate this party's non-shared elements.
    #[serde(rename = "diffSeed")]
    pub diff_seed: u64,

    /// How many times to repeat the protocol when run as a benchmark driver.
    #[serde(rename = "benchmarkRounds")]
    pub benchmark_rounds: u32,

    /// `N`, the total number of parties in this deployment.
    #[serde(rename = "numberOfParties")]
    pub number_of_parties: u32,

    /// `t`, the occurrence threshold an element must meet to appear in the
    /// result.
    pub threshold: u32,

    /// `k`, the number of hash functions every bloom filter uses.
    #[serde(rename = "numberOfHashFunctions")]
    pub number_of_hash_functions: u32,

    /// The MurmurHash3 seed for each hash function, in order. Every party in
    /// a deployment must be configured with the same list, since a client's
    /// vote at a given bloom filter position is only meaningful if that
    /// position was hashed the same way by the server.
    #[serde(rename = "hashSeeds")]
    pub hash_seeds: Vec<u32>,

    /// Whether this party plays the server role.
    #[serde(rename = "isServer")]
    pub is_server: bool,

    /// The local TCP port this party listens on.
    pub port: u16,

    /// This party's name, as it appears in `allParties`.
    #[serde(rename = "localName")]
    pub local_name: String,

    /// `host:port` of the server, used by every client to connect.
    #[serde(rename = "serverAddress")]
    pub server_address: String,

    /// `host:port` of this party's right ring neighbor.
    #[serde(rename = "rightNeighborAddress")]
    pub right_neighbor_address: String,

    /// Every party's name, in fixed ring order.
    #[serde(rename = "allParties")]
    pub all_parties: Vec<String>,

    /// Width, in bytes, of a field number on the wire.
    #[serde(rename = "bufferSize")]
    pub buffer_size: usize,
}

impl PartyConfig {
    /// Loads a party configuration from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::from(path.as_ref()).format(config::FileFormat::Json))
            .build()?;
        Ok(settings.try_deserialize()?)
    }

    /// Validates this configuration's arithmetic constraints against the
    /// shared field parameters, as the original benchmark tooling does before
    /// starting a run.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ThresholdExceedsParties`],
    /// [`ConfigError::InsufficientSubgroupSlack`], or
    /// [`ConfigError::TooManyHashFunctions`] if the corresponding invariant
    /// does not hold.
    pub fn validate_against(&self, field_params: &elgamal::FieldParams) -> Result<(), ConfigError> {
        if self.threshold > self.number_of_parties {
            return Err(ConfigError::ThresholdExceedsParties {
                threshold: self.threshold,
                num_parties: self.number_of_parties,
            });
        }
        let slack = self.number_of_parties - self.threshold;
        if slack >= field_params.power_q() {
            return Err(ConfigError::InsufficientSubgroupSlack { slack, power_q: field_params.power_q() });
        }
        let q_u32 = num_traits::ToPrimitive::to_u32(field_params.q()).unwrap_or(u32::MAX);
        if self.number_of_hash_functions >= q_u32 {
            return Err(ConfigError::TooManyHashFunctions { hashes: self.number_of_hash_functions, q: q_u32 });
        }
        if self.hash_seeds.len() != self.number_of_hash_functions as usize {
            return Err(ConfigError::HashSeedCountMismatch {
                expected: self.number_of_hash_functions,
                actual: self.hash_seeds.len(),
            });
        }
        Ok(())
    }
}

/// Loads both the per-run party configuration and the shared field parameter
/// file from disk.
pub fn load_with_field_params(
    party_config_path: impl AsRef<Path>,
    field_params_path: impl AsRef<Path>,
) -> Result<(PartyConfig, elgamal::FieldParams), ConfigError> {
    let party_config = PartyConfig::load(party_config_path)?;
    let field_params_file = load_field_params_file(field_params_path)?;
    let field_params = field_params_file.into_field_params()?;
    party_config.validate_against(&field_params)?;
    Ok((party_config, field_params))
}

fn load_field_params_file(path: impl AsRef<Path>) -> Result<FieldParamsFile, ConfigError> {
    let settings = config::Config::builder()
        .add_source(config::File::from(path.as_ref()).format(config::FileFormat::Json))
        .build()?;
    Ok(settings.try_deserialize()?)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::io::Write;

    fn sample_party_config_json() -> &'static str {
        r#"{
            "setSize": 100,
            "bloomFilterSize": 2048,
            "sameNum": 20,
            "sameSeed": 1,
            "diffSeed": 2,
            "benchmarkRounds": 1,
            "numberOfParties": 3,
            "threshold": 2,
            "numberOfHashFunctions": 3,
            "hashSeeds": [11, 29, 47],
            "isServer": true,
            "port": 9000,
            "localName": "server",
            "serverAddress": "127.0.0.1:9000",
            "rightNeighborAddress": "127.0.0.1:9001",
            "allParties": ["server", "alice", "bob"],
            "bufferSize": 256
        }"#
    }

    #[test]
    fn loads_a_party_config_from_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(sample_party_config_json().as_bytes()).unwrap();
        let config = PartyConfig::load(file.path()).unwrap();
        assert_eq!(config.number_of_parties, 3);
        assert_eq!(config.all_parties, vec!["server", "alice", "bob"]);
    }

    #[test]
    fn rejects_threshold_above_party_count() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let json = sample_party_config_json().replace("\"threshold\": 2", "\"threshold\": 5");
        file.write_all(json.as_bytes()).unwrap();
        let config = PartyConfig::load(file.path()).unwrap();

        let field_params = elgamal::FieldParams::new(
            bigint::BigUint::from(23u32),
            bigint::BigUint::from(5u32),
            bigint::BigUint::from(11u32),
            1,
            vec![bigint::BigUint::from(2u32), bigint::BigUint::from(11u32)],
        )
        .unwrap();

        assert!(matches!(
            config.validate_against(&field_params),
            Err(ConfigError::ThresholdExceedsParties { .. })
        ));
    }
}
