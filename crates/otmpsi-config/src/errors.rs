//! Configuration loading and validation errors.

use thiserror::Error;

/// Errors produced while loading or validating a party's configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The underlying `config` crate failed to load or deserialize the file.
    #[error(transparent)]
    Load(#[from] config::ConfigError),

    /// A big-integer field in the parameter file was not valid decimal.
    #[error("field {field} is not a valid decimal integer: {value}")]
    InvalidBigInt {
        /// The field name.
        field: &'static str,
        /// The offending raw value.
        value: String,
    },

    /// The threshold exceeds the number of parties.
    #[error("threshold {threshold} exceeds numberOfParties {num_parties}")]
    ThresholdExceedsParties {
        /// Configured threshold `t`.
        threshold: u32,
        /// Configured party count `N`.
        num_parties: u32,
    },

    /// `numberOfParties - threshold` does not leave enough slack for the vote
    /// subgroup (`power_q` must exceed it).
    #[error("numberOfParties - threshold ({slack}) is not smaller than power_q ({power_q})")]
    InsufficientSubgroupSlack {
        /// `numberOfParties - threshold`.
        slack: u32,
        /// The field parameters' `power_q`.
        power_q: u32,
    },

    /// `numberOfHashFunctions` is not smaller than `q`, violating the
    /// assumption the count-extraction loop relies on.
    #[error("numberOfHashFunctions ({hashes}) is not smaller than q ({q})")]
    TooManyHashFunctions {
        /// Configured hash function count `k`.
        hashes: u32,
        /// The field parameters' `q`.
        q: u32,
    },

    /// `hashSeeds` does not have exactly `numberOfHashFunctions` entries.
    #[error("hashSeeds has {actual} entries, expected numberOfHashFunctions ({expected})")]
    HashSeedCountMismatch {
        /// Configured hash function count `k`.
        expected: u32,
        /// Actual length of `hashSeeds`.
        actual: usize,
    },
}
