//! Error types for threshold ElGamal domain parameters and keys.

use thiserror::Error;

/// Errors produced while validating domain parameters or keys.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ElGamalError {
    /// `q^power_q` does not divide `p - 1`, so the vote base subgroup of the
    /// required order does not exist.
    #[error("q^{power_q} does not divide p - 1")]
    SubgroupOrderMismatch {
        /// The exponent that was checked.
        power_q: u32,
    },

    /// The field's random-sampling bound was non-positive.
    #[error(transparent)]
    BigInt(#[from] bigint::BigIntError),

    /// No generator of the required subgroup order was found within the
    /// bounded number of rejection-sampling attempts.
    #[error("failed to find a generator of the vote subgroup after {attempts} attempts")]
    GeneratorNotFound {
        /// How many candidates were rejected before giving up.
        attempts: u32,
    },
}
