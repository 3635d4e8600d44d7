//! Error types for modular arithmetic and wire encoding.

use thiserror::Error;

/// Errors produced by [`crate::Modulus`] operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BigIntError {
    /// The value has no inverse modulo `p` (it shares a factor with `p`).
    #[error("value is not invertible modulo p")]
    NotInvertible,

    /// A value did not fit in the requested fixed-width encoding.
    #[error("value requires more than {width} bytes to encode")]
    EncodingTooNarrow {
        /// The fixed width that was requested, in bytes.
        width: usize,
    },

    /// The upper bound passed to a sampling routine was not positive.
    #[error("sampling bound must be positive")]
    NonPositiveBound,
}
