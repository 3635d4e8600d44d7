//! Arbitrary-precision modular arithmetic for OT-MPSI.
//!
//! The field's prime is a deployment parameter loaded from a configuration
//! file at runtime rather than known at compile time, so this crate wraps
//! `num-bigint` directly instead of a const-generic fixed-width field type.

#![deny(missing_docs)]
#![forbid(unsafe_code)]
#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::indexing_slicing,
    clippy::iterator_step_by_zero,
    clippy::invalid_regex,
    clippy::string_slice,
    clippy::unimplemented,
    clippy::todo
)]

mod encoding;
mod errors;
mod modulus;
mod sqrt;

pub use encoding::{from_fixed_bytes, to_fixed_bytes};
pub use errors::BigIntError;
pub use modulus::Modulus;

pub use num_bigint::{BigInt, BigUint};
