//! Fixed-width little-endian wire encoding for big integers.
//!
//! The channel protocol has no length prefixes: every field number is sent as
//! exactly `num_bytes_field_numbers` bytes, matching the original
//! `BytesFromZZ`/`ZZFromBytes` helpers.

use num_bigint::BigUint;

use crate::errors::BigIntError;

/// Encodes `value` as exactly `width` little-endian bytes.
///
/// # Errors
///
/// Returns [`BigIntError::EncodingTooNarrow`] if `value` does not fit in `width`
/// bytes.
pub fn to_fixed_bytes(value: &BigUint, width: usize) -> Result<Vec<u8>, BigIntError> {
    let mut bytes = value.to_bytes_le();
    if bytes.len() > width {
        return Err(BigIntError::EncodingTooNarrow { width });
    }
    bytes.resize(width, 0);
    Ok(bytes)
}

/// Decodes a little-endian byte buffer of any length into a `BigUint`.
pub fn from_fixed_bytes(bytes: &[u8]) -> BigUint {
    BigUint::from_bytes_le(bytes)
}
