//! The pre-generated field/group parameter file, kept separate from the
//! per-run party configuration since it is shared, regenerated rarely, and
//! produced offline by the (out of scope) prime-search tooling.

use std::str::FromStr;

use bigint::BigUint;
use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

/// The field and group parameters every party in a deployment shares,
/// serialized as decimal strings since they are far larger than any native
/// integer type.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FieldParamsFile {
    /// The field modulus `p`, as a decimal string.
    pub p: String,

    /// The field's generator `alpha`, as a decimal string.
    pub alpha: String,

    /// The small prime `q` whose power divides `p - 1`, as a decimal string.
    pub q: String,

    /// The exponent `k` such that `q^k | p - 1`.
    pub power_q: u32,

    /// The prime factors of `p - 1`, as decimal strings, including `q`
    /// itself.
    pub phi_factors: Vec<String>,
}

impl FieldParamsFile {
    /// Parses every decimal string field into a [`bigint::BigUint`],
    /// producing validated [`elgamal::FieldParams`].
    pub fn into_field_params(self) -> Result<elgamal::FieldParams, ConfigError> {
        let p = parse_biguint("p", &self.p)?;
        let alpha = parse_biguint("alpha", &self.alpha)?;
        let q = parse_biguint("q", &self.q)?;
        let phi_factors = self
            .phi_factors
            .iter()
            .map(|factor| parse_biguint("phi_factors", factor))
            .collect::<Result<Vec<_>, _>>()?;

        elgamal::FieldParams::new(p, alpha, q, self.power_q, phi_factors)
            .map_err(|source| ConfigError::Load(config::ConfigError::Message(source.to_string())))
    }
}

fn parse_biguint(field: &'static str, value: &str) -> Result<BigUint, ConfigError> {
    BigUint::from_str(value).map_err(|_| ConfigError::InvalidBigInt { field, value: value.to_string() })
}
