//! Finding a base of the exact subgroup order OT-MPSI voting needs.

use bigint::BigUint;
use num_traits::One;
use rand::RngCore;

use crate::errors::ElGamalError;
use crate::params::FieldParams;

/// Bound on rejection-sampling attempts before giving up on finding a
/// generator. A uniformly random element of `Z_p*` is a full-order generator
/// with overwhelming probability for the field sizes this protocol uses, so
/// this bound is never expected to bite; it exists so a malformed parameter
/// file fails loudly instead of looping forever.
const MAX_GENERATOR_ATTEMPTS: u32 = 10_000;

/// True if `candidate` generates the full multiplicative group, i.e.
/// `candidate^((p-1)/f) != 1` for every prime factor `f` of `p - 1`.
pub fn is_full_order_generator(candidate: &BigUint, params: &FieldParams) -> bool {
    let p_minus_one = params.p() - BigUint::one();
    params.phi_factors().iter().all(|factor| {
        let exponent = &p_minus_one / factor;
        params.modulus().pow_mod(candidate, &exponent) != BigUint::one()
    })
}

/// Draws a random base of order `q^(num_parties - threshold + 1)`: a
/// rejection-sampled full-order generator, raised to the exponent that
/// collapses it into the required subgroup.
///
/// # Errors
///
/// Returns [`ElGamalError::GeneratorNotFound`] if no full-order generator
/// turns up within [`MAX_GENERATOR_ATTEMPTS`] draws.
pub fn find_vote_base<R: RngCore>(
    params: &FieldParams,
    num_parties: u32,
    threshold: u32,
    rng: &mut R,
) -> Result<BigUint, ElGamalError> {
    let exponent = params.vote_base_exponent(num_parties, threshold);
    for attempt in 0..MAX_GENERATOR_ATTEMPTS {
        let candidate = params.modulus().random_below(rng, params.p())?;
        if candidate < BigUint::from(2u32) {
            continue;
        }
        if is_full_order_generator(&candidate, params) {
            return Ok(params.modulus().pow_mod(&candidate, &exponent));
        }
        let _ = attempt;
    }
    Err(ElGamalError::GeneratorNotFound {
        attempts: MAX_GENERATOR_ATTEMPTS,
    })
}
