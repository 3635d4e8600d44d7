//! Domain parameters shared by every party: the field `p`, generator `alpha`,
//! the voting subgroup order `q^power_q`, and the prime factorization of
//! `p - 1` the randomness check and generator search both consult.

use bigint::{BigUint, Modulus};
use num_traits::{One, Zero};

use crate::errors::ElGamalError;

/// The public domain parameters of one OT-MPSI deployment.
///
/// These come from a pre-generated parameter file (`p`, `q`, `k`, and the
/// large prime factors of `p - 1`); this type only validates and holds them,
/// it never searches for new ones (that search is an offline step run by
/// separate tooling).
#[derive(Clone, Debug)]
pub struct FieldParams {
    modulus: Modulus,
    alpha: BigUint,
    q: BigUint,
    power_q: u32,
    /// Prime factors of `p - 1`, in the order the original factor list was
    /// supplied. Includes `q` itself.
    phi_factors: Vec<BigUint>,
}

impl FieldParams {
    /// Validates and wraps a set of domain parameters.
    ///
    /// # Errors
    ///
    /// Returns [`ElGamalError::SubgroupOrderMismatch`] if `q^power_q` does not
    /// divide `p - 1`.
    pub fn new(
        p: BigUint,
        alpha: BigUint,
        q: BigUint,
        power_q: u32,
        phi_factors: Vec<BigUint>,
    ) -> Result<Self, ElGamalError> {
        let one = BigUint::one();
        let p_minus_one = &p - &one;
        let mut remainder = p_minus_one;
        for _ in 0..power_q {
            if (&remainder % &q) != BigUint::zero() {
                return Err(ElGamalError::SubgroupOrderMismatch { power_q });
            }
            remainder /= &q;
        }

        Ok(Self {
            modulus: Modulus::new(p),
            alpha,
            q,
            power_q,
            phi_factors,
        })
    }

    /// The field modulus.
    pub fn modulus(&self) -> &Modulus {
        &self.modulus
    }

    /// `p`.
    pub fn p(&self) -> &BigUint {
        self.modulus.value()
    }

    /// The field's generator.
    pub fn alpha(&self) -> &BigUint {
        &self.alpha
    }

    /// The small prime `q` whose power divides `p - 1`.
    pub fn q(&self) -> &BigUint {
        &self.q
    }

    /// The exponent `k` such that `q^k | p - 1`.
    pub fn power_q(&self) -> u32 {
        self.power_q
    }

    /// The order of the subgroup a vote base of the given threshold slack
    /// must have: `q^(num_parties - threshold + 1)`.
    pub fn vote_subgroup_order(&self, num_parties: u32, threshold: u32) -> BigUint {
        let exponent = num_parties - threshold + 1;
        let mut order = BigUint::one();
        for _ in 0..exponent {
            order *= &self.q;
        }
        order
    }

    /// The exponent `(p - 1) / q^(num_parties - threshold + 1)` a random base
    /// must be raised to in order to land in the vote subgroup.
    pub fn vote_base_exponent(&self, num_parties: u32, threshold: u32) -> BigUint {
        let order = self.vote_subgroup_order(num_parties, threshold);
        (self.p() - BigUint::one()) / order
    }

    /// Prime factors of `p - 1`, consulted by both the ciphertext randomness
    /// check and the vote-base generator search.
    pub fn phi_factors(&self) -> &[BigUint] {
        &self.phi_factors
    }
}
