//! Arithmetic modulo a fixed prime `p`.

use num_bigint::{BigInt, BigUint, RandBigInt, Sign};
use num_integer::Integer;
use num_traits::{One, Signed, Zero};
use rand::RngCore;

use crate::errors::BigIntError;

/// A modulus `p` together with the handful of operations OT-MPSI needs on it.
///
/// `p` is a runtime value: its bit length is a deployment parameter, not
/// something known at compile time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Modulus {
    p: BigUint,
}

impl Modulus {
    /// Wraps `p` as a modulus. Does not check primality; callers are expected to
    /// load `p` from a trusted, pre-generated parameter file.
    pub fn new(p: BigUint) -> Self {
        Self { p }
    }

    /// The modulus itself.
    pub fn value(&self) -> &BigUint {
        &self.p
    }

    /// `base^exp mod p`.
    pub fn pow_mod(&self, base: &BigUint, exp: &BigUint) -> BigUint {
        base.modpow(exp, &self.p)
    }

    /// `base^exp mod p` for a possibly-negative exponent, computed as
    /// `(base^-1)^|exp| mod p` when `exp` is negative.
    ///
    /// Returns `None` if `exp` is negative and `base` has no inverse.
    pub fn pow_mod_signed(&self, base: &BigUint, exp: &BigInt) -> Option<BigUint> {
        if exp.is_negative() {
            let inv = self.inv_mod(base)?;
            let magnitude = exp.magnitude().clone();
            Some(self.pow_mod(&inv, &magnitude))
        } else {
            Some(self.pow_mod(base, &exp.magnitude().clone()))
        }
    }

    /// `a * b mod p`.
    pub fn mul_mod(&self, a: &BigUint, b: &BigUint) -> BigUint {
        (a * b) % &self.p
    }

    /// `a + b mod p`.
    pub fn add_mod(&self, a: &BigUint, b: &BigUint) -> BigUint {
        (a + b) % &self.p
    }

    /// The modular inverse of `a`, or `None` if `gcd(a, p) != 1`.
    pub fn inv_mod(&self, a: &BigUint) -> Option<BigUint> {
        if a.is_zero() {
            return None;
        }
        let p = BigInt::from_biguint(Sign::Plus, self.p.clone());
        let a = BigInt::from_biguint(Sign::Plus, a.clone());
        let gcd = a.extended_gcd(&p);
        if gcd.gcd != BigInt::one() {
            return None;
        }
        let x = gcd.x.mod_floor(&p);
        Some(x.to_biguint().unwrap_or_else(BigUint::zero))
    }

    /// Draws a uniformly random value in `[0, bound)`.
    ///
    /// # Errors
    ///
    /// Returns [`BigIntError::NonPositiveBound`] if `bound` is zero.
    pub fn random_below<R: RngCore>(
        &self,
        rng: &mut R,
        bound: &BigUint,
    ) -> Result<BigUint, BigIntError> {
        if bound.is_zero() {
            return Err(BigIntError::NonPositiveBound);
        }
        Ok(rng.gen_biguint_below(bound))
    }

    /// Draws a uniformly random value in `[low, high)`.
    pub fn random_range<R: RngCore>(
        &self,
        rng: &mut R,
        low: &BigUint,
        high: &BigUint,
    ) -> Result<BigUint, BigIntError> {
        if high <= low {
            return Err(BigIntError::NonPositiveBound);
        }
        let span = high - low;
        Ok(low + rng.gen_biguint_below(&span))
    }

    /// `sqrt(a) mod p` via Tonelli-Shanks, or `None` if `a` is a quadratic
    /// non-residue modulo `p`.
    ///
    /// `p` is assumed odd (true for every cryptographically sized prime this
    /// protocol uses).
    pub fn sqrt(&self, a: &BigUint) -> Option<BigUint> {
        crate::sqrt::tonelli_shanks(a, &self.p)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use num_traits::FromPrimitive;

    fn modulus_23() -> Modulus {
        Modulus::new(BigUint::from_u32(23).unwrap())
    }

    #[test]
    fn pow_mod_matches_known_value() {
        let m = modulus_23();
        let base = BigUint::from_u32(5).unwrap();
        let exp = BigUint::from_u32(4).unwrap();
        assert_eq!(m.pow_mod(&base, &exp), BigUint::from_u32(4).unwrap());
    }

    #[test]
    fn inv_mod_round_trips() {
        let m = modulus_23();
        let a = BigUint::from_u32(7).unwrap();
        let inv = m.inv_mod(&a).expect("7 is invertible mod 23");
        assert_eq!(m.mul_mod(&a, &inv), BigUint::one());
    }

    #[test]
    fn inv_mod_of_multiple_of_p_is_none() {
        let m = modulus_23();
        assert_eq!(m.inv_mod(&BigUint::zero()), None);
    }

    #[test]
    fn pow_mod_signed_negative_exponent_matches_inverse() {
        let m = modulus_23();
        let base = BigUint::from_u32(5).unwrap();
        let inv = m.inv_mod(&base).unwrap();
        let neg_one = BigInt::from_i32(-1).unwrap();
        assert_eq!(m.pow_mod_signed(&base, &neg_one), Some(inv));
    }
}
