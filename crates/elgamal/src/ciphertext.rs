//! ElGamal ciphertexts and their homomorphic operations.

use bigint::{BigUint, Modulus};

/// An ElGamal ciphertext `(c1, c2) = (alpha^r, beta^r * m)`.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Ciphertext {
    /// `alpha^r mod p`.
    pub c1: BigUint,

    /// `beta^r * m mod p`.
    pub c2: BigUint,
}

impl Ciphertext {
    /// Builds a ciphertext from its two halves.
    pub fn new(c1: BigUint, c2: BigUint) -> Self {
        Self { c1, c2 }
    }

    /// Componentwise multiplication: `Enc(a) * Enc(b) = Enc(a * b)`.
    pub fn mul(&self, other: &Ciphertext, modulus: &Modulus) -> Ciphertext {
        Ciphertext {
            c1: modulus.mul_mod(&self.c1, &other.c1),
            c2: modulus.mul_mod(&self.c2, &other.c2),
        }
    }

    /// Componentwise exponentiation: `Enc(m)^e = Enc(m^e)`.
    pub fn pow(&self, exponent: &BigUint, modulus: &Modulus) -> Ciphertext {
        Ciphertext {
            c1: modulus.pow_mod(&self.c1, exponent),
            c2: modulus.pow_mod(&self.c2, exponent),
        }
    }

    /// Rerandomizes this ciphertext by homomorphically multiplying it with a
    /// fresh encryption of `1`, so its distribution no longer depends on how
    /// it was produced.
    pub fn rerandomize(&self, blinding_factor: &Ciphertext, modulus: &Modulus) -> Ciphertext {
        self.mul(blinding_factor, modulus)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use num_traits::FromPrimitive;

    #[test]
    fn mul_is_commutative_in_each_half() {
        let modulus = Modulus::new(BigUint::from_u32(23).unwrap());
        let a = Ciphertext::new(BigUint::from_u32(3).unwrap(), BigUint::from_u32(5).unwrap());
        let b = Ciphertext::new(BigUint::from_u32(7).unwrap(), BigUint::from_u32(11).unwrap());
        assert_eq!(a.mul(&b, &modulus), b.mul(&a, &modulus));
    }

    #[test]
    fn pow_one_is_identity() {
        let modulus = Modulus::new(BigUint::from_u32(23).unwrap());
        let a = Ciphertext::new(BigUint::from_u32(3).unwrap(), BigUint::from_u32(5).unwrap());
        assert_eq!(a.pow(&BigUint::from_u32(1).unwrap(), &modulus), a);
    }
}
