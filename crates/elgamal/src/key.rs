//! Per-party key shares and the threshold encrypt/decrypt operations.

use bigint::{BigInt, BigUint, Modulus};
use num_traits::{One, Zero};
use rand::RngCore;

use crate::ciphertext::Ciphertext;
use crate::errors::ElGamalError;
use crate::params::FieldParams;

/// One party's private exponent, public share, and (once DKG has run) the
/// group's aggregate public key.
///
/// Mirrors the original `KeyHolder`: a single object carries both the
/// party's own secret and the running aggregate public key, since the DKG
/// round mutates the latter in place rather than handing back a fresh type.
#[derive(Clone, Debug)]
pub struct KeyHolder {
    params: FieldParams,
    private_exponent: BigUint,
    /// Before DKG completes this is `alpha^private_exponent`, this party's own
    /// share. After DKG it has been overwritten with the product of every
    /// party's share, the group's aggregate public key.
    public_key: BigUint,
}

impl KeyHolder {
    /// Draws a private exponent uniformly from `[1, p)` and computes this
    /// party's own public share `alpha^a mod p`.
    pub fn generate<R: RngCore>(
        params: FieldParams,
        rng: &mut R,
    ) -> Result<Self, ElGamalError> {
        let one = BigUint::one();
        let private_exponent = params.modulus().random_range(rng, &one, params.p())?;
        let public_key = params.modulus().pow_mod(params.alpha(), &private_exponent);
        Ok(Self {
            params,
            private_exponent,
            public_key,
        })
    }

    /// This party's domain parameters.
    pub fn params(&self) -> &FieldParams {
        &self.params
    }

    /// This party's own public share `alpha^a mod p`, to be sent to the
    /// server during distributed key generation.
    pub fn own_public_share(&self) -> &BigUint {
        &self.public_key
    }

    /// Overwrites the held public key with the group's aggregate, once DKG
    /// has collected and multiplied in every party's share.
    pub fn set_aggregate_public_key(&mut self, aggregate: BigUint) {
        self.public_key = aggregate;
    }

    /// The current public key: this party's own share before DKG, or the
    /// group aggregate after.
    pub fn public_key(&self) -> &BigUint {
        &self.public_key
    }

    /// Encrypts `plaintext` under the held public key, drawing fresh
    /// randomness.
    ///
    /// The randomness acceptance check intentionally reproduces the original
    /// `CoprimeWithPhiP`: it rejects a candidate only when every prime factor
    /// of `p - 1` divides it, not when *any* factor does. A candidate that is
    /// divisible by some but not all factors is accepted even though it is
    /// not actually coprime to `p - 1`.
    pub fn encrypt<R: RngCore>(
        &self,
        plaintext: &BigUint,
        rng: &mut R,
    ) -> Result<Ciphertext, ElGamalError> {
        let modulus = self.params.modulus();
        let p = self.params.p();
        let lower = BigUint::from(3u32);
        let upper = p - &lower;

        let mut r = modulus.random_below(rng, p)?;
        while !is_accepted_randomness(&r, self.params.phi_factors()) || r < lower || r > upper {
            r += BigUint::one();
        }

        let c1 = modulus.pow_mod(self.params.alpha(), &r);
        let c2 = modulus.mul_mod(&modulus.pow_mod(&self.public_key, &r), plaintext);
        Ok(Ciphertext::new(c1, c2))
    }

    /// Produces this party's partial decryption share of a ciphertext's first
    /// half: `c1^(-a) mod p`.
    pub fn partial_decrypt(&self, c1: &BigUint) -> BigUint {
        let neg_a = BigInt::from(self.private_exponent.clone()) * BigInt::from(-1);
        self.params
            .modulus()
            .pow_mod_signed(c1, &neg_a)
            .unwrap_or_else(BigUint::zero)
    }
}

/// Folds every party's partial decryption share (including the server's own)
/// into `c2` to recover the plaintext: `m = c2 * prod(shares) mod p`.
pub fn fully_decrypt(c2: &BigUint, shares: &[BigUint], modulus: &Modulus) -> BigUint {
    shares
        .iter()
        .fold(c2.clone(), |acc, share| modulus.mul_mod(&acc, share))
}

fn is_accepted_randomness(candidate: &BigUint, phi_factors: &[BigUint]) -> bool {
    if phi_factors.is_empty() {
        return true;
    }
    !phi_factors
        .iter()
        .all(|factor| (candidate % factor).is_zero())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use num_traits::FromPrimitive;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    fn small_params() -> FieldParams {
        // p = 23, p - 1 = 22 = 2 * 11, alpha = 5 is a generator.
        FieldParams::new(
            BigUint::from_u32(23).unwrap(),
            BigUint::from_u32(5).unwrap(),
            BigUint::from_u32(11).unwrap(),
            1,
            vec![BigUint::from_u32(2).unwrap(), BigUint::from_u32(11).unwrap()],
        )
        .unwrap()
    }

    #[test]
    fn single_party_decrypt_round_trips() {
        let mut rng = ChaCha20Rng::seed_from_u64(1);
        let holder = KeyHolder::generate(small_params(), &mut rng).unwrap();
        let modulus = holder.params().modulus().clone();

        let plaintext = BigUint::from_u32(9).unwrap();
        let ct = holder.encrypt(&plaintext, &mut rng).unwrap();
        let share = holder.partial_decrypt(&ct.c1);
        let recovered = fully_decrypt(&ct.c2, &[share], &modulus);
        assert_eq!(recovered, plaintext);
    }

    #[test]
    fn homomorphic_mul_multiplies_plaintexts() {
        let mut rng = ChaCha20Rng::seed_from_u64(2);
        let holder = KeyHolder::generate(small_params(), &mut rng).unwrap();
        let modulus = holder.params().modulus().clone();

        let a = BigUint::from_u32(3).unwrap();
        let b = BigUint::from_u32(4).unwrap();
        let ct_a = holder.encrypt(&a, &mut rng).unwrap();
        let ct_b = holder.encrypt(&b, &mut rng).unwrap();
        let ct_ab = ct_a.mul(&ct_b, &modulus);

        let share = holder.partial_decrypt(&ct_ab.c1);
        let recovered = fully_decrypt(&ct_ab.c2, &[share], &modulus);
        assert_eq!(recovered, (&a * &b) % BigUint::from_u32(23).unwrap());
    }

    #[test]
    fn rerandomize_preserves_plaintext() {
        let mut rng = ChaCha20Rng::seed_from_u64(3);
        let holder = KeyHolder::generate(small_params(), &mut rng).unwrap();
        let modulus = holder.params().modulus().clone();

        let plaintext = BigUint::from_u32(6).unwrap();
        let ct = holder.encrypt(&plaintext, &mut rng).unwrap();
        let blind = holder.encrypt(&BigUint::one(), &mut rng).unwrap();
        let rerandomized = ct.rerandomize(&blind, &modulus);

        let share = holder.partial_decrypt(&rerandomized.c1);
        let recovered = fully_decrypt(&rerandomized.c2, &[share], &modulus);
        assert_eq!(recovered, plaintext);
        assert_ne!(rerandomized.c1, ct.c1);
    }
}
