//! The base protocol variant: one mutual decryption round per bloom filter
//! position the server actually hit, padded with dummy rounds up to a fixed
//! `B` total so every run produces the same amount of traffic regardless of
//! how many elements intersect.

use bigint::BigUint;
use bloom::CountingBloomFilter;
use elgamal::{Ciphertext, FieldParams};
use num_traits::One;
use rand::RngCore;

use crate::errors::ProtocolError;
use crate::mutual_decrypt;
use crate::party::Party;

/// The server's per-position vote-base ciphertexts and the shared
/// rerandomization pool, produced by [`prepare`].
pub struct Prepared {
    /// Server-only: one ciphertext per bloom filter position. Empty for
    /// clients, who stream ciphertexts through the ring one position at a
    /// time instead of holding the whole vector.
    pub encrypted_bases: Vec<Ciphertext>,

    /// A pool of `B` freshly encrypted `1`s, consumed one per position to
    /// rerandomize that position's ciphertext as it passes through.
    pub rerand_pool: Vec<Ciphertext>,

    /// Server-only: the plaintext vote base this round's ciphertexts were
    /// built from, needed by the enhanced variant to precompute its count
    /// extraction table.
    pub vote_base: Option<BigUint>,
}

/// Builds this party's vote-base ciphertexts (server only) and
/// rerandomization pool (every party).
///
/// The pool is sized to `B`, not `k * |local elements|`: the original sizes
/// it to the latter, which a server with more than `k * |elements|` real
/// hits could exhaust. Sizing to `B`, the maximum possible number of
/// positions, removes that failure mode entirely.
pub fn prepare<R: RngCore>(party: &Party, rng: &mut R) -> Result<Prepared, ProtocolError> {
    let bloom_size = party.bloom_size();
    let mut rerand_pool = Vec::with_capacity(bloom_size);
    for _ in 0..bloom_size {
        rerand_pool.push(party.key_holder.encrypt(&BigUint::one(), rng)?);
    }

    let (encrypted_bases, vote_base) = if party.role.is_server() {
        let params = party.key_holder.params();
        let vote_base = elgamal::find_vote_base(params, party.num_parties(), party.threshold(), rng)?;
        let mut bases = Vec::with_capacity(bloom_size);
        for i in 0..bloom_size {
            let base = if party.local_bloom.check_position(i) {
                params.modulus().pow_mod(&vote_base, params.q())
            } else {
                vote_base.clone()
            };
            bases.push(party.key_holder.encrypt(&base, rng)?);
        }
        (bases, Some(vote_base))
    } else {
        (Vec::new(), None)
    };

    Ok(Prepared { encrypted_bases, rerand_pool, vote_base })
}

/// Runs one full revolution of the ring pass.
///
/// The server sends its `B` vote-base ciphertexts to its right neighbor and
/// receives the fully-accumulated set back from its left neighbor. Every
/// client receives a ciphertext from its left neighbor, raises it to the
/// `q`-th power if its own local (inverted) bloom filter missed that
/// position, rerandomizes it, and forwards it to its right neighbor.
pub async fn ring_pass(party: &Party, prepared: &mut Prepared) -> Result<(), ProtocolError> {
    party.router.right_neighbor().ok_or(ProtocolError::MissingNeighbor { which: "right" })?;
    party.router.left_neighbor().ok_or(ProtocolError::MissingNeighbor { which: "left" })?;
    let modulus = party.key_holder.params().modulus();
    let q = party.key_holder.params().q();

    if party.role.is_server() {
        let right_channel = party.router.registry().get(&net::RingRouter::ring_right_key()).await?;
        for ciphertext in &prepared.encrypted_bases {
            right_channel.send_ciphertext(ciphertext)?;
        }
        let left_channel = party.router.registry().get(&net::RingRouter::ring_left_key()).await?;
        for slot in prepared.encrypted_bases.iter_mut() {
            *slot = left_channel.receive_ciphertext().await?;
        }
    } else {
        let left_channel = party.router.registry().get(&net::RingRouter::ring_left_key()).await?;
        let right_channel = party.router.registry().get(&net::RingRouter::ring_right_key()).await?;
        for i in 0..party.bloom_size() {
            let mut temp = left_channel.receive_ciphertext().await?;
            if party.local_bloom.check_position(i) {
                temp = temp.pow(q, modulus);
            }
            let blind = prepared.rerand_pool.get(i).ok_or(bigint::BigIntError::NonPositiveBound)?;
            temp = temp.rerandomize(blind, modulus);
            right_channel.send_ciphertext(&temp)?;
        }
    }
    Ok(())
}

/// Runs every mutual decryption round for the base variant: one real round
/// per position the server locally hit, padded with dummy rounds up to `B`
/// total.
///
/// Returns the decrypted value per position for the server, or an empty
/// vector for clients (who learn nothing).
pub async fn decrypt<R: RngCore>(
    party: &Party,
    prepared: &Prepared,
    rng: &mut R,
) -> Result<Vec<BigUint>, ProtocolError> {
    let bloom_size = party.bloom_size();

    if party.role.is_server() {
        let mut decrypted = vec![BigUint::one(); bloom_size];
        let mut cnt = 0usize;
        for i in 0..bloom_size {
            if !party.local_bloom.check_position(i) {
                let blind = prepared.rerand_pool.get(cnt).ok_or(bigint::BigIntError::NonPositiveBound)?;
                let modulus = party.key_holder.params().modulus();
                let rerandomized = prepared
                    .encrypted_bases
                    .get(i)
                    .ok_or(bigint::BigIntError::NonPositiveBound)?
                    .rerandomize(blind, modulus);
                decrypted[i] = mutual_decrypt::server_round(party, &rerandomized).await?;
                cnt += 1;
            }
        }
        // Pad to a fixed B total rounds so every run produces identical traffic.
        while cnt < bloom_size {
            let dummy = party.key_holder.encrypt(&BigUint::one(), rng)?;
            mutual_decrypt::server_round(party, &dummy).await?;
            cnt += 1;
        }
        Ok(decrypted)
    } else {
        for _ in 0..bloom_size {
            mutual_decrypt::client_round(party).await?;
        }
        Ok(Vec::new())
    }
}

/// Extracts each position's occurrence count from its decrypted value by
/// repeatedly raising it to the `q`-th power until it reaches `1`, counting
/// how many iterations that took. The loop is capped at `N - t + 1`
/// iterations, the vote subgroup's exponent slack, since no genuine count
/// can fall short of the threshold and still need more; a full, genuine
/// match (every party has the element) collapses to `1` on exactly the
/// `cap`-th iteration.
///
/// A value that still isn't `1` once the cap is hit never belonged to the
/// vote subgroup in the first place — corrupted or adversarial input, since
/// an honestly-produced one always collapses at or before `cap` — and is
/// reported as a count of `0` rather than the cap itself, so it is treated
/// as not in the intersection instead of silently becoming the maximum
/// possible count.
pub fn extract_counts(params: &FieldParams, num_parties: u32, threshold: u32, decrypted: &[BigUint]) -> Vec<u32> {
    let cap = num_parties - threshold + 1;
    let modulus = params.modulus();
    decrypted
        .iter()
        .map(|value| {
            let mut temp = value.clone();
            let mut cnt = 0u32;
            while temp != BigUint::one() && cnt < cap {
                temp = modulus.pow_mod(&temp, params.q());
                cnt += 1;
            }
            if temp == BigUint::one() {
                cnt
            } else {
                0
            }
        })
        .collect()
}

/// Builds the final counting bloom filter from per-position counts and
/// checks it against the server's own elements, returning the elements that
/// met the threshold together with their recovered occurrence count.
pub fn find_intersection(party: &Party, counts: &[u32]) -> Vec<(u32, bloom::Element)> {
    if !party.role.is_server() {
        return Vec::new();
    }
    let threshold = party.threshold();
    let mut rcbf = CountingBloomFilter::new(party.bloom_size(), party.local_bloom.seeds().to_vec());
    for (i, &cnt) in counts.iter().enumerate() {
        if cnt > 0 {
            rcbf.set(i, threshold - 1 + cnt);
        }
    }
    party
        .elements
        .iter()
        .filter_map(|&element| {
            let num = rcbf.check_element(element);
            (num > 0).then_some((num, element))
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use num_traits::FromPrimitive;

    /// `p = 727`, `q = 11`, `power_q = 2`, matching `tests/ring_protocol.rs`,
    /// so `cap = num_parties - threshold + 1 == 2` here too.
    fn ring_sized_params() -> FieldParams {
        FieldParams::new(
            BigUint::from_u32(727).unwrap(),
            BigUint::from_u32(5).unwrap(),
            BigUint::from_u32(11).unwrap(),
            2,
            vec![BigUint::from_u32(2).unwrap(), BigUint::from_u32(3).unwrap(), BigUint::from_u32(11).unwrap()],
        )
        .unwrap()
    }

    #[test]
    fn extract_counts_recognizes_a_genuine_full_match_at_the_cap() {
        let params = ring_sized_params();
        let modulus = params.modulus();
        // a position missed by nobody decrypts to the vote base itself,
        // which takes exactly `cap` q-th powerings to collapse to 1.
        let vote_base = modulus.pow_mod(&BigUint::from_u32(5).unwrap(), &BigUint::from_u32(6).unwrap());
        let cnts = extract_counts(&params, 3, 2, &[vote_base]);
        assert_eq!(cnts, vec![2]);
    }

    #[test]
    fn extract_counts_treats_a_value_outside_the_vote_subgroup_as_not_in_the_intersection() {
        let params = ring_sized_params();
        // alpha itself has order 726, not a power of q = 11, so raising it
        // to the q-th power twice never reaches 1.
        let bogus = BigUint::from_u32(5).unwrap();
        let cnts = extract_counts(&params, 3, 2, &[bogus]);
        assert_eq!(cnts, vec![0]);
    }
}
