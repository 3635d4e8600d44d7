//! The enhanced variant: every server element's `k` hash-position
//! ciphertexts are combined into one via homomorphic multiplication before
//! mutual decryption, so the number of decrypt rounds matches the number of
//! locally hit elements rather than the full bloom filter width, and a
//! precomputed table turns count extraction into a lookup instead of a
//! repeated exponentiation per element.
//!
//! Connection setup, key generation, and the ring pass itself are unchanged
//! from the base variant and are reused directly from [`crate::base`].

use bigint::{BigIntError, BigUint, Modulus};
use bloom::Element;
use elgamal::{Ciphertext, FieldParams};
use num_traits::{One, Zero};
use rand::RngCore;

use crate::base::Prepared;
use crate::errors::ProtocolError;
use crate::mutual_decrypt;
use crate::party::Party;

/// Runs one decrypt round per server element (combining that element's `k`
/// hash-position ciphertexts first), padded with dummy rounds up to `B`
/// total so every run produces the same amount of traffic.
///
/// Returns the decrypted combined value per element, in the same order as
/// `party.elements`. Empty for clients, who learn nothing.
pub async fn decrypt<R: RngCore>(
    party: &Party,
    prepared: &Prepared,
    rng: &mut R,
) -> Result<Vec<BigUint>, ProtocolError> {
    let bloom_size = party.bloom_size();

    if party.role.is_server() {
        let modulus = party.key_holder.params().modulus();
        let mut decrypted = Vec::with_capacity(party.elements.len());
        let mut cnt = 0usize;
        for &element in &party.elements {
            let combined = combine_positions(party, prepared, element, modulus)?;
            let blind = prepared.rerand_pool.get(cnt).ok_or(BigIntError::NonPositiveBound)?;
            let rerandomized = combined.rerandomize(blind, modulus);
            decrypted.push(mutual_decrypt::server_round(party, &rerandomized).await?);
            cnt += 1;
        }
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

/// Multiplies together the ring-accumulated ciphertexts at `element`'s `k`
/// hash positions, collapsing a membership test across all of its hash
/// functions into a single ciphertext.
fn combine_positions(
    party: &Party,
    prepared: &Prepared,
    element: Element,
    modulus: &Modulus,
) -> Result<Ciphertext, ProtocolError> {
    let positions = party.local_bloom.positions(element);
    let mut iter = positions.into_iter();
    let first = iter.next().ok_or(BigIntError::NonPositiveBound)?;
    let mut acc = prepared
        .encrypted_bases
        .get(first)
        .cloned()
        .ok_or(BigIntError::NonPositiveBound)?;
    for pos in iter {
        let next = prepared.encrypted_bases.get(pos).ok_or(BigIntError::NonPositiveBound)?;
        acc = acc.mul(next, modulus);
    }
    Ok(acc)
}

/// Precomputes, once per run, `cap = N - threshold + 1` inverses
/// `table[i] = vote_base^{-(q^(cap-1-i))} mod p`, the same table
/// `ExtractCountServer` peels one factor off of per hash function.
///
/// Combining an element's `k` hash-position ciphertexts does not collapse
/// them to a single power of the vote base when the underlying bit
/// positions were reached by a different number of parties (bloom filter
/// collisions, or a count below `threshold`), so unlike the base variant's
/// single `q`-th-power chain, extraction here has to strip one factor per
/// hash function rather than look the combined value straight up.
pub fn build_count_table(
    params: &FieldParams,
    vote_base: &BigUint,
    num_parties: u32,
    threshold: u32,
) -> Result<Vec<BigUint>, ProtocolError> {
    let cap = (num_parties - threshold + 1) as usize;
    let modulus = params.modulus();
    let mut table = vec![BigUint::zero(); cap];
    let mut temp = vote_base.clone();
    for i in (0..cap).rev() {
        table[i] = modulus.inv_mod(&temp).ok_or(BigIntError::NotInvertible)?;
        temp = modulus.pow_mod(&temp, params.q());
    }
    Ok(table)
}

/// Recovers each decrypted combined value's raw occurrence offset (added to
/// `threshold - 1` by [`find_intersection`]), by peeling one `q`-power
/// factor per hash function exactly as `ExtractCountServer` does: find how
/// many times the value must be raised to the `q`-th power to reach `1`,
/// multiply it by the matching entry of `table`, and repeat for the next
/// hash function.
///
/// A value that never collapses to `1` within `cap` steps — corrupted or
/// adversarial input, since every honestly-produced value's exponent is
/// bounded by the vote base's order `q^cap` — is treated as not in the
/// intersection rather than looping forever.
pub fn extract_counts(params: &FieldParams, table: &[BigUint], num_hash_functions: u32, decrypted: &[BigUint]) -> Vec<u32> {
    let cap = table.len() as u32;
    let modulus = params.modulus();
    decrypted.iter().map(|value| extract_count(params, modulus, table, cap, num_hash_functions, value)).collect()
}

fn extract_count(
    params: &FieldParams,
    modulus: &Modulus,
    table: &[BigUint],
    cap: u32,
    num_hash_functions: u32,
    value: &BigUint,
) -> u32 {
    let mut value = value.clone();
    let mut cnt = 0u32;
    for _ in 0..num_hash_functions {
        let mut temp = value.clone();
        cnt = 0;
        while temp != BigUint::one() && cnt < cap {
            temp = modulus.pow_mod(&temp, params.q());
            cnt += 1;
        }
        if cnt == 0 || temp != BigUint::one() {
            return 0;
        }
        value = modulus.mul_mod(&value, &table[(cnt - 1) as usize]);
    }
    cnt
}

/// Checks each server element's recovered count against the threshold
/// directly, without rebuilding a counting bloom filter: the enhanced
/// variant already has a one-to-one correspondence between elements and
/// decrypted values, so no re-hashing is needed.
pub fn find_intersection(party: &Party, counts: &[u32]) -> Vec<(u32, Element)> {
    if !party.role.is_server() {
        return Vec::new();
    }
    let threshold = party.threshold();
    party
        .elements
        .iter()
        .zip(counts.iter())
        .filter_map(|(&element, &cnt)| (cnt > 0).then_some((threshold - 1 + cnt, element)))
        .collect()
}

/// Attempts to halve a ciphertext's bit width by taking a modular square
/// root of both halves, recovered from the original's "hope it has a square
/// root" ciphertext refresh. Returns `ciphertext` unchanged if either half
/// is a quadratic non-residue: skipping the reduction for one ciphertext
/// costs bandwidth, not correctness, so this never fails.
pub fn ciphertext_sqrt(ciphertext: &Ciphertext, modulus: &Modulus) -> Ciphertext {
    match (modulus.sqrt(&ciphertext.c1), modulus.sqrt(&ciphertext.c2)) {
        (Some(c1), Some(c2)) => Ciphertext::new(c1, c2),
        _ => ciphertext.clone(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use num_traits::FromPrimitive;

    /// `p = 727`, `q = 11`, `power_q = 2` (the same instance
    /// `tests/ring_protocol.rs` uses), with `alpha = 5` a primitive root, so
    /// `vote_base = alpha^((p-1)/q^(N-t+1))` has order exactly `q^(N-t+1)`.
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
    fn extract_counts_recovers_exact_count_with_no_bloom_collisions() {
        let params = ring_sized_params();
        let modulus = params.modulus();
        let num_parties = 3;
        let threshold = 2;
        let num_hash_functions = 3;

        // (p - 1) / q^(num_parties - threshold + 1) = 726 / 121 = 6.
        let vote_base = modulus.pow_mod(&BigUint::from_u32(5).unwrap(), &BigUint::from_u32(6).unwrap());
        let table = build_count_table(&params, &vote_base, num_parties, threshold).unwrap();

        // an element with zero misses: k identical hash-position factors of
        // vote_base^(q^0), multiplied together by combine_positions.
        let present_everywhere = modulus.pow_mod(&vote_base, &BigUint::from_u32(num_hash_functions).unwrap());
        // an element missed by exactly one party: k factors of vote_base^(q^1).
        let missed_by_one = {
            let factor = modulus.pow_mod(&vote_base, params.q());
            modulus.pow_mod(&factor, &BigUint::from_u32(num_hash_functions).unwrap())
        };

        let decrypted = vec![present_everywhere, missed_by_one];
        let cnts = extract_counts(&params, &table, num_hash_functions, &decrypted);
        // find_intersection recovers the real count as threshold - 1 + cnt.
        assert_eq!(cnts.iter().map(|&cnt| threshold - 1 + cnt).collect::<Vec<_>>(), vec![3, 2]);
    }

    #[test]
    fn extract_counts_reports_zero_below_threshold() {
        let params = ring_sized_params();
        let modulus = params.modulus();
        let vote_base = modulus.pow_mod(&BigUint::from_u32(5).unwrap(), &BigUint::from_u32(6).unwrap());
        let table = build_count_table(&params, &vote_base, 3, 2).unwrap();

        // an element missed by every party but the server's own: the
        // combined value collapses all the way to the vote base's identity.
        assert_eq!(extract_counts(&params, &table, 3, &[BigUint::one()]), vec![0]);
    }

    #[test]
    fn ciphertext_sqrt_is_noop_on_non_residue() {
        let modulus = Modulus::new(BigUint::from_u32(23).unwrap());
        // 5 is a non-residue mod 23 (residues are 1,2,3,4,6,8,9,12,13,16,18).
        let ct = Ciphertext::new(BigUint::from_u32(5).unwrap(), BigUint::from_u32(7).unwrap());
        assert_eq!(ciphertext_sqrt(&ct, &modulus), ct);
    }
}
