//! The membership-test (non-counting) bloom filter used for each party's local
//! set and, inverted, as the vote mask for the ring pass.

use bitvec::prelude::{BitVec, Lsb0};

use crate::{hash_positions, Element};

/// A standard k-hash bloom filter, plus the `Invert` operation OT-MPSI's
/// voting scheme relies on: after every local element is inserted, the whole
/// bit array is flipped once so that a set bit means "this position was never
/// written", i.e. "definitely missed locally".
#[derive(Clone, Debug)]
pub struct BloomFilter {
    bits: BitVec<usize, Lsb0>,
    seeds: Vec<u32>,
}

impl BloomFilter {
    /// Builds an all-zero filter of `size` bits using `seeds` (one per hash
    /// function).
    pub fn new(size: usize, seeds: Vec<u32>) -> Self {
        Self {
            bits: BitVec::repeat(false, size),
            seeds,
        }
    }

    /// The number of bit positions in the filter.
    pub fn size(&self) -> usize {
        self.bits.len()
    }

    /// The number of hash functions in use.
    pub fn num_hash_functions(&self) -> usize {
        self.seeds.len()
    }

    /// The hash seeds this filter was built with, so a counting filter over
    /// the same elements can be built with matching positions.
    pub fn seeds(&self) -> &[u32] {
        &self.seeds
    }

    /// Sets every hashed bit position for `element`.
    pub fn insert(&mut self, element: Element) {
        for pos in hash_positions(element, &self.seeds, self.bits.len()).collect::<Vec<_>>() {
            self.bits.set(pos, true);
        }
    }

    /// True if every hashed bit position for `element` is set.
    pub fn check_element(&self, element: Element) -> bool {
        hash_positions(element, &self.seeds, self.bits.len()).all(|pos| self.bit_at(pos))
    }

    /// Reads a single bit directly by position, bypassing hashing.
    pub fn check_position(&self, position: usize) -> bool {
        self.bit_at(position)
    }

    /// The hashed bit positions for `element`, in hash-function order. Used
    /// to combine per-position ciphertexts for one element without going
    /// through `check_element`'s boolean collapse.
    pub fn positions(&self, element: Element) -> Vec<usize> {
        hash_positions(element, &self.seeds, self.bits.len()).collect()
    }

    /// Flips every bit in the filter. Called once, after local insertion is
    /// complete, to turn "has this element" into "definitely missed this
    /// position" for the voting ring pass.
    pub fn invert(&mut self) {
        for mut bit in self.bits.iter_mut() {
            *bit = !*bit;
        }
    }

    /// Resets every bit to zero.
    pub fn clear(&mut self) {
        self.bits.fill(false);
    }

    fn bit_at(&self, position: usize) -> bool {
        self.bits.get(position).map(|bit| *bit).unwrap_or(false)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn seeds() -> Vec<u32> {
        vec![11, 29, 47]
    }

    #[test]
    fn inserted_element_checks_positive() {
        let mut bf = BloomFilter::new(1024, seeds());
        bf.insert(42);
        assert!(bf.check_element(42));
    }

    #[test]
    fn unrelated_element_usually_checks_negative() {
        let mut bf = BloomFilter::new(1024, seeds());
        bf.insert(42);
        let false_positives = (0..200u32)
            .filter(|&e| e != 42 && bf.check_element(e))
            .count();
        assert!(false_positives < 50, "unexpectedly high false positive rate");
    }

    #[test]
    fn invert_flips_every_bit() {
        let mut bf = BloomFilter::new(8, seeds());
        bf.insert(1);
        let before: Vec<bool> = (0..8).map(|i| bf.check_position(i)).collect();
        bf.invert();
        let after: Vec<bool> = (0..8).map(|i| bf.check_position(i)).collect();
        for i in 0..8 {
            assert_eq!(before[i], !after[i]);
        }
    }

    #[test]
    fn clear_resets_all_bits() {
        let mut bf = BloomFilter::new(64, seeds());
        bf.insert(7);
        bf.clear();
        for i in 0..64 {
            assert!(!bf.check_position(i));
        }
    }
}
