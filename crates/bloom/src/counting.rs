//! The counting bloom filter used to materialize the final per-element
//! occurrence count after the ring-pass/decryption rounds extract a count per
//! bit position.

use crate::{hash_positions, Element};

/// A counting bloom filter: each hashed position holds a saturating counter
/// rather than a single bit, so `check_element` returns the minimum counter
/// across an element's hash positions instead of a boolean AND.
#[derive(Clone, Debug)]
pub struct CountingBloomFilter {
    counters: Vec<u32>,
    seeds: Vec<u32>,
}

impl CountingBloomFilter {
    /// Builds an all-zero counting filter of `size` cells using `seeds`.
    pub fn new(size: usize, seeds: Vec<u32>) -> Self {
        Self {
            counters: vec![0; size],
            seeds,
        }
    }

    /// The number of cells in the filter.
    pub fn size(&self) -> usize {
        self.counters.len()
    }

    /// Increments every hashed position for `element` by one.
    pub fn insert(&mut self, element: Element) {
        for pos in hash_positions(element, &self.seeds, self.counters.len()).collect::<Vec<_>>() {
            if let Some(counter) = self.counters.get_mut(pos) {
                *counter = counter.saturating_add(1);
            }
        }
    }

    /// Decrements every hashed position for `element` by one, saturating at
    /// zero.
    pub fn remove(&mut self, element: Element) {
        for pos in hash_positions(element, &self.seeds, self.counters.len()).collect::<Vec<_>>() {
            if let Some(counter) = self.counters.get_mut(pos) {
                *counter = counter.saturating_sub(1);
            }
        }
    }

    /// Writes a counter value directly by position, bypassing hashing. Used to
    /// materialize the per-position counts the decryption rounds extract.
    pub fn set(&mut self, position: usize, value: u32) {
        if let Some(counter) = self.counters.get_mut(position) {
            *counter = value;
        }
    }

    /// Reads a counter directly by position.
    pub fn get(&self, position: usize) -> u32 {
        self.counters.get(position).copied().unwrap_or(0)
    }

    /// The minimum counter across `element`'s hash positions: an upper bound
    /// on how many times it was inserted, the same way a plain bloom filter's
    /// AND is an upper bound on membership.
    pub fn check_element(&self, element: Element) -> u32 {
        hash_positions(element, &self.seeds, self.counters.len())
            .map(|pos| self.get(pos))
            .min()
            .unwrap_or(0)
    }
}
