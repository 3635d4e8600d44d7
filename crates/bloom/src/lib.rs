//! Inverted bloom filters and counting bloom filters for OT-MPSI voting.

#![deny(missing_docs)]
#![forbid(unsafe_code)]
#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::iterator_step_by_zero,
    clippy::invalid_regex,
    clippy::string_slice,
    clippy::unimplemented,
    clippy::todo
)]

mod counting;
mod filter;
mod murmur3;

pub use counting::CountingBloomFilter;
pub use filter::BloomFilter;

/// The element type the filters hash: `ElementType = uint32` in the original.
pub type Element = u32;

fn hash_positions(element: Element, seeds: &[u32], size: usize) -> impl Iterator<Item = usize> + '_ {
    let bytes = element.to_le_bytes();
    seeds.iter().map(move |&seed| {
        let hash = murmur3::murmur3_x86_128(&bytes, seed);
        // the original indexes with `hash[0]` where `hash` is `uint64[2]`:
        // the digest's first 64-bit half, words [0] and [1] here.
        let first_half = (hash[0] as u64) | ((hash[1] as u64) << 32);
        (first_half % size as u64) as usize
    })
}
