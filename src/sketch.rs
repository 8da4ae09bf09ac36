//! Count-Min Sketch with 4-bit saturating counters and periodic aging.
//!
//! Provides an approximate frequency oracle for the admission policy. The
//! counter matrix is `depth × width`; each row has its own 64-bit seed so the
//! `depth` probes into a key's frequency are (with high probability)
//! independent. This mirrors the classic "4-bit CountMinSketch with periodic
//! aging" design used by frequency-sketch-based admission policies, except
//! counters here are stored one-byte-per-counter rather than packed into
//! 16-per-u64 words — either representation is a valid implementation of
//! the same counter semantics, and the unpacked form is far simpler to get
//! right without a bit-twiddling pass.

use std::hash::{BuildHasher, Hash, Hasher};

const COUNTER_MAX: u8 = 15;
const DEPTH: usize = 4;

/// Murmur3's 64-bit finalizer: two xor-shift/multiply rounds plus a final
/// xor-shift.
fn fmix64(mut h: u64) -> u64 {
    h ^= h >> 33;
    h = h.wrapping_mul(0xff51afd7ed558ccd);
    h ^= h >> 33;
    h = h.wrapping_mul(0xc4ceb9fe1a85ec53);
    h ^= h >> 33;
    h
}

/// Approximate frequency oracle: `depth × width` 4-bit saturating counters.
pub(crate) struct Sketch {
    width: usize,
    counters: Vec<u8>,
    seeds: [u64; DEPTH],
    size: u64,
    hash_builder: std::collections::hash_map::RandomState,
}

impl Sketch {
    /// `width = 4 * maximum_size` (minimum 1), `depth = 4`.
    pub(crate) fn new(maximum_size: usize) -> Self {
        let width = (maximum_size.saturating_mul(4)).max(1);
        let mut seeds = [0u64; DEPTH];
        for seed in &mut seeds {
            *seed = rand::random();
        }
        Sketch {
            width,
            counters: vec![0u8; width * DEPTH],
            seeds,
            size: 0,
            hash_builder: std::collections::hash_map::RandomState::new(),
        }
    }

    fn hash_of<K: Hash + ?Sized>(&self, key: &K) -> u64 {
        let mut hasher = self.hash_builder.build_hasher();
        key.hash(&mut hasher);
        hasher.finish()
    }

    fn index_of(&self, key_hash: u64, row: usize) -> usize {
        let mixed = fmix64(key_hash ^ self.seeds[row]);
        (mixed % self.width as u64) as usize
    }

    /// Increments each of the `depth` selected counters unless already
    /// saturated at 15, then increments `size` unconditionally.
    pub(crate) fn increment<K: Hash + ?Sized>(&mut self, key: &K) {
        let h = self.hash_of(key);
        for row in 0..DEPTH {
            let idx = row * self.width + self.index_of(h, row);
            if self.counters[idx] < COUNTER_MAX {
                self.counters[idx] += 1;
            }
        }
        self.size += 1;
    }

    /// Returns the minimum of the `depth` selected counters, in `[0, 15]`.
    pub(crate) fn estimate<K: Hash + ?Sized>(&self, key: &K) -> u8 {
        let h = self.hash_of(key);
        (0..DEPTH)
            .map(|row| self.counters[row * self.width + self.index_of(h, row)])
            .min()
            .unwrap_or(0)
    }

    /// Halves every counter (logical right shift by one) and halves `size`.
    pub(crate) fn reset(&mut self) {
        for c in &mut self.counters {
            *c >>= 1;
        }
        self.size /= 2;
    }

    pub(crate) fn should_reset(&self, threshold: u64) -> bool {
        self.size >= threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn estimate_is_zero_for_unseen_key() {
        let sketch = Sketch::new(64);
        assert_eq!(sketch.estimate("absent"), 0);
    }

    #[test]
    fn increment_raises_estimate_monotonically() {
        let mut sketch = Sketch::new(64);
        let mut last = sketch.estimate("k");
        for _ in 0..20 {
            sketch.increment("k");
            let next = sketch.estimate("k");
            assert!(next >= last);
            last = next;
        }
    }

    #[test]
    fn counters_saturate_at_fifteen() {
        let mut sketch = Sketch::new(64);
        for _ in 0..100 {
            sketch.increment("k");
        }
        assert_eq!(sketch.estimate("k"), 15);
    }

    #[test]
    fn reset_never_increases_any_estimate() {
        let mut sketch = Sketch::new(64);
        let keys = ["a", "b", "c", "d"];
        for (i, k) in keys.iter().enumerate() {
            for _ in 0..(i + 1) {
                sketch.increment(k);
            }
        }
        let before: Vec<u8> = keys.iter().map(|k| sketch.estimate(k)).collect();
        sketch.reset();
        let after: Vec<u8> = keys.iter().map(|k| sketch.estimate(k)).collect();
        for (b, a) in before.iter().zip(after.iter()) {
            assert!(a <= b);
        }
    }

    #[test]
    fn should_reset_honors_threshold() {
        let mut sketch = Sketch::new(4);
        assert!(!sketch.should_reset(10));
        for i in 0..10 {
            sketch.increment(&i);
        }
        assert!(sketch.should_reset(10));
    }

    #[test]
    fn distinct_keys_do_not_collide_on_a_small_sample() {
        let mut sketch = Sketch::new(512);
        sketch.increment("x");
        sketch.increment("y");
        sketch.increment("y");
        assert!(sketch.estimate("y") >= sketch.estimate("x"));
    }
}
