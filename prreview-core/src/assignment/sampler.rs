//! Shared random source for reviewer selection

use std::sync::{Mutex, MutexGuard, PoisonError};

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// Mutex-guarded generator shared by all callers of one engine.
///
/// The lock is held only for the draw itself and never across an `.await`.
#[derive(Debug)]
pub struct Sampler {
    rng: Mutex<StdRng>,
}

impl Sampler {
    /// Create a sampler seeded from the operating system
    pub fn from_entropy() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Create a deterministic sampler
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    /// Pick up to `count` distinct items uniformly at random.
    ///
    /// Shuffles a copy of the whole slice and keeps the head, so every
    /// subset and every ordering of it is equally likely. Returns fewer
    /// than `count` items when the slice is shorter.
    pub fn choose_up_to<T: Clone>(&self, candidates: &[T], count: usize) -> Vec<T> {
        let mut shuffled = candidates.to_vec();
        shuffled.shuffle(&mut *self.lock());
        shuffled.truncate(count);
        shuffled
    }

    /// Pick one index in `0..len`, or `None` when `len` is zero
    pub fn pick_index(&self, len: usize) -> Option<usize> {
        if len == 0 {
            return None;
        }
        Some(self.lock().gen_range(0..len))
    }

    fn lock(&self) -> MutexGuard<'_, StdRng> {
        // The generator holds no invariant a panicking holder could break
        self.rng.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for Sampler {
    fn default() -> Self {
        Self::from_entropy()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{HashMap, HashSet};

    #[test]
    fn test_choose_up_to_short_input() {
        let sampler = Sampler::seeded(7);
        assert!(sampler.choose_up_to::<u32>(&[], 2).is_empty());
        assert_eq!(sampler.choose_up_to(&["bob"], 2), vec!["bob"]);
    }

    #[test]
    fn test_choose_up_to_distinct() {
        let sampler = Sampler::seeded(7);
        let picked = sampler.choose_up_to(&["a", "b", "c", "d", "e"], 2);
        assert_eq!(picked.len(), 2);
        assert_ne!(picked[0], picked[1]);
    }

    #[test]
    fn test_seeded_is_deterministic() {
        let items: Vec<u32> = (0..20).collect();
        let a = Sampler::seeded(42).choose_up_to(&items, 2);
        let b = Sampler::seeded(42).choose_up_to(&items, 2);
        assert_eq!(a, b);
    }

    #[test]
    fn test_pick_index_bounds() {
        let sampler = Sampler::seeded(1);
        assert_eq!(sampler.pick_index(0), None);
        for _ in 0..100 {
            let idx = sampler.pick_index(3).unwrap();
            assert!(idx < 3);
        }
    }

    #[test]
    fn test_pairs_are_uniform() {
        // 3 candidates give 3 unordered pairs, each expected 1/3 of the time
        let sampler = Sampler::seeded(2024);
        let trials = 6000;
        let mut counts: HashMap<Vec<&str>, usize> = HashMap::new();
        for _ in 0..trials {
            let mut pair = sampler.choose_up_to(&["bob", "carol", "dave"], 2);
            pair.sort();
            *counts.entry(pair).or_default() += 1;
        }
        assert_eq!(counts.len(), 3);
        for count in counts.values() {
            let freq = *count as f64 / trials as f64;
            assert!((freq - 1.0 / 3.0).abs() < 0.04, "pair frequency {}", freq);
        }
    }

    #[test]
    fn test_pick_index_covers_all() {
        let sampler = Sampler::seeded(99);
        let seen: HashSet<usize> = (0..200).filter_map(|_| sampler.pick_index(4)).collect();
        assert_eq!(seen.len(), 4);
    }
}
