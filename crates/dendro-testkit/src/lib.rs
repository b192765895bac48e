//! Fixture key sequences and proptest strategies shared by dendro tests.
//!
//! Keeping these in a microcrate avoids copy-paste across the engine
//! suites: every engine wants the same torture sequences and the same
//! random-key strategies.

pub mod strategies;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// `[1, 2, ..., n]`. Leans every binary tree hard to the right.
pub fn ascending_keys(n: usize) -> Vec<i64> {
    (1..=n as i64).collect()
}

/// `[n, n-1, ..., 1]`. The mirror torture sequence.
pub fn descending_keys(n: usize) -> Vec<i64> {
    (1..=n as i64).rev().collect()
}

/// Alternating low/high: `[1, n, 2, n-1, ...]`.
///
/// Exercises the inner-grandchild rebalance cases that plain runs never
/// reach.
pub fn zigzag_keys(n: usize) -> Vec<i64> {
    let mut low = 1i64;
    let mut high = n as i64;
    let mut out = Vec::with_capacity(n);
    while low < high {
        out.push(low);
        out.push(high);
        low += 1;
        high -= 1;
    }
    if low == high {
        out.push(low);
    }
    out
}

/// Deterministic shuffle of `0..n`. Same seed, same order, any machine.
pub fn shuffled_keys(n: usize, seed: u64) -> Vec<i64> {
    let mut keys: Vec<i64> = (0..n as i64).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    keys.shuffle(&mut rng);
    keys
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascending_is_sorted() {
        assert_eq!(ascending_keys(4), vec![1, 2, 3, 4]);
    }

    #[test]
    fn descending_is_reversed() {
        assert_eq!(descending_keys(4), vec![4, 3, 2, 1]);
    }

    #[test]
    fn zigzag_covers_every_key_once() {
        assert_eq!(zigzag_keys(6), vec![1, 6, 2, 5, 3, 4]);
        assert_eq!(zigzag_keys(5), vec![1, 5, 2, 4, 3]);
        assert_eq!(zigzag_keys(0), Vec::<i64>::new());

        let mut sorted = zigzag_keys(31);
        sorted.sort_unstable();
        assert_eq!(sorted, ascending_keys(31));
    }

    #[test]
    fn shuffled_is_a_permutation() {
        let mut sorted = shuffled_keys(100, 7);
        sorted.sort_unstable();
        assert_eq!(sorted, (0..100).collect::<Vec<i64>>());
    }

    #[test]
    fn shuffle_is_seed_stable() {
        assert_eq!(shuffled_keys(50, 7), shuffled_keys(50, 7));
        assert_ne!(shuffled_keys(50, 7), shuffled_keys(50, 8));
    }
}
