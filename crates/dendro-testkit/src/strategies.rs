//! Proptest strategies for dendro property-based testing
//!
//! This module provides reusable strategies for generating key sequences
//! across all dendro engine crates.

use proptest::prelude::*;
use std::collections::HashSet;

/// Strategy for generating key sequences, duplicates allowed
pub fn strategy_keys() -> impl Strategy<Value = Vec<i64>> {
    proptest::collection::vec(-1000i64..1000, 0..64)
}

/// Strategy for generating sequences of distinct keys in random order
pub fn strategy_unique_keys() -> impl Strategy<Value = Vec<i64>> {
    proptest::collection::vec(-1000i64..1000, 0..64).prop_map(|mut keys| {
        let mut seen = HashSet::new();
        keys.retain(|key| seen.insert(*key));
        keys
    })
}

/// Strategy for generating non-empty distinct key sequences
pub fn strategy_unique_keys_nonempty() -> impl Strategy<Value = Vec<i64>> {
    strategy_unique_keys().prop_filter("at least one key", |keys| !keys.is_empty())
}

/// Strategy for generating a B-Tree order
pub fn strategy_order() -> impl Strategy<Value = usize> {
    3usize..8
}

/// Strategy for generating a replay step bound, intentionally allowed to
/// overshoot the log length
pub fn strategy_step() -> impl Strategy<Value = usize> {
    0usize..600
}
