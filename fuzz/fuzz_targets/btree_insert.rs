//! Fuzz harness for B-Tree insertion sequences
//!
//! This harness drives arbitrary key sequences through the B-Tree engine at
//! a fuzzer-chosen order and checks the shape rules, replay coherence, and
//! layout after every step.
//! Target: `dendro_btree` insertion and split path

#![no_main]

use dendro_btree::BTree;
use dendro_layout::MultiwayLayoutConfig;
use dendro_oplog::replay_prefix;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // First byte picks the order, the rest is a key sequence
    let Some((&order_byte, rest)) = data.split_first() else {
        return;
    };
    let order = 3 + usize::from(order_byte % 6);

    let keys: Vec<i64> = rest
        .chunks_exact(8)
        .map(|chunk| i64::from_le_bytes([
            chunk[0], chunk[1], chunk[2], chunk[3], chunk[4], chunk[5], chunk[6], chunk[7],
        ]))
        .collect();

    let Ok(mut tree) = BTree::new(order) else {
        return;
    };
    for &key in &keys {
        tree.insert(key);
        assert!(tree.leaves_at_uniform_depth());
        assert!(tree.fanout_consistent());
        assert!(tree.within_key_bound());
    }

    // In-order must be the sorted multiset of inserted keys
    let mut expected = keys.clone();
    expected.sort_unstable();
    assert_eq!(tree.in_order_keys(), expected);
    assert_eq!(tree.len(), keys.len());

    // Full replay must land on the same tree at the same order
    let replayed = replay_prefix(&tree, tree.operations().len());
    assert_eq!(replayed.order(), order);
    assert_eq!(tree.root(), replayed.root());

    // Layout must not panic on any shape
    tree.calculate_coordinates(&MultiwayLayoutConfig::default());
});
