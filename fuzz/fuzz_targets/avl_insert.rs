//! Fuzz harness for AVL insertion sequences
//!
//! This harness drives arbitrary key sequences through the AVL engine and
//! checks the balance rules, replay coherence, and layout after every step.
//! Target: `dendro_avl` insertion and rebalance path

#![no_main]

use dendro_avl::AvlTree;
use dendro_layout::BinaryLayoutConfig;
use dendro_oplog::{OpKind, replay_prefix};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Read the input as a key sequence, eight bytes per key
    let keys: Vec<i64> = data
        .chunks_exact(8)
        .map(|chunk| i64::from_le_bytes([
            chunk[0], chunk[1], chunk[2], chunk[3], chunk[4], chunk[5], chunk[6], chunk[7],
        ]))
        .collect();

    let mut tree = AvlTree::new();
    for &key in &keys {
        tree.insert(key);
        assert!(tree.is_balanced());
        assert!(tree.heights_consistent());
    }

    // In-order must be the sorted key set (duplicates are no-ops)
    let in_order = tree.in_order_keys();
    assert!(in_order.windows(2).all(|pair| pair[0] < pair[1]));

    // One anchor per insert call
    let anchors = tree
        .operations()
        .iter()
        .filter(|r| r.kind.is_insert_start())
        .count();
    assert_eq!(anchors, keys.len());

    // Full replay must land on the same tree
    let replayed = replay_prefix(&tree, tree.operations().len());
    assert_eq!(tree.root(), replayed.root());

    // Layout must not panic on any shape
    tree.calculate_coordinates(&BinaryLayoutConfig::avl());
});
