//! Fuzz harness for Red-Black insertion sequences
//!
//! This harness drives arbitrary key sequences through the Red-Black engine
//! and checks the color rules, replay coherence, and layout after every step.
//! Target: `dendro_redblack` insertion and fixup path

#![no_main]

use dendro_layout::BinaryLayoutConfig;
use dendro_oplog::replay_prefix;
use dendro_redblack::RedBlackTree;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Read the input as a key sequence, eight bytes per key
    let keys: Vec<i64> = data
        .chunks_exact(8)
        .map(|chunk| i64::from_le_bytes([
            chunk[0], chunk[1], chunk[2], chunk[3], chunk[4], chunk[5], chunk[6], chunk[7],
        ]))
        .collect();

    let mut tree = RedBlackTree::new();
    for &key in &keys {
        tree.insert(key);
        assert!(tree.root_is_black());
        assert!(tree.no_red_red());
        assert!(tree.black_height().is_some());
        assert!(tree.parent_links_consistent());
    }

    // In-order must be the sorted multiset of inserted keys
    let mut expected = keys.clone();
    expected.sort_unstable();
    assert_eq!(tree.in_order_keys(), expected);

    // Full replay must land on the same tree
    let replayed = replay_prefix(&tree, tree.operations().len());
    assert_eq!(tree.all_nodes(), replayed.all_nodes());

    // Layout must not panic on any shape
    tree.calculate_coordinates(&BinaryLayoutConfig::red_black());
});
