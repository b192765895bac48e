//! Property tests for dendro-layout
//!
//! This module contains property-based tests for placement invariants.

use dendro_layout::{
    BinaryLayoutConfig, BinaryNodeView, BinaryTreeView, MultiwayLayoutConfig, MultiwayNodeView,
    MultiwayTreeView, Point, binary_coordinates, multiway_coordinates, resolve_overlaps,
};
use proptest::prelude::*;

/// Plain BST shape builder: gives the layout a realistic binary view
/// without dragging an engine crate into the dependency graph.
#[derive(Default)]
struct ShapeBuilder {
    nodes: Vec<BinaryNodeView>,
    keys: Vec<i64>,
    root: Option<usize>,
}

impl ShapeBuilder {
    fn insert(&mut self, key: i64) {
        let Some(mut current) = self.root else {
            self.push_leaf(key);
            self.root = Some(0);
            return;
        };
        loop {
            if key == self.keys[current] {
                return;
            }
            let slot = if key < self.keys[current] {
                self.nodes[current].left
            } else {
                self.nodes[current].right
            };
            match slot {
                Some(next) => current = next,
                None => {
                    let index = self.push_leaf(key);
                    if key < self.keys[current] {
                        self.nodes[current].left = Some(index);
                    } else {
                        self.nodes[current].right = Some(index);
                    }
                    return;
                }
            }
        }
    }

    fn push_leaf(&mut self, key: i64) -> usize {
        self.nodes.push(BinaryNodeView::default());
        self.keys.push(key);
        self.nodes.len() - 1
    }

    fn view(&self) -> BinaryTreeView {
        BinaryTreeView {
            nodes: self.nodes.clone(),
            root: self.root,
        }
    }
}

fn binary_view(keys: &[i64]) -> BinaryTreeView {
    let mut builder = ShapeBuilder::default();
    for &key in keys {
        builder.insert(key);
    }
    builder.view()
}

/// Depth of every node, by walking from the root.
fn binary_depths(view: &BinaryTreeView) -> Vec<u32> {
    let mut depths = vec![0u32; view.nodes.len()];
    fn walk(view: &BinaryTreeView, index: usize, depth: u32, depths: &mut [u32]) {
        depths[index] = depth;
        if let Some(left) = view.nodes[index].left {
            walk(view, left, depth + 1, depths);
        }
        if let Some(right) = view.nodes[index].right {
            walk(view, right, depth + 1, depths);
        }
    }
    if let Some(root) = view.root {
        walk(view, root, 0, &mut depths);
    }
    depths
}

/// Two-level multiway view: a root over `leaf_keys.len()` leaves.
fn multiway_view(root_keys: usize, leaf_keys: &[usize]) -> MultiwayTreeView {
    if leaf_keys.is_empty() {
        return MultiwayTreeView {
            nodes: vec![MultiwayNodeView {
                children: vec![],
                key_count: root_keys,
            }],
            root: Some(0),
        };
    }
    let mut nodes = vec![MultiwayNodeView {
        children: (1..=leaf_keys.len()).collect(),
        key_count: root_keys,
    }];
    for &count in leaf_keys {
        nodes.push(MultiwayNodeView {
            children: vec![],
            key_count: count,
        });
    }
    MultiwayTreeView {
        nodes,
        root: Some(0),
    }
}

/// Sorted (y, x) pairs, for level-gap checks.
fn level_sorted(points: &[Point]) -> Vec<(f64, f64)> {
    let mut pairs: Vec<(f64, f64)> = points.iter().map(|p| (p.y, p.x)).collect();
    pairs.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.total_cmp(&b.1)));
    pairs
}

fn assert_level_gaps(points: &[Point], min_distance: f64) -> Result<(), TestCaseError> {
    let pairs = level_sorted(points);
    for window in pairs.windows(2) {
        if window[0].0 == window[1].0 {
            prop_assert!(
                window[1].1 - window[0].1 >= min_distance - 1e-9,
                "nodes at y {} are {} apart",
                window[0].0,
                window[1].1 - window[0].1
            );
        }
    }
    Ok(())
}

// ============================================================================
// Binary Layout Property Tests
// ============================================================================

proptest! {
    /// One point per node, always
    #[test]
    fn prop_binary_point_per_node(keys in proptest::collection::vec(-500i64..500, 0..50)) {
        let view = binary_view(&keys);
        let points = binary_coordinates(&view, &BinaryLayoutConfig::avl());
        prop_assert_eq!(points.len(), view.nodes.len());
    }

    /// y is a pure function of depth
    #[test]
    fn prop_binary_y_tracks_depth(keys in proptest::collection::vec(-500i64..500, 1..50)) {
        let view = binary_view(&keys);
        let config = BinaryLayoutConfig::avl();
        let points = binary_coordinates(&view, &config);
        let depths = binary_depths(&view);
        for (point, depth) in points.iter().zip(depths) {
            let expected = f64::from(depth) * config.vertical_spacing + config.top_margin;
            prop_assert_eq!(point.y, expected);
        }
    }

    /// No two nodes on a level closer than the configured minimum
    #[test]
    fn prop_binary_levels_keep_min_distance(keys in proptest::collection::vec(-500i64..500, 0..60)) {
        let view = binary_view(&keys);
        let config = BinaryLayoutConfig::red_black();
        let points = binary_coordinates(&view, &config);
        assert_level_gaps(&points, config.min_sibling_distance)?;
    }

    /// Same shape, same config, same points
    #[test]
    fn prop_binary_deterministic(keys in proptest::collection::vec(-500i64..500, 0..40)) {
        let view = binary_view(&keys);
        let config = BinaryLayoutConfig::avl();
        prop_assert_eq!(
            binary_coordinates(&view, &config),
            binary_coordinates(&view, &config)
        );
    }
}

// ============================================================================
// Multiway Layout Property Tests
// ============================================================================

proptest! {
    /// One point per node, always
    #[test]
    fn prop_multiway_point_per_node(
        root_keys in 1usize..4,
        leaves in proptest::collection::vec(1usize..5, 0..8),
    ) {
        let view = multiway_view(root_keys, &leaves);
        let points = multiway_coordinates(&view, &MultiwayLayoutConfig::default());
        prop_assert_eq!(points.len(), view.nodes.len());
    }

    /// Leaves share one level below the root, at the configured spacing
    #[test]
    fn prop_multiway_y_tracks_depth(
        root_keys in 1usize..4,
        leaves in proptest::collection::vec(1usize..5, 1..8),
    ) {
        let view = multiway_view(root_keys, &leaves);
        let config = MultiwayLayoutConfig::default();
        let points = multiway_coordinates(&view, &config);
        prop_assert_eq!(points[0].y, config.top_margin);
        for point in &points[1..] {
            prop_assert_eq!(point.y, config.vertical_spacing + config.top_margin);
        }
    }

    /// No two nodes on a level closer than the configured minimum
    #[test]
    fn prop_multiway_levels_keep_min_distance(
        root_keys in 1usize..4,
        leaves in proptest::collection::vec(1usize..5, 0..8),
    ) {
        let view = multiway_view(root_keys, &leaves);
        let config = MultiwayLayoutConfig::default();
        let points = multiway_coordinates(&view, &config);
        assert_level_gaps(&points, config.min_sibling_distance)?;
    }

    /// Every level's span midpoint lands on center_x
    #[test]
    fn prop_multiway_levels_centered(
        root_keys in 1usize..4,
        leaves in proptest::collection::vec(1usize..5, 1..8),
    ) {
        let view = multiway_view(root_keys, &leaves);
        let config = MultiwayLayoutConfig::default();
        let points = multiway_coordinates(&view, &config);

        let leaf_min = points[1..].iter().map(|p| p.x).fold(f64::INFINITY, f64::min);
        let leaf_max = points[1..].iter().map(|p| p.x).fold(f64::NEG_INFINITY, f64::max);
        prop_assert!(((leaf_min + leaf_max) / 2.0 - config.center_x).abs() < 1e-9);
        prop_assert!((points[0].x - config.center_x).abs() < 1e-9);
    }
}

// ============================================================================
// Overlap Pass Property Tests
// ============================================================================

proptest! {
    /// The pass establishes the gap on arbitrary single-level input
    #[test]
    fn prop_overlap_pass_establishes_gap(xs in proptest::collection::vec(-500.0f64..500.0, 0..40)) {
        let mut points: Vec<Point> = xs.iter().map(|&x| Point { x, y: 40.0 }).collect();
        resolve_overlaps(&mut points, 40.0);
        assert_level_gaps(&points, 40.0)?;
    }

    /// The pass never moves anything left
    #[test]
    fn prop_overlap_pass_moves_right_only(xs in proptest::collection::vec(-500.0f64..500.0, 0..40)) {
        let mut points: Vec<Point> = xs.iter().map(|&x| Point { x, y: 40.0 }).collect();
        let before = points.clone();
        resolve_overlaps(&mut points, 40.0);
        for (after, before) in points.iter().zip(&before) {
            prop_assert!(after.x >= before.x);
        }
    }

    /// Already-spaced input is untouched
    #[test]
    fn prop_overlap_pass_idempotent(xs in proptest::collection::vec(-500.0f64..500.0, 0..40)) {
        let mut points: Vec<Point> = xs.iter().map(|&x| Point { x, y: 40.0 }).collect();
        resolve_overlaps(&mut points, 40.0);
        let once = points.clone();
        resolve_overlaps(&mut points, 40.0);
        prop_assert_eq!(points, once);
    }
}
