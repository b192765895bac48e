//! 2-D node placement for dendro tree engines.
//!
//! Pure geometry. Engines hand in a lightweight index-based view of their
//! current shape and get back one point per node, in the same order. Two
//! variants cover the workspace:
//!
//! - binary offset heuristic (AVL, Red-Black): pre-order descent where a
//!   child sits at a horizontal offset from its parent that shrinks
//!   geometrically with depth, dampened as the tree grows;
//! - multiway cursor walk (B-Tree): post-order, leaves placed left to
//!   right with key-proportional widths, parents centered over their
//!   children, every level re-centered around a fixed origin.
//!
//! Layout never fails. Degenerate shapes produce degenerate but valid
//! coordinates, and a shared overlap pass enforces a minimum horizontal
//! gap between nodes sharing a level.

use serde::{Deserialize, Serialize};

/// One node's position, in render-space pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// One parent-to-child edge, borrowed from an engine's tree.
///
/// Engines yield each edge exactly once; renderers draw a line from
/// `source` to `target` using the nodes' laid-out positions.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Edge<'a, N> {
    pub source: &'a N,
    pub target: &'a N,
}

/// Binary tree shape, decoupled from any engine's node type.
///
/// Indices point into `nodes` and must describe a tree; the walk trusts
/// them. Order is the engine's choice and is preserved in the output.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BinaryTreeView {
    pub nodes: Vec<BinaryNodeView>,
    pub root: Option<usize>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BinaryNodeView {
    pub left: Option<usize>,
    pub right: Option<usize>,
}

/// Multiway tree shape. `key_count` drives node widths and sibling gaps.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiwayTreeView {
    pub nodes: Vec<MultiwayNodeView>,
    pub root: Option<usize>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiwayNodeView {
    pub children: Vec<usize>,
    pub key_count: usize,
}

/// Placement knobs for the binary offset heuristic.
///
/// A node lands at `x = position * horizontal_spacing + horizontal_origin`
/// and `y = depth * vertical_spacing + top_margin`. Children recurse with
/// `position ± 2^max(0, spread_falloff - depth) / scale`, where `scale`
/// is `clamp(log2(total_nodes + 1), 1, 3)`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BinaryLayoutConfig {
    pub start_depth: u32,
    pub start_position: f64,
    pub horizontal_spacing: f64,
    pub vertical_spacing: f64,
    pub horizontal_origin: f64,
    pub top_margin: f64,
    /// Exponent cap in the child offset. Larger means a wider crown.
    pub spread_falloff: u32,
    pub min_sibling_distance: f64,
}

impl BinaryLayoutConfig {
    /// AVL defaults: 60 px grid, trunk at x = 300.
    pub fn avl() -> Self {
        Self {
            start_depth: 0,
            start_position: 0.0,
            horizontal_spacing: 60.0,
            vertical_spacing: 60.0,
            horizontal_origin: 300.0,
            top_margin: 40.0,
            spread_falloff: 2,
            min_sibling_distance: 40.0,
        }
    }

    /// Red-Black defaults: wider 80 px grid, trunk at x = 400.
    pub fn red_black() -> Self {
        Self {
            start_depth: 0,
            start_position: 0.0,
            horizontal_spacing: 80.0,
            vertical_spacing: 80.0,
            horizontal_origin: 400.0,
            top_margin: 40.0,
            spread_falloff: 3,
            min_sibling_distance: 40.0,
        }
    }
}

/// Placement knobs for the multiway cursor walk.
///
/// A leaf occupies `max(key_count * key_width, min_node_width)` px plus
/// `node_padding`; between sibling subtrees the cursor skips
/// `max(min_sibling_gap, previous_key_count * sibling_key_gap)` px.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MultiwayLayoutConfig {
    pub start_depth: u32,
    pub start_x: f64,
    pub vertical_spacing: f64,
    pub top_margin: f64,
    pub center_x: f64,
    pub key_width: f64,
    pub min_node_width: f64,
    pub node_padding: f64,
    pub min_sibling_gap: f64,
    pub sibling_key_gap: f64,
    pub min_sibling_distance: f64,
}

impl Default for MultiwayLayoutConfig {
    /// B-Tree defaults: 70 px levels, everything centered on x = 400.
    fn default() -> Self {
        Self {
            start_depth: 0,
            start_x: 400.0,
            vertical_spacing: 70.0,
            top_margin: 40.0,
            center_x: 400.0,
            key_width: 20.0,
            min_node_width: 30.0,
            node_padding: 10.0,
            min_sibling_gap: 30.0,
            sibling_key_gap: 15.0,
            min_sibling_distance: 40.0,
        }
    }
}

/// Place a binary tree. Returns one point per view node, view order.
pub fn binary_coordinates(view: &BinaryTreeView, config: &BinaryLayoutConfig) -> Vec<Point> {
    let mut points = vec![Point::default(); view.nodes.len()];
    let Some(root) = view.root else {
        return points;
    };
    let scale = spread_scale(view.nodes.len());
    place_binary(
        view,
        config,
        scale,
        root,
        config.start_depth,
        config.start_position,
        &mut points,
    );
    resolve_overlaps(&mut points, config.min_sibling_distance);
    points
}

fn spread_scale(total_nodes: usize) -> f64 {
    ((total_nodes as f64) + 1.0).log2().clamp(1.0, 3.0)
}

fn place_binary(
    view: &BinaryTreeView,
    config: &BinaryLayoutConfig,
    scale: f64,
    index: usize,
    depth: u32,
    position: f64,
    points: &mut [Point],
) {
    let Some(node) = view.nodes.get(index) else {
        return;
    };
    points[index] = Point {
        x: position * config.horizontal_spacing + config.horizontal_origin,
        y: f64::from(depth) * config.vertical_spacing + config.top_margin,
    };

    let exponent = config.spread_falloff.saturating_sub(depth);
    let offset = 2f64.powi(exponent as i32) / scale;
    if let Some(left) = node.left {
        place_binary(view, config, scale, left, depth + 1, position - offset, points);
    }
    if let Some(right) = node.right {
        place_binary(view, config, scale, right, depth + 1, position + offset, points);
    }
}

/// Place a multiway tree. Returns one point per view node, view order.
pub fn multiway_coordinates(view: &MultiwayTreeView, config: &MultiwayLayoutConfig) -> Vec<Point> {
    let mut points = vec![Point::default(); view.nodes.len()];
    let Some(root) = view.root else {
        return points;
    };
    place_multiway_y(view, config, root, config.start_depth, &mut points);
    place_multiway_x(view, config, root, config.start_x, &mut points);
    resolve_overlaps(&mut points, config.min_sibling_distance);
    center_levels(&mut points, config.center_x);
    points
}

fn place_multiway_y(
    view: &MultiwayTreeView,
    config: &MultiwayLayoutConfig,
    index: usize,
    depth: u32,
    points: &mut [Point],
) {
    let Some(node) = view.nodes.get(index) else {
        return;
    };
    points[index].y = f64::from(depth) * config.vertical_spacing + config.top_margin;
    for &child in &node.children {
        place_multiway_y(view, config, child, depth + 1, points);
    }
}

/// Post-order cursor walk. Returns the cursor after this subtree.
fn place_multiway_x(
    view: &MultiwayTreeView,
    config: &MultiwayLayoutConfig,
    index: usize,
    start_x: f64,
    points: &mut [Point],
) -> f64 {
    let Some(node) = view.nodes.get(index) else {
        return start_x;
    };

    if node.children.is_empty() {
        points[index].x = start_x;
        let width = (node.key_count as f64 * config.key_width).max(config.min_node_width);
        return start_x + width + config.node_padding;
    }

    let mut cursor = place_multiway_x(view, config, node.children[0], start_x, points);
    for pair in node.children.windows(2) {
        let prev_keys = view.nodes.get(pair[0]).map_or(0, |n| n.key_count);
        let gap = (prev_keys as f64 * config.sibling_key_gap).max(config.min_sibling_gap);
        cursor = place_multiway_x(view, config, pair[1], cursor + gap, points);
    }

    let first = node
        .children
        .first()
        .and_then(|&c| points.get(c))
        .map_or(start_x, |p| p.x);
    let last = node
        .children
        .last()
        .and_then(|&c| points.get(c))
        .map_or(start_x, |p| p.x);
    points[index].x = (first + last) / 2.0;

    cursor
}

/// Enforce a minimum horizontal gap between nodes sharing a level.
///
/// Levels are runs of identical y. Within a level, in ascending x, any
/// node closer than `min_distance` to its left neighbor is pushed right;
/// pushes cascade through the level.
pub fn resolve_overlaps(points: &mut [Point], min_distance: f64) {
    let mut order: Vec<usize> = (0..points.len()).collect();
    order.sort_by(|&a, &b| {
        points[a]
            .y
            .total_cmp(&points[b].y)
            .then(points[a].x.total_cmp(&points[b].x))
    });

    let mut level_start = 0;
    while level_start < order.len() {
        let mut level_end = level_start + 1;
        while level_end < order.len() && points[order[level_end]].y == points[order[level_start]].y
        {
            level_end += 1;
        }
        for w in level_start + 1..level_end {
            let prev_x = points[order[w - 1]].x;
            if points[order[w]].x - prev_x < min_distance {
                points[order[w]].x = prev_x + min_distance;
            }
        }
        level_start = level_end;
    }
}

/// Shift every level so its horizontal span is centered on `center_x`.
fn center_levels(points: &mut [Point], center_x: f64) {
    let mut order: Vec<usize> = (0..points.len()).collect();
    order.sort_by(|&a, &b| points[a].y.total_cmp(&points[b].y));

    let mut level_start = 0;
    while level_start < order.len() {
        let mut level_end = level_start + 1;
        while level_end < order.len() && points[order[level_end]].y == points[order[level_start]].y
        {
            level_end += 1;
        }
        let level = &order[level_start..level_end];
        let min_x = level.iter().map(|&k| points[k].x).fold(f64::INFINITY, f64::min);
        let max_x = level
            .iter()
            .map(|&k| points[k].x)
            .fold(f64::NEG_INFINITY, f64::max);
        let shift = center_x - (min_x + max_x) / 2.0;
        for &k in level {
            points[k].x += shift;
        }
        level_start = level_end;
    }
}
