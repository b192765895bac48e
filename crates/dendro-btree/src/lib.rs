//! B-Tree engine with a replayable operation log.
//!
//! Order-`m` B-Tree: a node holds at most `m - 1` keys. Insertion
//! descends to a leaf (equal keys route right), inserts at the sorted
//! position, and splits any overflowing node at its floor midpoint on
//! the way back up. Splits cascade: a promoted key can overflow the
//! parent, which then splits too, and an overflowing root splits under
//! a fresh root, growing the tree by exactly one level.
//!
//! An empty tree has no root node at all, so an empty tree renders as
//! nothing rather than as an empty box.

use dendro_layout::{
    Edge, MultiwayLayoutConfig, MultiwayNodeView, MultiwayTreeView, Point, multiway_coordinates,
};
use dendro_oplog::{OpKind, OperationLog, OperationRecord, TreeEngine};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Operation kinds a B-Tree insertion can produce.
///
/// One insertion brackets its splits: `InsertStart`, zero or more
/// `Split` records in cascade order (deepest first), `InsertComplete`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BTreeOp {
    InsertStart,
    InsertComplete,
    Split,
}

impl OpKind for BTreeOp {
    fn is_insert_start(&self) -> bool {
        matches!(self, BTreeOp::InsertStart)
    }

    fn label(&self) -> &'static str {
        match self {
            BTreeOp::InsertStart => "insert-start",
            BTreeOp::InsertComplete => "insert-complete",
            BTreeOp::Split => "split",
        }
    }
}

impl fmt::Display for BTreeOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Smallest order that can split: one promoted key plus one key per half.
pub const MIN_ORDER: usize = 3;

/// B-Tree configuration errors
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum BTreeError {
    OrderTooSmall { order: usize },
}

impl fmt::Display for BTreeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BTreeError::OrderTooSmall { order } => {
                write!(f, "order {order} is too small, minimum is {MIN_ORDER}")
            }
        }
    }
}

impl std::error::Error for BTreeError {}

/// One tree node: a sorted key run and one child per key gap.
///
/// A leaf is a node with no children; there is no separate flag.
/// `x` and `y` are whatever the last `calculate_coordinates` call wrote;
/// zero before the first call.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BTreeNode<K> {
    pub keys: Vec<K>,
    pub children: Vec<BTreeNode<K>>,
    pub x: f64,
    pub y: f64,
}

/// B-Tree over a copyable, totally-ordered key.
///
/// Duplicate keys are accepted and route right of their equal separator.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BTree<K> {
    root: Option<BTreeNode<K>>,
    order: usize,
    log: OperationLog<K, BTreeOp>,
}

impl<K: Ord + Copy + fmt::Display> Default for BTree<K> {
    /// Order 3, the smallest valid order.
    fn default() -> Self {
        Self {
            root: None,
            order: MIN_ORDER,
            log: OperationLog::new(),
        }
    }
}

impl<K: Ord + Copy + fmt::Display> BTree<K> {
    /// New empty tree. `order` is the maximum child count per node;
    /// anything below [`MIN_ORDER`] cannot split and is rejected.
    pub fn new(order: usize) -> Result<Self, BTreeError> {
        if order < MIN_ORDER {
            return Err(BTreeError::OrderTooSmall { order });
        }
        Ok(Self {
            root: None,
            order,
            log: OperationLog::new(),
        })
    }

    /// Insert `key`, splitting as needed. Appends this step's records.
    pub fn insert(&mut self, key: K) {
        self.log.record(
            BTreeOp::InsertStart,
            Some(key),
            format!("Starting insertion of key {key}"),
        );

        match self.root.take() {
            None => {
                self.root = Some(BTreeNode {
                    keys: vec![key],
                    children: Vec::new(),
                    x: 0.0,
                    y: 0.0,
                });
            }
            Some(mut root) => {
                insert_into(&mut root, key, self.order, &mut self.log);
                if root.keys.len() > self.order - 1 {
                    // An overflowing root splits under a fresh root.
                    // The only place the tree gains a level.
                    let mut grown = BTreeNode {
                        keys: Vec::new(),
                        children: vec![root],
                        x: 0.0,
                        y: 0.0,
                    };
                    split_child(&mut grown, 0, &mut self.log);
                    root = grown;
                }
                self.root = Some(root);
            }
        }

        self.log.record(
            BTreeOp::InsertComplete,
            Some(key),
            format!("Completed insertion of key {key}"),
        );
    }

    pub fn root(&self) -> Option<&BTreeNode<K>> {
        self.root.as_ref()
    }

    /// Maximum child count per node.
    pub fn order(&self) -> usize {
        self.order
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Number of keys held, duplicates included.
    pub fn len(&self) -> usize {
        fn count<K>(node: &BTreeNode<K>) -> usize {
            node.keys.len() + node.children.iter().map(count).sum::<usize>()
        }
        self.root.as_ref().map_or(0, count)
    }

    /// Tree height in levels; empty is 0, a lone root is 1.
    pub fn height(&self) -> u32 {
        fn depth<K>(node: &BTreeNode<K>) -> u32 {
            1 + node.children.iter().map(depth).max().unwrap_or(0)
        }
        self.root.as_ref().map_or(0, depth)
    }

    pub fn contains(&self, key: K) -> bool {
        let mut current = self.root.as_ref();
        while let Some(node) = current {
            if node.keys.contains(&key) {
                return true;
            }
            let slot = node.keys.partition_point(|separator| *separator <= key);
            current = node.children.get(slot);
        }
        false
    }

    /// Keys in ascending order, duplicates included.
    pub fn in_order_keys(&self) -> Vec<K> {
        fn walk<K: Copy>(node: &BTreeNode<K>, out: &mut Vec<K>) {
            if node.children.is_empty() {
                out.extend_from_slice(&node.keys);
                return;
            }
            for (gap, child) in node.children.iter().enumerate() {
                walk(child, out);
                if let Some(&key) = node.keys.get(gap) {
                    out.push(key);
                }
            }
        }
        let mut out = Vec::with_capacity(self.len());
        if let Some(root) = self.root.as_ref() {
            walk(root, &mut out);
        }
        out
    }

    /// Every node, pre-order.
    pub fn all_nodes(&self) -> Vec<&BTreeNode<K>> {
        fn walk<'a, K>(node: &'a BTreeNode<K>, out: &mut Vec<&'a BTreeNode<K>>) {
            out.push(node);
            for child in &node.children {
                walk(child, out);
            }
        }
        let mut out = Vec::new();
        if let Some(root) = self.root.as_ref() {
            walk(root, &mut out);
        }
        out
    }

    /// Every parent-to-child edge, each exactly once.
    pub fn edges(&self) -> Vec<Edge<'_, BTreeNode<K>>> {
        fn walk<'a, K>(node: &'a BTreeNode<K>, out: &mut Vec<Edge<'a, BTreeNode<K>>>) {
            for child in &node.children {
                out.push(Edge {
                    source: node,
                    target: child,
                });
            }
            for child in &node.children {
                walk(child, out);
            }
        }
        let mut out = Vec::new();
        if let Some(root) = self.root.as_ref() {
            walk(root, &mut out);
        }
        out
    }

    /// Assign `x`/`y` to every node. Call after every structural change
    /// and before reading positions.
    pub fn calculate_coordinates(&mut self, config: &MultiwayLayoutConfig) {
        let view = self.layout_view();
        let points = multiway_coordinates(&view, config);
        let mut cursor = 0;
        if let Some(root) = self.root.as_mut() {
            apply_points(root, &points, &mut cursor);
        }
    }

    fn layout_view(&self) -> MultiwayTreeView {
        fn build<K>(node: &BTreeNode<K>, nodes: &mut Vec<MultiwayNodeView>) -> usize {
            let index = nodes.len();
            nodes.push(MultiwayNodeView {
                children: Vec::with_capacity(node.children.len()),
                key_count: node.keys.len(),
            });
            for child in &node.children {
                let child_index = build(child, nodes);
                nodes[index].children.push(child_index);
            }
            index
        }
        let mut nodes = Vec::new();
        let root = self.root.as_ref().map(|root| build(root, &mut nodes));
        MultiwayTreeView { nodes, root }
    }

    pub fn operations(&self) -> &[OperationRecord<K, BTreeOp>] {
        self.log.as_slice()
    }

    pub fn log(&self) -> &OperationLog<K, BTreeOp> {
        &self.log
    }

    /// Rule: every leaf sits at the same depth.
    pub fn leaves_at_uniform_depth(&self) -> bool {
        fn walk<K>(node: &BTreeNode<K>, depth: u32, leaf_depth: &mut Option<u32>) -> bool {
            if node.children.is_empty() {
                return match leaf_depth {
                    Some(expected) => *expected == depth,
                    None => {
                        *leaf_depth = Some(depth);
                        true
                    }
                };
            }
            node.children
                .iter()
                .all(|child| walk(child, depth + 1, leaf_depth))
        }
        let mut leaf_depth = None;
        self.root
            .as_ref()
            .is_none_or(|root| walk(root, 0, &mut leaf_depth))
    }

    /// Rule: an internal node has exactly one more child than keys.
    pub fn fanout_consistent(&self) -> bool {
        fn walk<K>(node: &BTreeNode<K>) -> bool {
            if node.children.is_empty() {
                return true;
            }
            node.children.len() == node.keys.len() + 1 && node.children.iter().all(walk)
        }
        self.root.as_ref().is_none_or(|root| walk(root))
    }

    /// Rule: no node holds more than `order - 1` keys, and no node
    /// below the root is ever empty.
    pub fn within_key_bound(&self) -> bool {
        fn walk<K>(node: &BTreeNode<K>, bound: usize) -> bool {
            node.keys.len() <= bound
                && node
                    .children
                    .iter()
                    .all(|child| !child.keys.is_empty() && walk(child, bound))
        }
        self.root
            .as_ref()
            .is_none_or(|root| walk(root, self.order - 1))
    }
}

/// Descend to the leaf for `key`, insert it sorted, and split any child
/// that overflows on the way back up. The caller checks `node` itself.
fn insert_into<K: Ord + Copy + fmt::Display>(
    node: &mut BTreeNode<K>,
    key: K,
    order: usize,
    log: &mut OperationLog<K, BTreeOp>,
) {
    if node.children.is_empty() {
        let at = node.keys.partition_point(|existing| *existing <= key);
        node.keys.insert(at, key);
        return;
    }

    // Equal keys route right, so the slot is the upper bound.
    let slot = node.keys.partition_point(|separator| *separator <= key);
    insert_into(&mut node.children[slot], key, order, log);
    if node.children[slot].keys.len() > order - 1 {
        split_child(node, slot, log);
    }
}

/// Split `parent.children[slot]` at its floor midpoint. The middle key
/// moves up into `parent` at key position `slot`; the right half
/// becomes a new sibling at child position `slot + 1`.
fn split_child<K: Ord + Copy + fmt::Display>(
    parent: &mut BTreeNode<K>,
    slot: usize,
    log: &mut OperationLog<K, BTreeOp>,
) {
    let child = &mut parent.children[slot];
    let mid = child.keys.len() / 2;
    let right_keys = child.keys.split_off(mid + 1);
    let Some(middle) = child.keys.pop() else {
        return;
    };
    let right_children = if child.children.is_empty() {
        Vec::new()
    } else {
        child.children.split_off(mid + 1)
    };

    parent.keys.insert(slot, middle);
    parent.children.insert(
        slot + 1,
        BTreeNode {
            keys: right_keys,
            children: right_children,
            x: 0.0,
            y: 0.0,
        },
    );
    log.record(
        BTreeOp::Split,
        Some(middle),
        format!("Split complete: middle key {middle} moved to parent"),
    );
}

fn apply_points<K>(node: &mut BTreeNode<K>, points: &[Point], cursor: &mut usize) {
    if let Some(point) = points.get(*cursor) {
        node.x = point.x;
        node.y = point.y;
    }
    *cursor += 1;
    for child in &mut node.children {
        apply_points(child, points, cursor);
    }
}

impl<K: Ord + Copy + fmt::Display> TreeEngine for BTree<K> {
    type Key = K;
    type Kind = BTreeOp;

    fn fresh(&self) -> Self {
        Self {
            root: None,
            order: self.order,
            log: OperationLog::new(),
        }
    }

    fn insert(&mut self, key: K) {
        BTree::insert(self, key);
    }

    fn operations(&self) -> &[OperationRecord<K, BTreeOp>] {
        self.log.as_slice()
    }
}
