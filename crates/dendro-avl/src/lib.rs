//! AVL tree engine with a replayable operation log.
//!
//! Classic recursive insertion: descend to the leaf position, then fix
//! heights and balance on the way back up. Every step lands in the log
//! as a typed record with a human-readable description, ordered exactly
//! as the work happened, so a renderer can animate the log one record
//! at a time and land on the same tree the engine holds.
//!
//! Duplicate keys are a silent no-op: the insertion anchor is logged
//! (the call happened), nothing else changes.

use dendro_ids::NodeId;
use dendro_layout::{
    BinaryLayoutConfig, BinaryNodeView, BinaryTreeView, Edge, Point, binary_coordinates,
};
use dendro_oplog::{OpKind, OperationLog, OperationRecord, TreeEngine};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Operation kinds an AVL insertion can produce.
///
/// `BalanceCheck` covers both the factor probe and the rebalance-case
/// detection record; the description tells them apart.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AvlOp {
    InsertStart,
    NodeInserted,
    UpdateHeight,
    BalanceCheck,
    RotateLeft,
    RotateRight,
}

impl OpKind for AvlOp {
    fn is_insert_start(&self) -> bool {
        matches!(self, AvlOp::InsertStart)
    }

    fn label(&self) -> &'static str {
        match self {
            AvlOp::InsertStart => "insert-start",
            AvlOp::NodeInserted => "node-inserted",
            AvlOp::UpdateHeight => "update-height",
            AvlOp::BalanceCheck => "balance-check",
            AvlOp::RotateLeft => "rotate-left",
            AvlOp::RotateRight => "rotate-right",
        }
    }
}

impl fmt::Display for AvlOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One tree node. `height` counts levels, a leaf is 1.
///
/// `x` and `y` are whatever the last `calculate_coordinates` call wrote;
/// zero before the first call.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AvlNode<K> {
    pub key: K,
    pub height: u32,
    pub left: Option<Box<AvlNode<K>>>,
    pub right: Option<Box<AvlNode<K>>>,
    pub x: f64,
    pub y: f64,
    pub id: NodeId,
}

/// AVL tree over a copyable, totally-ordered key.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AvlTree<K> {
    root: Option<Box<AvlNode<K>>>,
    log: OperationLog<K, AvlOp>,
    sequence: u64,
}

impl<K: Ord + Copy + fmt::Display> Default for AvlTree<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ord + Copy + fmt::Display> AvlTree<K> {
    pub fn new() -> Self {
        Self {
            root: None,
            log: OperationLog::new(),
            sequence: 0,
        }
    }

    /// Insert `key`, rebalancing as needed. Appends this step's records.
    pub fn insert(&mut self, key: K) {
        self.log.record(
            AvlOp::InsertStart,
            Some(key),
            format!("Starting insertion of value {key}"),
        );
        let root = self.root.take();
        self.root = Some(self.insert_node(root, key));
    }

    fn insert_node(&mut self, node: Option<Box<AvlNode<K>>>, key: K) -> Box<AvlNode<K>> {
        let Some(mut node) = node else {
            return self.new_node(key);
        };

        match key.cmp(&node.key) {
            Ordering::Less => {
                let left = node.left.take();
                node.left = Some(self.insert_node(left, key));
            }
            Ordering::Greater => {
                let right = node.right.take();
                node.right = Some(self.insert_node(right, key));
            }
            // Duplicates are a no-op.
            Ordering::Equal => return node,
        }

        node.height = 1 + child_height(&node.left).max(child_height(&node.right));
        self.log.record(
            AvlOp::UpdateHeight,
            Some(node.key),
            format!("Updated height of node {} to {}", node.key, node.height),
        );

        let balance = balance_of(&node);
        self.log.record(
            AvlOp::BalanceCheck,
            Some(node.key),
            format!("Checking balance factor of node {}: {balance}", node.key),
        );

        if balance > 1 && node.left.as_ref().is_some_and(|left| key < left.key) {
            self.log.record(
                AvlOp::BalanceCheck,
                Some(node.key),
                format!("Left Left Case detected at node {}", node.key),
            );
            return self.rotate_right(node);
        }

        if balance < -1 && node.right.as_ref().is_some_and(|right| key > right.key) {
            self.log.record(
                AvlOp::BalanceCheck,
                Some(node.key),
                format!("Right Right Case detected at node {}", node.key),
            );
            return self.rotate_left(node);
        }

        if balance > 1 && node.left.as_ref().is_some_and(|left| key > left.key) {
            self.log.record(
                AvlOp::BalanceCheck,
                Some(node.key),
                format!("Left Right Case detected at node {}", node.key),
            );
            if let Some(left) = node.left.take() {
                node.left = Some(self.rotate_left(left));
            }
            return self.rotate_right(node);
        }

        if balance < -1 && node.right.as_ref().is_some_and(|right| key < right.key) {
            self.log.record(
                AvlOp::BalanceCheck,
                Some(node.key),
                format!("Right Left Case detected at node {}", node.key),
            );
            if let Some(right) = node.right.take() {
                node.right = Some(self.rotate_right(right));
            }
            return self.rotate_left(node);
        }

        node
    }

    fn new_node(&mut self, key: K) -> Box<AvlNode<K>> {
        let id = NodeId::from_parts(["avl", &key.to_string(), &self.sequence.to_string()]);
        self.sequence += 1;
        self.log.record(
            AvlOp::NodeInserted,
            Some(key),
            format!("Inserted new node with value {key}"),
        );
        Box::new(AvlNode {
            key,
            height: 1,
            left: None,
            right: None,
            x: 0.0,
            y: 0.0,
            id,
        })
    }

    /// Rotate the subtree rooted at `node` to the right. The left child
    /// becomes the subtree root; heights of the two moved nodes are the
    /// only heights touched.
    fn rotate_right(&mut self, mut node: Box<AvlNode<K>>) -> Box<AvlNode<K>> {
        let Some(mut pivot) = node.left.take() else {
            return node;
        };
        let old_root = node.key;
        node.left = pivot.right.take();
        node.height = 1 + child_height(&node.left).max(child_height(&node.right));
        pivot.right = Some(node);
        pivot.height = 1 + child_height(&pivot.left).max(child_height(&pivot.right));
        self.log.record(
            AvlOp::RotateRight,
            Some(old_root),
            format!("Right rotation performed at node {old_root}"),
        );
        pivot
    }

    /// Mirror of `rotate_right`.
    fn rotate_left(&mut self, mut node: Box<AvlNode<K>>) -> Box<AvlNode<K>> {
        let Some(mut pivot) = node.right.take() else {
            return node;
        };
        let old_root = node.key;
        node.right = pivot.left.take();
        node.height = 1 + child_height(&node.left).max(child_height(&node.right));
        pivot.left = Some(node);
        pivot.height = 1 + child_height(&pivot.left).max(child_height(&pivot.right));
        self.log.record(
            AvlOp::RotateLeft,
            Some(old_root),
            format!("Left rotation performed at node {old_root}"),
        );
        pivot
    }

    pub fn root(&self) -> Option<&AvlNode<K>> {
        self.root.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Number of keys held.
    pub fn len(&self) -> usize {
        fn count<K>(node: &Option<Box<AvlNode<K>>>) -> usize {
            node.as_deref()
                .map_or(0, |n| 1 + count(&n.left) + count(&n.right))
        }
        count(&self.root)
    }

    /// Tree height in levels; empty is 0, a lone root is 1.
    pub fn height(&self) -> u32 {
        self.root.as_deref().map_or(0, |n| n.height)
    }

    pub fn contains(&self, key: K) -> bool {
        let mut current = self.root.as_deref();
        while let Some(node) = current {
            current = match key.cmp(&node.key) {
                Ordering::Less => node.left.as_deref(),
                Ordering::Greater => node.right.as_deref(),
                Ordering::Equal => return true,
            };
        }
        false
    }

    /// Keys in ascending order.
    pub fn in_order_keys(&self) -> Vec<K> {
        fn walk<K: Copy>(node: &Option<Box<AvlNode<K>>>, out: &mut Vec<K>) {
            if let Some(node) = node.as_deref() {
                walk(&node.left, out);
                out.push(node.key);
                walk(&node.right, out);
            }
        }
        let mut out = Vec::new();
        walk(&self.root, &mut out);
        out
    }

    /// Every node, pre-order.
    pub fn all_nodes(&self) -> Vec<&AvlNode<K>> {
        fn walk<'a, K>(node: &'a Option<Box<AvlNode<K>>>, out: &mut Vec<&'a AvlNode<K>>) {
            if let Some(node) = node.as_deref() {
                out.push(node);
                walk(&node.left, out);
                walk(&node.right, out);
            }
        }
        let mut out = Vec::new();
        walk(&self.root, &mut out);
        out
    }

    /// Every parent-to-child edge, each exactly once.
    pub fn edges(&self) -> Vec<Edge<'_, AvlNode<K>>> {
        fn walk<'a, K>(node: &'a Option<Box<AvlNode<K>>>, out: &mut Vec<Edge<'a, AvlNode<K>>>) {
            if let Some(node) = node.as_deref() {
                for child in [node.left.as_deref(), node.right.as_deref()].into_iter().flatten() {
                    out.push(Edge {
                        source: node,
                        target: child,
                    });
                }
                walk(&node.left, out);
                walk(&node.right, out);
            }
        }
        let mut out = Vec::new();
        walk(&self.root, &mut out);
        out
    }

    /// Assign `x`/`y` to every node. Call after every structural change
    /// and before reading positions.
    pub fn calculate_coordinates(&mut self, config: &BinaryLayoutConfig) {
        let view = self.layout_view();
        let points = binary_coordinates(&view, config);
        let mut cursor = 0;
        apply_points(&mut self.root, &points, &mut cursor);
    }

    fn layout_view(&self) -> BinaryTreeView {
        fn build<K>(
            node: &Option<Box<AvlNode<K>>>,
            nodes: &mut Vec<BinaryNodeView>,
        ) -> Option<usize> {
            let node = node.as_deref()?;
            let index = nodes.len();
            nodes.push(BinaryNodeView::default());
            let left = build(&node.left, nodes);
            let right = build(&node.right, nodes);
            nodes[index] = BinaryNodeView { left, right };
            Some(index)
        }
        let mut nodes = Vec::new();
        let root = build(&self.root, &mut nodes);
        BinaryTreeView { nodes, root }
    }

    pub fn operations(&self) -> &[OperationRecord<K, AvlOp>] {
        self.log.as_slice()
    }

    pub fn log(&self) -> &OperationLog<K, AvlOp> {
        &self.log
    }

    /// True when every node's balance factor is in [-1, 1].
    pub fn is_balanced(&self) -> bool {
        fn check<K>(node: &Option<Box<AvlNode<K>>>) -> bool {
            let Some(node) = node.as_deref() else {
                return true;
            };
            (-1..=1).contains(&balance_of(node)) && check(&node.left) && check(&node.right)
        }
        check(&self.root)
    }

    /// True when every stored height matches the recomputed one.
    pub fn heights_consistent(&self) -> bool {
        fn check<K>(node: &Option<Box<AvlNode<K>>>) -> Option<u32> {
            let Some(node) = node.as_deref() else {
                return Some(0);
            };
            let left = check(&node.left)?;
            let right = check(&node.right)?;
            let expected = 1 + left.max(right);
            (node.height == expected).then_some(expected)
        }
        check(&self.root).is_some()
    }
}

fn child_height<K>(node: &Option<Box<AvlNode<K>>>) -> u32 {
    node.as_deref().map_or(0, |n| n.height)
}

/// Balance factor: left height minus right height.
fn balance_of<K>(node: &AvlNode<K>) -> i64 {
    i64::from(child_height(&node.left)) - i64::from(child_height(&node.right))
}

fn apply_points<K>(node: &mut Option<Box<AvlNode<K>>>, points: &[Point], cursor: &mut usize) {
    let Some(node) = node.as_deref_mut() else {
        return;
    };
    if let Some(point) = points.get(*cursor) {
        node.x = point.x;
        node.y = point.y;
    }
    *cursor += 1;
    apply_points(&mut node.left, points, cursor);
    apply_points(&mut node.right, points, cursor);
}

impl<K: Ord + Copy + fmt::Display> TreeEngine for AvlTree<K> {
    type Key = K;
    type Kind = AvlOp;

    fn fresh(&self) -> Self {
        AvlTree::new()
    }

    fn insert(&mut self, key: K) {
        AvlTree::insert(self, key);
    }

    fn operations(&self) -> &[OperationRecord<K, AvlOp>] {
        self.log.as_slice()
    }
}
