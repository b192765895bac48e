//! Red-Black tree engine with a replayable operation log.
//!
//! Iterative BST insertion (equal keys route right), then the classic
//! three-case fixup: red uncle means a color flip, a black uncle means
//! one or two rotations with a recolor. Every step lands in the log in
//! work order.
//!
//! Nodes live in an arena indexed by `usize`; child and parent links are
//! `Option<usize>`, so there is no shared sentinel to alias. An absent
//! child counts as BLACK, which is all the sentinel ever encoded.

use dendro_layout::{
    BinaryLayoutConfig, BinaryNodeView, BinaryTreeView, Edge, Point, binary_coordinates,
};
use dendro_oplog::{OpKind, OperationLog, OperationRecord, TreeEngine};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Operation kinds a Red-Black insertion can produce.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RbOp {
    InsertStart,
    NodeInserted,
    Recolor,
    ColorFlip,
    RotateLeft,
    RotateRight,
}

impl OpKind for RbOp {
    fn is_insert_start(&self) -> bool {
        matches!(self, RbOp::InsertStart)
    }

    fn label(&self) -> &'static str {
        match self {
            RbOp::InsertStart => "insert-start",
            RbOp::NodeInserted => "node-inserted",
            RbOp::Recolor => "recolor",
            RbOp::ColorFlip => "color-flip",
            RbOp::RotateLeft => "rotate-left",
            RbOp::RotateRight => "rotate-right",
        }
    }
}

impl fmt::Display for RbOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Red,
    Black,
}

/// One tree node. Links are arena indices; `parent` is a non-owning
/// back-reference used by the fixup rotations.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RbNode<K> {
    pub key: K,
    pub color: Color,
    pub left: Option<usize>,
    pub right: Option<usize>,
    pub parent: Option<usize>,
    pub x: f64,
    pub y: f64,
}

/// Red-Black tree over a copyable, totally-ordered key.
///
/// Duplicate keys are accepted and route right.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RedBlackTree<K> {
    nodes: Vec<RbNode<K>>,
    root: Option<usize>,
    log: OperationLog<K, RbOp>,
}

impl<K: Ord + Copy + fmt::Display> Default for RedBlackTree<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ord + Copy + fmt::Display> RedBlackTree<K> {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            root: None,
            log: OperationLog::new(),
        }
    }

    /// Insert `key`. Appends this step's records to the log.
    pub fn insert(&mut self, key: K) {
        self.log.record(
            RbOp::InsertStart,
            Some(key),
            format!("Starting insertion of value {key}"),
        );

        let index = self.nodes.len();
        self.nodes.push(RbNode {
            key,
            color: Color::Red,
            left: None,
            right: None,
            parent: None,
            x: 0.0,
            y: 0.0,
        });
        self.log.record(
            RbOp::NodeInserted,
            Some(key),
            format!("Created new RED node with value {key}"),
        );

        // Find the attach point. Equal keys route right.
        let mut parent = None;
        let mut current = self.root;
        while let Some(at) = current {
            parent = Some(at);
            current = if key < self.nodes[at].key {
                self.nodes[at].left
            } else {
                self.nodes[at].right
            };
        }

        self.nodes[index].parent = parent;
        match parent {
            None => self.root = Some(index),
            Some(p) => {
                if key < self.nodes[p].key {
                    self.nodes[p].left = Some(index);
                } else {
                    self.nodes[p].right = Some(index);
                }
            }
        }
        self.log.record(
            RbOp::NodeInserted,
            Some(key),
            format!("Inserted node {key} into the tree"),
        );

        // The new node became the root: blacken it and stop.
        if parent.is_none() {
            self.nodes[index].color = Color::Black;
            self.log.record(
                RbOp::Recolor,
                Some(key),
                format!("Recolored root node {key} to BLACK"),
            );
            return;
        }

        // No grandparent means the parent is the (black) root.
        if parent.and_then(|p| self.nodes[p].parent).is_none() {
            return;
        }

        self.fix_insert(index);
    }

    /// Restore the color rules above a freshly inserted red node.
    fn fix_insert(&mut self, mut k: usize) {
        while self.is_red(self.nodes[k].parent) {
            let Some(parent) = self.nodes[k].parent else {
                break;
            };
            let Some(grandparent) = self.nodes[parent].parent else {
                break;
            };

            if self.nodes[grandparent].right == Some(parent) {
                let uncle = self.nodes[grandparent].left;
                if self.is_red(uncle) {
                    self.color_flip(uncle, parent, grandparent);
                    k = grandparent;
                } else {
                    if self.nodes[parent].left == Some(k) {
                        // Inner grandchild: straighten it first.
                        k = parent;
                        self.rotate_right(k);
                    }
                    if let Some(parent) = self.nodes[k].parent {
                        self.nodes[parent].color = Color::Black;
                        if let Some(grandparent) = self.nodes[parent].parent {
                            self.nodes[grandparent].color = Color::Red;
                            self.log.record(
                                RbOp::Recolor,
                                Some(self.nodes[parent].key),
                                "Recolored parent to BLACK and grandparent to RED",
                            );
                            self.rotate_left(grandparent);
                        }
                    }
                }
            } else {
                let uncle = self.nodes[grandparent].right;
                if self.is_red(uncle) {
                    self.color_flip(uncle, parent, grandparent);
                    k = grandparent;
                } else {
                    if self.nodes[parent].right == Some(k) {
                        k = parent;
                        self.rotate_left(k);
                    }
                    if let Some(parent) = self.nodes[k].parent {
                        self.nodes[parent].color = Color::Black;
                        if let Some(grandparent) = self.nodes[parent].parent {
                            self.nodes[grandparent].color = Color::Red;
                            self.log.record(
                                RbOp::Recolor,
                                Some(self.nodes[parent].key),
                                "Recolored parent to BLACK and grandparent to RED",
                            );
                            self.rotate_right(grandparent);
                        }
                    }
                }
            }

            if Some(k) == self.root {
                break;
            }
        }

        // The root is forced BLACK without a record; only the empty-tree
        // shortcut logs its recolor.
        if let Some(root) = self.root {
            self.nodes[root].color = Color::Black;
        }
    }

    fn color_flip(&mut self, uncle: Option<usize>, parent: usize, grandparent: usize) {
        if let Some(uncle) = uncle {
            self.nodes[uncle].color = Color::Black;
        }
        self.nodes[parent].color = Color::Black;
        self.nodes[grandparent].color = Color::Red;
        self.log.record(
            RbOp::ColorFlip,
            Some(self.nodes[grandparent].key),
            "Color flip: Uncle and parent to BLACK, grandparent to RED",
        );
    }

    /// Rotate left at `x`: the right child takes `x`'s place. Rewires
    /// the three parent links and the root pointer, nothing else.
    fn rotate_left(&mut self, x: usize) {
        let Some(y) = self.nodes[x].right else {
            return;
        };
        let pivot_key = self.nodes[x].key;

        self.nodes[x].right = self.nodes[y].left;
        if let Some(inner) = self.nodes[y].left {
            self.nodes[inner].parent = Some(x);
        }
        self.nodes[y].parent = self.nodes[x].parent;
        match self.nodes[x].parent {
            None => self.root = Some(y),
            Some(p) => {
                if self.nodes[p].left == Some(x) {
                    self.nodes[p].left = Some(y);
                } else {
                    self.nodes[p].right = Some(y);
                }
            }
        }
        self.nodes[y].left = Some(x);
        self.nodes[x].parent = Some(y);

        self.log.record(
            RbOp::RotateLeft,
            Some(pivot_key),
            format!("Left rotation performed at node {pivot_key}"),
        );
    }

    /// Mirror of `rotate_left`.
    fn rotate_right(&mut self, x: usize) {
        let Some(y) = self.nodes[x].left else {
            return;
        };
        let pivot_key = self.nodes[x].key;

        self.nodes[x].left = self.nodes[y].right;
        if let Some(inner) = self.nodes[y].right {
            self.nodes[inner].parent = Some(x);
        }
        self.nodes[y].parent = self.nodes[x].parent;
        match self.nodes[x].parent {
            None => self.root = Some(y),
            Some(p) => {
                if self.nodes[p].left == Some(x) {
                    self.nodes[p].left = Some(y);
                } else {
                    self.nodes[p].right = Some(y);
                }
            }
        }
        self.nodes[y].right = Some(x);
        self.nodes[x].parent = Some(y);

        self.log.record(
            RbOp::RotateRight,
            Some(pivot_key),
            format!("Right rotation performed at node {pivot_key}"),
        );
    }

    fn is_red(&self, index: Option<usize>) -> bool {
        // Absent children are BLACK.
        index.is_some_and(|i| self.nodes[i].color == Color::Red)
    }

    pub fn root(&self) -> Option<&RbNode<K>> {
        self.root.map(|i| &self.nodes[i])
    }

    pub fn root_index(&self) -> Option<usize> {
        self.root
    }

    /// Arena accessor; follow `left`/`right`/`parent` indices through it.
    pub fn node(&self, index: usize) -> Option<&RbNode<K>> {
        self.nodes.get(index)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Tree height in levels; empty is 0, a lone root is 1.
    pub fn height(&self) -> u32 {
        fn depth<K>(nodes: &[RbNode<K>], index: Option<usize>) -> u32 {
            index.map_or(0, |i| {
                1 + depth(nodes, nodes[i].left).max(depth(nodes, nodes[i].right))
            })
        }
        depth(&self.nodes, self.root)
    }

    pub fn contains(&self, key: K) -> bool {
        let mut current = self.root;
        while let Some(at) = current {
            if key == self.nodes[at].key {
                return true;
            }
            current = if key < self.nodes[at].key {
                self.nodes[at].left
            } else {
                self.nodes[at].right
            };
        }
        false
    }

    /// Keys in ascending order, duplicates included.
    pub fn in_order_keys(&self) -> Vec<K> {
        fn walk<K: Copy>(nodes: &[RbNode<K>], index: Option<usize>, out: &mut Vec<K>) {
            if let Some(i) = index {
                walk(nodes, nodes[i].left, out);
                out.push(nodes[i].key);
                walk(nodes, nodes[i].right, out);
            }
        }
        let mut out = Vec::with_capacity(self.nodes.len());
        walk(&self.nodes, self.root, &mut out);
        out
    }

    /// Every node, pre-order.
    pub fn all_nodes(&self) -> Vec<&RbNode<K>> {
        self.pre_order_indices()
            .into_iter()
            .map(|i| &self.nodes[i])
            .collect()
    }

    /// Every parent-to-child edge, each exactly once.
    pub fn edges(&self) -> Vec<Edge<'_, RbNode<K>>> {
        let mut out = Vec::new();
        for i in self.pre_order_indices() {
            for child in [self.nodes[i].left, self.nodes[i].right].into_iter().flatten() {
                out.push(Edge {
                    source: &self.nodes[i],
                    target: &self.nodes[child],
                });
            }
        }
        out
    }

    /// Assign `x`/`y` to every node. Call after every structural change
    /// and before reading positions.
    pub fn calculate_coordinates(&mut self, config: &BinaryLayoutConfig) {
        let order = self.pre_order_indices();
        let mut slot_of = vec![None; self.nodes.len()];
        for (slot, &index) in order.iter().enumerate() {
            slot_of[index] = Some(slot);
        }

        let view = BinaryTreeView {
            nodes: order
                .iter()
                .map(|&index| BinaryNodeView {
                    left: self.nodes[index].left.and_then(|l| slot_of[l]),
                    right: self.nodes[index].right.and_then(|r| slot_of[r]),
                })
                .collect(),
            root: self.root.and_then(|r| slot_of[r]),
        };
        let points: Vec<Point> = binary_coordinates(&view, config);

        for (slot, &index) in order.iter().enumerate() {
            if let Some(point) = points.get(slot) {
                self.nodes[index].x = point.x;
                self.nodes[index].y = point.y;
            }
        }
    }

    /// Pre-order arena indices, iteratively (no recursion depth limit).
    fn pre_order_indices(&self) -> Vec<usize> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack = Vec::new();
        if let Some(root) = self.root {
            stack.push(root);
        }
        while let Some(index) = stack.pop() {
            order.push(index);
            if let Some(right) = self.nodes[index].right {
                stack.push(right);
            }
            if let Some(left) = self.nodes[index].left {
                stack.push(left);
            }
        }
        order
    }

    pub fn operations(&self) -> &[OperationRecord<K, RbOp>] {
        self.log.as_slice()
    }

    pub fn log(&self) -> &OperationLog<K, RbOp> {
        &self.log
    }

    /// Rule: the root is BLACK.
    pub fn root_is_black(&self) -> bool {
        self.root.is_none_or(|r| self.nodes[r].color == Color::Black)
    }

    /// Rule: a RED node never has a RED child.
    pub fn no_red_red(&self) -> bool {
        self.nodes.iter().all(|node| {
            node.color == Color::Black
                || (!self.is_red(node.left) && !self.is_red(node.right))
        })
    }

    /// Rule: every root-to-leaf path crosses the same number of BLACK
    /// nodes. Returns that count, or `None` when the rule is broken.
    pub fn black_height(&self) -> Option<usize> {
        fn walk<K>(nodes: &[RbNode<K>], index: Option<usize>) -> Option<usize> {
            let Some(i) = index else {
                return Some(0);
            };
            let left = walk(nodes, nodes[i].left)?;
            let right = walk(nodes, nodes[i].right)?;
            if left != right {
                return None;
            }
            Some(left + usize::from(nodes[i].color == Color::Black))
        }
        walk(&self.nodes, self.root)
    }

    /// Every child's `parent` points back; the root's is `None`.
    pub fn parent_links_consistent(&self) -> bool {
        if let Some(root) = self.root {
            if self.nodes[root].parent.is_some() {
                return false;
            }
        }
        self.nodes.iter().enumerate().all(|(i, node)| {
            node.left.is_none_or(|l| self.nodes[l].parent == Some(i))
                && node.right.is_none_or(|r| self.nodes[r].parent == Some(i))
        })
    }
}

impl<K: Ord + Copy + fmt::Display> TreeEngine for RedBlackTree<K> {
    type Key = K;
    type Kind = RbOp;

    fn fresh(&self) -> Self {
        RedBlackTree::new()
    }

    fn insert(&mut self, key: K) {
        RedBlackTree::insert(self, key);
    }

    fn operations(&self) -> &[OperationRecord<K, RbOp>] {
        self.log.as_slice()
    }
}
