// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

use strata_geom::Aabb;

/// A node of the bounding-volume hierarchy.
///
/// A node is either a leaf wrapping exactly one object index, or an internal
/// node owning exactly two children. Shape (leaf flag, object index, children)
/// is fixed at construction. Bounds and leaf count are mutable only inside the
/// crate, which is how refit updates a tree in place without changing its
/// topology.
///
/// Invariants, upheld by the constructors and by refit:
/// - an internal node's bounds equal `left.bounds().union(right.bounds())`;
/// - an internal node's leaf count equals the sum of its children's;
/// - a leaf's leaf count is `1`.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    bounds: Aabb,
    leaf_count: usize,
    kind: NodeKind,
}

#[derive(Debug, Clone, PartialEq)]
enum NodeKind {
    Leaf { object: usize },
    Internal { left: Box<Node>, right: Box<Node> },
}

impl Node {
    /// Creates a leaf for object `object` with the given bounds.
    pub fn leaf(object: usize, bounds: Aabb) -> Self {
        Self {
            bounds,
            leaf_count: 1,
            kind: NodeKind::Leaf { object },
        }
    }

    /// Creates an internal node owning `left` and `right`.
    ///
    /// Bounds and leaf count are derived from the children.
    pub fn internal(left: Self, right: Self) -> Self {
        Self {
            bounds: left.bounds.union(&right.bounds),
            leaf_count: left.leaf_count + right.leaf_count,
            kind: NodeKind::Internal {
                left: Box::new(left),
                right: Box::new(right),
            },
        }
    }

    /// Returns `true` for leaves.
    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Leaf { .. })
    }

    /// Bounding box of the subtree.
    pub fn bounds(&self) -> Aabb {
        self.bounds
    }

    /// Number of leaves in the subtree.
    pub fn leaf_count(&self) -> usize {
        self.leaf_count
    }

    /// Object index wrapped by a leaf; `None` for internal nodes.
    pub fn object_index(&self) -> Option<usize> {
        match self.kind {
            NodeKind::Leaf { object } => Some(object),
            NodeKind::Internal { .. } => None,
        }
    }

    /// Left child; `None` for leaves.
    pub fn left(&self) -> Option<&Self> {
        self.children().map(|(left, _)| left)
    }

    /// Right child; `None` for leaves.
    pub fn right(&self) -> Option<&Self> {
        self.children().map(|(_, right)| right)
    }

    /// Both children of an internal node.
    pub fn children(&self) -> Option<(&Self, &Self)> {
        match &self.kind {
            NodeKind::Leaf { .. } => None,
            NodeKind::Internal { left, right } => Some((&**left, &**right)),
        }
    }

    /// Height of the subtree; a lone leaf has depth `0`.
    pub fn depth(&self) -> usize {
        self.children()
            .map_or(0, |(left, right)| 1 + left.depth().max(right.depth()))
    }

    /// Object indices of every leaf in the subtree, left to right.
    pub fn leaf_indices(&self) -> Vec<usize> {
        let mut out = Vec::with_capacity(self.leaf_count);
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            match &node.kind {
                NodeKind::Leaf { object } => out.push(*object),
                NodeKind::Internal { left, right } => {
                    stack.push(&**right);
                    stack.push(&**left);
                }
            }
        }
        out
    }

    /// Returns `true` when both trees have the same shape and the same
    /// object-to-leaf assignment. Bounds are ignored.
    pub fn same_topology(&self, other: &Self) -> bool {
        match (&self.kind, &other.kind) {
            (NodeKind::Leaf { object: a }, NodeKind::Leaf { object: b }) => a == b,
            (
                NodeKind::Internal { left: al, right: ar },
                NodeKind::Internal { left: bl, right: br },
            ) => al.same_topology(bl) && ar.same_topology(br),
            _ => false,
        }
    }

    /// Pre-order walk over every node in the subtree.
    pub fn visit(&self, f: &mut impl FnMut(&Self)) {
        f(self);
        if let Some((left, right)) = self.children() {
            left.visit(f);
            right.visit(f);
        }
    }

    pub(crate) fn set_bounds(&mut self, bounds: Aabb) {
        self.bounds = bounds;
    }

    pub(crate) fn set_leaf_count(&mut self, leaf_count: usize) {
        self.leaf_count = leaf_count;
    }

    pub(crate) fn children_mut(&mut self) -> Option<(&mut Self, &mut Self)> {
        match &mut self.kind {
            NodeKind::Leaf { .. } => None,
            NodeKind::Internal { left, right } => Some((&mut **left, &mut **right)),
        }
    }
}
