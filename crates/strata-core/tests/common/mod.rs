// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![allow(dead_code)]
#![allow(clippy::unwrap_used, clippy::cast_precision_loss)]

use strata_core::{Aabb, Group, Node};

pub fn bb(min: [f32; 3], max: [f32; 3]) -> Aabb {
    Aabb::from_arrays(min, max).unwrap()
}

/// Unit cube with its minimum corner at `(x, y, z)`.
pub fn cube(x: f32, y: f32, z: f32) -> Aabb {
    bb([x, y, z], [x + 1.0, y + 1.0, z + 1.0])
}

/// `n` unit cubes along x, two units apart.
pub fn row(n: usize) -> Vec<Aabb> {
    (0..n).map(|i| cube(2.0 * i as f32, 0.0, 0.0)).collect()
}

/// Every internal node's bounds equal the union of its children's, and leaf
/// counts add up.
pub fn assert_consistent(node: &Node) {
    node.visit(&mut |n| {
        if let Some((left, right)) = n.children() {
            assert_eq!(n.bounds(), left.bounds().union(&right.bounds()));
            assert_eq!(n.leaf_count(), left.leaf_count() + right.leaf_count());
        } else {
            assert_eq!(n.leaf_count(), 1);
        }
    });
}

pub fn sorted_leaves(node: &Node) -> Vec<usize> {
    let mut out = node.leaf_indices();
    out.sort_unstable();
    out
}

/// All indices across `groups`, sorted; duplicates survive so callers can
/// detect overlap between groups.
pub fn flatten_sorted(groups: &[Group]) -> Vec<usize> {
    let mut out: Vec<usize> = groups.iter().flatten().copied().collect();
    out.sort_unstable();
    out
}
