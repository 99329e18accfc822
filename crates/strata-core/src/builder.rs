// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Top-down median-split hierarchy construction.
//!
//! Each internal node splits its items along the longest axis of their
//! combined bounds, ordered by box midpoint quantized to [`SORT_BIN_WIDTH`].
//! Quantization absorbs floating jitter so near-identical configurations
//! produce identical orderings; the sort is stable, so items in the same bin
//! keep their incoming relative order.
//!
//! Every level re-sorts its slice, so construction costs `O(n log² n)`. This is
//! not a surface-area-heuristic builder and makes no attempt to minimize
//! traversal cost.

use strata_geom::Aabb;
use tracing::debug;

use crate::node::Node;

/// Width of the midpoint bins used to order items before splitting.
pub const SORT_BIN_WIDTH: f32 = 0.1;

/// Builds a hierarchy over `aabbs`; object `i` is the box at position `i`.
///
/// Returns `None` for an empty slice and a single leaf for one box. The split
/// index is `n / 2`, clamped to `[1, n - 1]` so neither half is empty.
pub fn build(aabbs: &[Aabb]) -> Option<Node> {
    let mut items: Vec<(usize, Aabb)> = aabbs.iter().copied().enumerate().collect();
    let root = build_slice(&mut items)?;
    debug!(objects = aabbs.len(), depth = root.depth(), "built hierarchy");
    Some(root)
}

fn build_slice(items: &mut [(usize, Aabb)]) -> Option<Node> {
    let combined = Aabb::union_all(items.iter().map(|(_, bb)| bb))?;
    if let [(object, bounds)] = *items {
        return Some(Node::leaf(object, bounds));
    }

    let axis = combined.longest_axis();
    items.sort_by_key(|(_, bb)| sort_bin(bb.midpoint(axis)));

    let split = (items.len() / 2).clamp(1, items.len() - 1);
    let (left, right) = items.split_at_mut(split);
    Some(Node::internal(build_slice(left)?, build_slice(right)?))
}

/// Quantized midpoint: the index of the nearest multiple of [`SORT_BIN_WIDTH`].
///
/// Comparing integer bins keeps the ordering exact; half-way values round to
/// the even bin.
// Finite by `Aabb` construction; `as` saturates for extreme magnitudes.
#[allow(clippy::cast_possible_truncation)]
fn sort_bin(midpoint: f32) -> i64 {
    (midpoint / SORT_BIN_WIDTH).round_ties_even() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bins_absorb_sub_bin_jitter() {
        assert_eq!(sort_bin(1.0), sort_bin(1.0 + 1e-4));
        assert_eq!(sort_bin(0.31), 3);
        assert_eq!(sort_bin(-0.26), -3);
        assert!(sort_bin(0.5) < sort_bin(0.6));
    }
}
