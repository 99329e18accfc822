// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Incremental maintenance: refit in place, rebuild when siblings drift apart.
//!
//! Refit keeps the object-to-leaf assignment and the tree shape, which makes a
//! frame roughly linear in object count. Shape was chosen for the geometry of
//! an earlier frame, though, and as objects move the two halves of a split can
//! come to overlap heavily. Once any sibling pair overlaps by more than the
//! caller's threshold the refit tree is discarded and rebuilt from scratch.

use strata_geom::Aabb;
use tracing::{debug, trace};

use crate::builder::build;
use crate::error::StrataError;
use crate::node::Node;

/// Sibling overlap ratio above which a refit tree is rebuilt.
pub const DEFAULT_OVERLAP_THRESHOLD: f32 = 0.3;

/// Why [`update`] replaced the tree instead of keeping the refit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RebuildReason {
    /// Some sibling pair overlapped by more than the threshold after refit.
    SiblingOverlap,
    /// The box list holds more objects than the tree has leaves.
    ObjectCountChanged,
}

/// What [`update`] did to the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateKind {
    /// Bounds were refit; topology is unchanged.
    Refit,
    /// The tree was replaced by a fresh build (new topology).
    Rebuilt(RebuildReason),
}

/// Summary of a single [`update`] call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UpdateReport {
    /// Refit or rebuild.
    pub kind: UpdateKind,
    /// Nodes whose bounds changed or that sit above a changed node.
    pub touched: usize,
    /// Largest sibling overlap ratio seen after refit.
    pub max_overlap: f32,
}

/// Refits `root` to `aabbs`, rebuilding it when sibling overlap exceeds `threshold`.
///
/// Phases:
/// 1. leaf sync: every leaf takes `aabbs[object_index]`;
/// 2. bottom-up refit: every internal node becomes the union of its children
///    (phases 1 and 2 share one post-order walk);
/// 3. overlap check: every internal node must satisfy
///    `left.overlap_ratio(right) <= threshold`, otherwise `*root` is replaced by
///    [`build`]`(aabbs)`.
///
/// # Errors
/// - [`StrataError::InvalidThreshold`] if `threshold` is NaN or infinite.
/// - [`StrataError::IndexOutOfRange`] if a leaf references an object missing
///   from `aabbs`. Indices are validated before any mutation, so `root` is left
///   exactly as it was.
pub fn update(root: &mut Node, aabbs: &[Aabb], threshold: f32) -> Result<UpdateReport, StrataError> {
    if !threshold.is_finite() {
        return Err(StrataError::InvalidThreshold(threshold));
    }
    if let Some(index) = max_object_index(root) {
        if index >= aabbs.len() {
            return Err(StrataError::IndexOutOfRange {
                index,
                len: aabbs.len(),
            });
        }
    }

    if aabbs.len() > root.leaf_count() {
        debug!(
            leaves = root.leaf_count(),
            objects = aabbs.len(),
            "object set grew; rebuilding hierarchy"
        );
        return Ok(rebuild(root, aabbs, RebuildReason::ObjectCountChanged, 0, 0.0));
    }

    let mut touched = 0;
    refit_subtree(root, aabbs, &mut touched);
    let max_overlap = max_sibling_overlap(root);

    if max_overlap > threshold {
        debug!(max_overlap, threshold, touched, "sibling overlap exceeded; rebuilding hierarchy");
        return Ok(rebuild(root, aabbs, RebuildReason::SiblingOverlap, touched, max_overlap));
    }

    trace!(touched, max_overlap, "refit hierarchy");
    Ok(UpdateReport {
        kind: UpdateKind::Refit,
        touched,
        max_overlap,
    })
}

fn rebuild(
    root: &mut Node,
    aabbs: &[Aabb],
    reason: RebuildReason,
    touched: usize,
    max_overlap: f32,
) -> UpdateReport {
    // `aabbs` is non-empty here: the root holds at least one leaf whose index
    // was validated against it.
    if let Some(fresh) = build(aabbs) {
        *root = fresh;
    }
    UpdateReport {
        kind: UpdateKind::Rebuilt(reason),
        touched,
        max_overlap,
    }
}

fn max_object_index(node: &Node) -> Option<usize> {
    match node.children() {
        None => node.object_index(),
        Some((left, right)) => max_object_index(left).max(max_object_index(right)),
    }
}

/// Post-order sync and refit. Returns whether `node` was touched.
fn refit_subtree(node: &mut Node, aabbs: &[Aabb], touched: &mut usize) -> bool {
    let (bounds, leaf_count, children_touched) = if let Some(object) = node.object_index() {
        // Indices were validated by `update` before the walk started.
        let Some(bounds) = aabbs.get(object).copied() else {
            return false;
        };
        (bounds, 1, false)
    } else if let Some((left, right)) = node.children_mut() {
        let left_touched = refit_subtree(left, aabbs, touched);
        let right_touched = refit_subtree(right, aabbs, touched);
        (
            left.bounds().union(&right.bounds()),
            left.leaf_count() + right.leaf_count(),
            left_touched || right_touched,
        )
    } else {
        return false;
    };

    let changed = bounds != node.bounds();
    node.set_bounds(bounds);
    node.set_leaf_count(leaf_count);
    if changed || children_touched {
        *touched += 1;
    }
    changed || children_touched
}

fn max_sibling_overlap(node: &Node) -> f32 {
    match node.children() {
        None => 0.0,
        Some((left, right)) => left
            .bounds()
            .overlap_ratio(&right.bounds())
            .max(max_sibling_overlap(left))
            .max(max_sibling_overlap(right)),
    }
}
