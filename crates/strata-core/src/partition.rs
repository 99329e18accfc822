// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Subdomain partitioning: turning a hierarchy into groups of object indices.
//!
//! Both strategies cut the tree along existing subtrees, so every group is a
//! spatially coherent cluster and the groups of one call partition the full
//! leaf set exactly once.

use core::cmp::Ordering;
use std::collections::BinaryHeap;

use serde::{Deserialize, Serialize};
use strata_geom::Aabb;
use tracing::debug;

use crate::error::StrataError;
use crate::node::Node;

/// One partition cell: the object indices assigned to a subdomain.
pub type Group = Vec<usize>;

/// How a hierarchy is cut into subdomains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartitionStrategy {
    /// [`greedy_split`]: repeatedly split the largest subtree. Any count `>= 1`.
    #[default]
    Greedy,
    /// [`balanced_split`]: cut at a fixed depth. Power-of-two counts only.
    Balanced,
}

impl PartitionStrategy {
    /// Checks that `subdomains` is usable with this strategy.
    ///
    /// # Errors
    /// [`StrataError::InvalidSubdomainCount`] for zero, or for a non-power-of-two
    /// count with [`PartitionStrategy::Balanced`].
    pub fn validate(self, subdomains: usize) -> Result<(), StrataError> {
        match self {
            Self::Greedy if subdomains == 0 => Err(StrataError::InvalidSubdomainCount {
                count: subdomains,
                reason: "greedy split needs at least one subdomain",
            }),
            Self::Balanced if !subdomains.is_power_of_two() => {
                Err(StrataError::InvalidSubdomainCount {
                    count: subdomains,
                    reason: "balanced split needs a power of two",
                })
            }
            Self::Greedy | Self::Balanced => Ok(()),
        }
    }

    /// Partitions `root` into (at most) `subdomains` groups.
    ///
    /// # Errors
    /// Same as [`PartitionStrategy::validate`].
    pub fn apply(self, root: &Node, subdomains: usize) -> Result<Vec<Group>, StrataError> {
        match self {
            Self::Greedy => greedy_split(root, subdomains),
            Self::Balanced => balanced_split(root, subdomains),
        }
    }
}

/// Cuts the tree at depth `log2(subdomains)`.
///
/// Every subtree rooted at the target depth becomes one group. A leaf found
/// above the target depth forms its own group early, so unbalanced trees yield
/// fewer (and uneven) groups. A tree of depth `>= log2(subdomains)` built by
/// [`crate::build`] yields exactly `subdomains` groups.
///
/// # Errors
/// [`StrataError::InvalidSubdomainCount`] unless `subdomains` is a power of two.
pub fn balanced_split(root: &Node, subdomains: usize) -> Result<Vec<Group>, StrataError> {
    PartitionStrategy::Balanced.validate(subdomains)?;
    let target_depth = subdomains.trailing_zeros() as usize;
    let mut groups = Vec::with_capacity(subdomains);
    collect_at_depth(root, 0, target_depth, &mut groups);
    debug!(requested = subdomains, produced = groups.len(), "balanced split");
    Ok(groups)
}

fn collect_at_depth(node: &Node, depth: usize, target_depth: usize, groups: &mut Vec<Group>) {
    match node.children() {
        Some((left, right)) if depth < target_depth => {
            collect_at_depth(left, depth + 1, target_depth, groups);
            collect_at_depth(right, depth + 1, target_depth, groups);
        }
        _ => groups.push(node.leaf_indices()),
    }
}

/// Priority-queue entry. Ordered by leaf count, then by insertion order
/// (earlier wins); the subtree itself never takes part in comparisons.
struct Candidate<'a> {
    leaf_count: usize,
    seq: u64,
    node: &'a Node,
}

impl Ord for Candidate<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.leaf_count
            .cmp(&other.leaf_count)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for Candidate<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Candidate<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Candidate<'_> {}

/// Max-heap of candidates plus the monotonically increasing insertion counter.
struct SplitQueue<'a> {
    heap: BinaryHeap<Candidate<'a>>,
    seq: u64,
}

impl<'a> SplitQueue<'a> {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            heap: BinaryHeap::with_capacity(capacity),
            seq: 0,
        }
    }

    fn push(&mut self, node: &'a Node) {
        self.heap.push(Candidate {
            leaf_count: node.leaf_count(),
            seq: self.seq,
            node,
        });
        self.seq += 1;
    }
}

/// Repeatedly splits the subtree with the most leaves until `subdomains`
/// subtrees remain, then flattens each into a group.
///
/// Ties on leaf count go to the subtree queued first. When the largest
/// remaining subtree is a single leaf nothing more can be split and the loop
/// stops, so the result may hold fewer than `subdomains` groups. Groups are
/// returned largest first, ties in queue order.
///
/// # Errors
/// [`StrataError::InvalidSubdomainCount`] if `subdomains` is zero.
pub fn greedy_split(root: &Node, subdomains: usize) -> Result<Vec<Group>, StrataError> {
    PartitionStrategy::Greedy.validate(subdomains)?;

    let mut queue = SplitQueue::with_capacity(subdomains + 1);
    queue.push(root);

    while queue.heap.len() < subdomains {
        let Some(largest) = queue.heap.pop() else {
            break;
        };
        match largest.node.children() {
            Some((left, right)) => {
                queue.push(left);
                queue.push(right);
            }
            None => {
                queue.push(largest.node);
                break;
            }
        }
    }

    let groups: Vec<Group> = queue
        .heap
        .into_sorted_vec()
        .into_iter()
        .rev()
        .map(|candidate| candidate.node.leaf_indices())
        .collect();
    debug!(requested = subdomains, produced = groups.len(), "greedy split");
    Ok(groups)
}

/// Merged bounds of each group; `None` for an empty group.
///
/// # Errors
/// [`StrataError::IndexOutOfRange`] if a group names an object missing from `aabbs`.
pub fn group_bounds(aabbs: &[Aabb], groups: &[Group]) -> Result<Vec<Option<Aabb>>, StrataError> {
    let mut out = Vec::with_capacity(groups.len());
    for group in groups {
        let mut merged: Option<Aabb> = None;
        for &index in group {
            let bb = aabbs.get(index).ok_or(StrataError::IndexOutOfRange {
                index,
                len: aabbs.len(),
            })?;
            merged = Some(merged.map_or(*bb, |acc| acc.union(bb)));
        }
        out.push(merged);
    }
    Ok(out)
}
