// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Temporal identity for subdomains.
//!
//! Partitioning a slightly different tree yields groups in an arbitrary order:
//! the cluster that was "domain 0" last frame may come back at position 3. The
//! tracker reorders each frame's groups so that position `i` is the group most
//! similar to the one that held identity `i` before, where similarity is the
//! size of the symmetric difference of object sets and the bijection minimizes
//! the total over all groups.
//!
//! When the group count changes between frames the smaller side is padded with
//! empty placeholder groups. Identities matched to a placeholder are retired;
//! real groups matched to a placeholder become new identities, appended after
//! the surviving ones in their input order.

use core::fmt;

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::assignment::{solve_assignment, CostMatrix};
use crate::partition::Group;

/// Stable identity of a subdomain across frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DomainId(u64);

impl DomainId {
    /// Wraps a raw id value.
    pub const fn from_raw(value: u64) -> Self {
        Self(value)
    }

    /// Raw id value.
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for DomainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "d{}", self.0)
    }
}

/// A group together with the identity it carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedDomain {
    /// Identity assigned when the domain first appeared.
    pub id: DomainId,
    /// Object indices currently in the domain.
    pub objects: Group,
}

/// Matches each frame's groups against the previous frame's ordering.
#[derive(Debug, Clone, Default)]
pub struct DomainTracker {
    previous: Option<Vec<TrackedDomain>>,
    next_id: u64,
    last_cost: u64,
}

impl DomainTracker {
    /// Creates a tracker with no history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reorders `new_groups` for temporal stability and remembers the result.
    ///
    /// The first call (and the first call after [`DomainTracker::reset`])
    /// adopts `new_groups` unchanged. Later calls solve a minimum-cost
    /// assignment between the previous ordering and `new_groups`; position
    /// `i` of the output holds the group matched to the identity previously
    /// at position `i` (after retiring identities that lost their group).
    pub fn match_groups(&mut self, new_groups: Vec<Group>) -> Vec<Group> {
        let ordered = match self.previous.take() {
            None => {
                self.last_cost = 0;
                new_groups
                    .into_iter()
                    .map(|objects| self.fresh(objects))
                    .collect()
            }
            Some(previous) => self.reorder(&previous, new_groups),
        };
        let groups = ordered.iter().map(|d| d.objects.clone()).collect();
        self.previous = Some(ordered);
        groups
    }

    fn reorder(&mut self, previous: &[TrackedDomain], new_groups: Vec<Group>) -> Vec<TrackedDomain> {
        let prev_sets: Vec<FxHashSet<usize>> =
            previous.iter().map(|d| d.objects.iter().copied().collect()).collect();
        let new_sets: Vec<FxHashSet<usize>> =
            new_groups.iter().map(|g| g.iter().copied().collect()).collect();

        if prev_sets.len() != new_sets.len() {
            warn!(
                previous = prev_sets.len(),
                current = new_sets.len(),
                "subdomain count changed; padding assignment with empty groups"
            );
        }

        let size = prev_sets.len().max(new_sets.len());
        let empty = FxHashSet::default();
        let matrix = CostMatrix::from_fn(size, |row, col| {
            let prev = prev_sets.get(row).unwrap_or(&empty);
            let new = new_sets.get(col).unwrap_or(&empty);
            symmetric_difference_len(prev, new)
        });
        let assignment = solve_assignment(&matrix);
        self.last_cost = assignment.total_cost();

        let mut slots: Vec<Option<Group>> = new_groups.into_iter().map(Some).collect();
        let mut ordered = Vec::with_capacity(slots.len());
        for (row, domain) in previous.iter().enumerate() {
            let matched = assignment
                .column_for(row)
                .and_then(|col| slots.get_mut(col))
                .and_then(Option::take);
            match matched {
                Some(objects) => ordered.push(TrackedDomain {
                    id: domain.id,
                    objects,
                }),
                None => debug!(id = %domain.id, "retired subdomain identity"),
            }
        }
        for objects in slots.into_iter().flatten() {
            let domain = self.fresh(objects);
            debug!(id = %domain.id, "new subdomain identity");
            ordered.push(domain);
        }

        debug!(groups = ordered.len(), cost = self.last_cost, "matched subdomains");
        ordered
    }

    fn fresh(&mut self, objects: Group) -> TrackedDomain {
        let id = DomainId(self.next_id);
        self.next_id += 1;
        TrackedDomain { id, objects }
    }

    /// Domains of the last match, in output order; empty before the first call.
    pub fn domains(&self) -> &[TrackedDomain] {
        self.previous.as_deref().unwrap_or_default()
    }

    /// Identities of the last match, in output order.
    pub fn domain_ids(&self) -> Vec<DomainId> {
        self.domains().iter().map(|d| d.id).collect()
    }

    /// Total symmetric-difference cost of the last match, including padded cells.
    pub fn total_cost(&self) -> u64 {
        self.last_cost
    }

    /// Returns `true` once a first frame has been recorded.
    pub fn is_primed(&self) -> bool {
        self.previous.is_some()
    }

    /// Forgets the stored ordering; the next call adopts its input unchanged.
    ///
    /// Identity values keep counting up so ids are never reused.
    pub fn reset(&mut self) {
        self.previous = None;
        self.last_cost = 0;
    }
}

fn symmetric_difference_len(a: &FxHashSet<usize>, b: &FxHashSet<usize>) -> u64 {
    a.symmetric_difference(b).count() as u64
}
