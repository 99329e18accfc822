// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![allow(missing_docs)]
//! Temporal matching of groups across frames.

use strata_core::{DomainId, DomainTracker};

fn ids(values: &[u64]) -> Vec<DomainId> {
    values.iter().copied().map(DomainId::from_raw).collect()
}

#[test]
fn first_call_adopts_groups_unchanged() {
    let mut tracker = DomainTracker::new();
    assert!(!tracker.is_primed());
    assert!(tracker.domains().is_empty());

    let out = tracker.match_groups(vec![vec![1, 2], vec![3, 4]]);

    assert_eq!(out, vec![vec![1, 2], vec![3, 4]]);
    assert!(tracker.is_primed());
    assert_eq!(tracker.domain_ids(), ids(&[0, 1]));
    assert_eq!(tracker.total_cost(), 0);
}

#[test]
fn swapped_labels_are_corrected_at_zero_cost() {
    let mut tracker = DomainTracker::new();
    tracker.match_groups(vec![vec![1, 2], vec![3, 4]]);

    let out = tracker.match_groups(vec![vec![3, 4], vec![1, 2]]);

    assert_eq!(out, vec![vec![1, 2], vec![3, 4]]);
    assert_eq!(tracker.total_cost(), 0);
    assert_eq!(tracker.domain_ids(), ids(&[0, 1]));
}

#[test]
fn drifting_members_follow_the_closest_identity() {
    let mut tracker = DomainTracker::new();
    tracker.match_groups(vec![vec![0, 1, 2], vec![3, 4, 5]]);

    // Objects 2 and 5 trade domains and the partitioner emits them swapped.
    let out = tracker.match_groups(vec![vec![3, 4, 2], vec![0, 1, 5]]);

    assert_eq!(out, vec![vec![0, 1, 5], vec![3, 4, 2]]);
    assert_eq!(tracker.total_cost(), 4);
}

#[test]
fn extra_groups_become_new_identities() {
    let mut tracker = DomainTracker::new();
    tracker.match_groups(vec![vec![0, 1], vec![2, 3]]);

    let out = tracker.match_groups(vec![vec![2, 3], vec![4], vec![0, 1]]);

    assert_eq!(out, vec![vec![0, 1], vec![2, 3], vec![4]]);
    assert_eq!(tracker.domain_ids(), ids(&[0, 1, 2]));
    assert_eq!(tracker.total_cost(), 1);
}

#[test]
fn identities_without_a_group_are_retired() {
    let mut tracker = DomainTracker::new();
    tracker.match_groups(vec![vec![0, 1], vec![2, 3], vec![4]]);

    let out = tracker.match_groups(vec![vec![4, 2, 3], vec![0, 1]]);

    assert_eq!(out, vec![vec![0, 1], vec![4, 2, 3]]);
    assert_eq!(tracker.domain_ids(), ids(&[0, 1]));
    assert_eq!(tracker.total_cost(), 2);

    let out = tracker.match_groups(Vec::new());
    assert!(out.is_empty());
    assert!(tracker.domains().is_empty());
}

#[test]
fn reset_forgets_history_but_never_reuses_ids() {
    let mut tracker = DomainTracker::new();
    tracker.match_groups(vec![vec![0], vec![1]]);
    tracker.reset();
    assert!(!tracker.is_primed());

    let out = tracker.match_groups(vec![vec![1], vec![0]]);

    assert_eq!(out, vec![vec![1], vec![0]]);
    assert_eq!(tracker.domain_ids(), ids(&[2, 3]));
}

#[test]
fn domains_pair_ids_with_members() {
    let mut tracker = DomainTracker::new();
    tracker.match_groups(vec![vec![5, 6]]);
    let domain = &tracker.domains()[0];
    assert_eq!(domain.id.value(), 0);
    assert_eq!(domain.objects, vec![5, 6]);
    assert_eq!(domain.id.to_string(), "d0");
}
