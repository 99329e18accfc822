// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![allow(missing_docs)]
#![allow(clippy::unwrap_used, clippy::float_cmp)]
//! Incremental refit and the rebuild fallback.

mod common;
use common::{assert_consistent, cube, row, sorted_leaves};
use strata_core::{
    build, update, RebuildReason, StrataError, UpdateKind, DEFAULT_OVERLAP_THRESHOLD,
};

#[test]
fn unchanged_boxes_are_idempotent() {
    let boxes = row(9);
    let mut root = build(&boxes).unwrap();
    let before = root.clone();

    let first = update(&mut root, &boxes, DEFAULT_OVERLAP_THRESHOLD).unwrap();
    assert_eq!(first.kind, UpdateKind::Refit);
    assert_eq!(first.touched, 0);
    assert_eq!(root, before);

    let second = update(&mut root, &boxes, DEFAULT_OVERLAP_THRESHOLD).unwrap();
    assert_eq!(second, first);
    assert_eq!(root, before);
}

#[test]
fn small_motion_refits_without_changing_topology() {
    let mut boxes = row(8);
    let mut root = build(&boxes).unwrap();
    let before = root.clone();

    boxes[3] = cube(6.2, 0.3, 0.0);
    let report = update(&mut root, &boxes, DEFAULT_OVERLAP_THRESHOLD).unwrap();

    assert_eq!(report.kind, UpdateKind::Refit);
    assert!(root.same_topology(&before));
    assert_ne!(root.bounds(), before.bounds());
    // leaf 3, its parent, grandparent, and the root
    assert_eq!(report.touched, 4);
    assert_consistent(&root);
}

#[test]
fn heavy_sibling_overlap_triggers_rebuild() {
    let mut root = build(&[cube(0.0, 0.0, 0.0), cube(2.0, 0.0, 0.0), cube(10.0, 0.0, 0.0), cube(12.0, 0.0, 0.0)]).unwrap();
    // Objects 0 and 2 trade places: the halves {0,1} and {2,3} now interleave.
    let moved = [cube(10.0, 0.0, 0.0), cube(2.0, 0.0, 0.0), cube(0.0, 0.0, 0.0), cube(12.0, 0.0, 0.0)];

    let report = update(&mut root, &moved, DEFAULT_OVERLAP_THRESHOLD).unwrap();

    assert_eq!(report.kind, UpdateKind::Rebuilt(RebuildReason::SiblingOverlap));
    assert_eq!(report.max_overlap, 1.0);
    assert_eq!(root, build(&moved).unwrap());
    assert_eq!(root.left().unwrap().leaf_indices(), vec![2, 1]);
}

#[test]
fn overlap_equal_to_threshold_keeps_refit() {
    let mut root = build(&[cube(0.0, 0.0, 0.0), cube(2.0, 0.0, 0.0), cube(10.0, 0.0, 0.0), cube(12.0, 0.0, 0.0)]).unwrap();
    let moved = [cube(10.0, 0.0, 0.0), cube(2.0, 0.0, 0.0), cube(0.0, 0.0, 0.0), cube(12.0, 0.0, 0.0)];

    let report = update(&mut root, &moved, 1.0).unwrap();

    assert_eq!(report.kind, UpdateKind::Refit);
    assert_eq!(root.left().unwrap().leaf_indices(), vec![0, 1]);
    assert_consistent(&root);
}

#[test]
fn more_objects_than_leaves_rebuilds() {
    let mut root = build(&row(4)).unwrap();
    let grown = row(6);

    let report = update(&mut root, &grown, DEFAULT_OVERLAP_THRESHOLD).unwrap();

    assert_eq!(report.kind, UpdateKind::Rebuilt(RebuildReason::ObjectCountChanged));
    assert_eq!(root.leaf_count(), 6);
    assert_eq!(sorted_leaves(&root), (0..6).collect::<Vec<_>>());
}

#[test]
fn missing_object_is_index_out_of_range_and_leaves_tree_untouched() {
    let mut root = build(&row(4)).unwrap();
    let before = root.clone();
    let mut shrunk = row(3);
    shrunk[0] = cube(-5.0, 0.0, 0.0);

    let err = update(&mut root, &shrunk, DEFAULT_OVERLAP_THRESHOLD).unwrap_err();

    assert_eq!(err, StrataError::IndexOutOfRange { index: 3, len: 3 });
    assert_eq!(root, before);
}

#[test]
fn non_finite_threshold_is_rejected() {
    let boxes = row(2);
    let mut root = build(&boxes).unwrap();
    let err = update(&mut root, &boxes, f32::NAN).unwrap_err();
    assert!(matches!(err, StrataError::InvalidThreshold(t) if t.is_nan()));
}

#[test]
fn single_leaf_refits() {
    let mut root = build(&[cube(0.0, 0.0, 0.0)]).unwrap();
    let moved = [cube(4.0, 4.0, 4.0)];
    let report = update(&mut root, &moved, DEFAULT_OVERLAP_THRESHOLD).unwrap();
    assert_eq!(report.kind, UpdateKind::Refit);
    assert_eq!(report.touched, 1);
    assert_eq!(root.bounds(), moved[0]);
}

#[test]
fn two_object_rebuild_may_keep_its_shape() {
    let mut root = build(&[cube(0.0, 0.0, 0.0), cube(5.0, 0.0, 0.0)]).unwrap();
    let before = root.clone();
    let moved = [cube(0.0, 0.0, 0.0), cube(0.5, 0.0, 0.0)];

    let report = update(&mut root, &moved, DEFAULT_OVERLAP_THRESHOLD).unwrap();

    assert_eq!(report.kind, UpdateKind::Rebuilt(RebuildReason::SiblingOverlap));
    assert_eq!(report.max_overlap, 0.5);
    assert_eq!(root, build(&moved).unwrap());
    // Two leaves admit only one shape, so the rebuild reproduces it.
    assert!(root.same_topology(&before));
    assert_consistent(&root);
}
