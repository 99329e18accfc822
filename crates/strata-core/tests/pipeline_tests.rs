// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![allow(missing_docs)]
#![allow(clippy::unwrap_used, clippy::cast_precision_loss)]
//! Frame-by-frame driver: build, refit, rebuild, empty frames, and `run`.

mod common;
use std::convert::Infallible;

use common::{cube, flatten_sorted, row};
use strata_core::config::PipelineConfig;
use strata_core::{
    Aabb, DomainId, FramePipeline, FrameReport, FrameSource, PartitionStrategy, RebuildReason,
    RunError, StrataError, TreeUpdate,
};

fn greedy(subdomains: usize) -> FramePipeline {
    FramePipeline::new(PipelineConfig {
        subdomains,
        ..PipelineConfig::default()
    })
    .unwrap()
}

fn two_clusters() -> Vec<Aabb> {
    vec![cube(0.0, 0.0, 0.0), cube(2.0, 0.0, 0.0), cube(10.0, 0.0, 0.0), cube(12.0, 0.0, 0.0)]
}

fn interleaved() -> Vec<Aabb> {
    vec![cube(10.0, 0.0, 0.0), cube(2.0, 0.0, 0.0), cube(0.0, 0.0, 0.0), cube(12.0, 0.0, 0.0)]
}

struct Frames(Vec<Vec<Aabb>>);

impl FrameSource for Frames {
    type Error = Infallible;

    fn frame_count(&self) -> usize {
        self.0.len()
    }

    fn frame_aabbs(&self, frame: usize) -> Result<Vec<Aabb>, Self::Error> {
        Ok(self.0[frame].clone())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("frame {0} unavailable")]
struct Unavailable(usize);

struct FailsAt(usize);

impl FrameSource for FailsAt {
    type Error = Unavailable;

    fn frame_count(&self) -> usize {
        self.0 + 2
    }

    fn frame_aabbs(&self, frame: usize) -> Result<Vec<Aabb>, Self::Error> {
        if frame == self.0 {
            Err(Unavailable(frame))
        } else {
            Ok(row(4))
        }
    }

    fn frame_time(&self, frame: usize) -> Option<f64> {
        Some(frame as f64 * 0.5)
    }
}

#[test]
fn first_frame_builds_then_refits() {
    let mut pipeline = greedy(4);
    let boxes = row(8);

    let first = pipeline.step(&boxes).unwrap();
    assert_eq!(first.frame, 0);
    assert_eq!(first.update, TreeUpdate::Built);
    assert_eq!(first.groups, vec![vec![0, 1], vec![2, 3], vec![4, 5], vec![6, 7]]);
    assert_eq!(first.domain_ids.len(), 4);

    let second = pipeline.step(&boxes).unwrap();
    assert_eq!(second.frame, 1);
    assert_eq!(second.update, TreeUpdate::Refit);
    assert_eq!(second.touched, 0);
    assert_eq!(second.groups, first.groups);
    assert_eq!(second.domain_ids, first.domain_ids);
    assert_eq!(pipeline.frames_processed(), 2);
    assert_eq!(pipeline.tree().map(|t| t.leaf_count()), Some(8));
}

#[test]
fn interleaving_motion_rebuilds_and_keeps_identities() {
    let mut pipeline = greedy(2);
    let first = pipeline.step(&two_clusters()).unwrap();
    assert_eq!(first.groups, vec![vec![0, 1], vec![2, 3]]);

    let second = pipeline.step(&interleaved()).unwrap();

    assert_eq!(second.update, TreeUpdate::Rebuilt(RebuildReason::SiblingOverlap));
    assert_eq!(flatten_sorted(&second.groups), vec![0, 1, 2, 3]);
    let mut ids = second.domain_ids.clone();
    ids.sort();
    assert_eq!(ids, vec![DomainId::from_raw(0), DomainId::from_raw(1)]);
}

#[test]
fn empty_frame_drops_tree_and_history() {
    let mut pipeline = greedy(2);
    pipeline.step(&row(4)).unwrap();

    let empty = pipeline.step(&[]).unwrap();
    assert_eq!(empty.update, TreeUpdate::Empty);
    assert!(empty.groups.is_empty());
    assert!(pipeline.tree().is_none());
    assert!(!pipeline.tracker().is_primed());

    let again = pipeline.step(&row(4)).unwrap();
    assert_eq!(again.update, TreeUpdate::Built);
    assert_eq!(again.domain_ids, vec![DomainId::from_raw(2), DomainId::from_raw(3)]);
}

#[test]
fn growing_object_set_rebuilds() {
    let mut pipeline = greedy(2);
    pipeline.step(&row(4)).unwrap();
    let report = pipeline.step(&row(6)).unwrap();
    assert_eq!(report.update, TreeUpdate::Rebuilt(RebuildReason::ObjectCountChanged));
    assert_eq!(flatten_sorted(&report.groups), (0..6).collect::<Vec<_>>());
}

#[test]
fn shrinking_object_set_is_rejected_without_side_effects() {
    let mut pipeline = greedy(2);
    pipeline.step(&row(4)).unwrap();
    let before = pipeline.tree().cloned();

    let err = pipeline.step(&row(3)).unwrap_err();

    assert_eq!(err, StrataError::IndexOutOfRange { index: 3, len: 3 });
    assert_eq!(pipeline.frames_processed(), 1);
    assert_eq!(pipeline.tree().cloned(), before);
}

#[test]
fn invalid_config_is_rejected_up_front() {
    let config = PipelineConfig {
        subdomains: 3,
        strategy: PartitionStrategy::Balanced,
        ..PipelineConfig::default()
    };
    assert!(matches!(
        FramePipeline::new(config),
        Err(StrataError::InvalidSubdomainCount { count: 3, .. })
    ));
}

#[test]
fn run_feeds_every_frame_in_order() {
    let source = Frames(vec![row(8), row(8), Vec::new(), row(8)]);
    let mut reports: Vec<FrameReport> = Vec::new();
    let mut pipeline = greedy(4);

    let processed = pipeline.run(&source, &mut reports).unwrap();

    assert_eq!(processed, 4);
    let updates: Vec<TreeUpdate> = reports.iter().map(|r| r.update).collect();
    assert_eq!(
        updates,
        vec![TreeUpdate::Built, TreeUpdate::Refit, TreeUpdate::Empty, TreeUpdate::Built]
    );
}

#[test]
fn run_stops_at_the_first_source_error() {
    let mut reports: Vec<FrameReport> = Vec::new();
    let mut pipeline = greedy(2);

    let err = pipeline.run(&FailsAt(1), &mut reports).unwrap_err();

    assert!(matches!(err, RunError::Source { frame: 1, source: Unavailable(1) }));
    assert_eq!(err.to_string(), "frame 1: frame 1 unavailable");
    assert_eq!(reports.len(), 1);
}
