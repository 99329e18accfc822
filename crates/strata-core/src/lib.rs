// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! strata-core: bounding-volume hierarchy over per-frame AABBs, split into
//! balanced spatial subdomains whose identities stay stable across frames.
//!
//! Per frame the data flows:
//! frame AABBs → [`build`] / [`update`] → [`Node`] tree →
//! [`greedy_split`] / [`balanced_split`] → groups → [`DomainTracker`] →
//! stable-ordered groups.
//!
//! [`FramePipeline`] threads the cross-frame state (previous tree, previous
//! groups) through that flow. Frames must be fed strictly in temporal order;
//! both the refit and the tracker depend on the preceding frame.
//!
//! Determinism: the builder sorts on quantized midpoints with a stable sort,
//! the greedy partitioner breaks leaf-count ties by insertion order, and the
//! assignment solver works on integer costs. Identical inputs produce
//! identical trees, groups, and orderings.

mod assignment;
mod builder;
pub mod config;
mod error;
mod node;
mod partition;
mod pipeline;
mod refit;
mod tracker;

pub use assignment::{solve_assignment, Assignment, CostMatrix};
pub use builder::{build, SORT_BIN_WIDTH};
pub use error::StrataError;
pub use node::Node;
pub use partition::{balanced_split, greedy_split, group_bounds, Group, PartitionStrategy};
pub use pipeline::{
    FramePipeline, FrameReport, FrameSink, FrameSource, FrameView, RunError, TreeUpdate,
};
pub use refit::{update, RebuildReason, UpdateKind, UpdateReport, DEFAULT_OVERLAP_THRESHOLD};
pub use tracker::{DomainId, DomainTracker, TrackedDomain};

/// Geometry types re-exported so downstream crates need a single dependency.
pub use strata_geom::{Aabb, Axis, GeomError, Vec3};
