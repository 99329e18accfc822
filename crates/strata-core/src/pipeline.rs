// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Per-frame driver: tree maintenance, partitioning, and identity tracking.

use core::convert::Infallible;
use core::fmt;

use strata_geom::Aabb;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::builder::build;
use crate::config::PipelineConfig;
use crate::error::StrataError;
use crate::node::Node;
use crate::partition::Group;
use crate::refit::{update, RebuildReason, UpdateKind};
use crate::tracker::{DomainId, DomainTracker};

/// How the tree for a frame was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeUpdate {
    /// Fresh build: first frame, or first frame after an empty one.
    Built,
    /// Previous tree refit in place.
    Refit,
    /// Previous tree discarded and rebuilt.
    Rebuilt(RebuildReason),
    /// The frame had no objects; there is no tree.
    Empty,
}

impl fmt::Display for TreeUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Built => "built",
            Self::Refit => "refit",
            Self::Rebuilt(RebuildReason::SiblingOverlap) => "rebuilt:overlap",
            Self::Rebuilt(RebuildReason::ObjectCountChanged) => "rebuilt:count",
            Self::Empty => "empty",
        })
    }
}

/// Outcome of one [`FramePipeline::step`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameReport {
    /// Zero-based count of frames stepped before this one.
    pub frame: usize,
    /// Build, refit, rebuild, or empty.
    pub update: TreeUpdate,
    /// Nodes whose bounds changed during refit (0 for fresh builds).
    pub touched: usize,
    /// Groups in temporally stable order.
    pub groups: Vec<Group>,
    /// Identity of each group, parallel to `groups`.
    pub domain_ids: Vec<DomainId>,
}

/// Read-only view of a processed frame handed to a [`FrameSink`].
#[derive(Debug, Clone, Copy)]
pub struct FrameView<'a> {
    /// Index of the frame in its source.
    pub frame: usize,
    /// Timestamp reported by the source, if any.
    pub time: Option<f64>,
    /// Tree after the update; `None` for an empty frame.
    pub tree: Option<&'a Node>,
    /// What the pipeline did with the frame.
    pub report: &'a FrameReport,
}

impl FrameView<'_> {
    /// Stable-ordered groups of the frame.
    pub fn groups(&self) -> &[Group] {
        &self.report.groups
    }
}

/// Ordered supply of per-frame boxes. Object identity is list position.
pub trait FrameSource {
    /// Failure while producing a frame.
    type Error: std::error::Error + 'static;

    /// Number of frames available.
    fn frame_count(&self) -> usize;

    /// Boxes of frame `frame`, `0 <= frame < frame_count()`.
    fn frame_aabbs(&self, frame: usize) -> Result<Vec<Aabb>, Self::Error>;

    /// Timestamp of frame `frame`, when the source records one.
    fn frame_time(&self, _frame: usize) -> Option<f64> {
        None
    }
}

/// Consumer of processed frames.
pub trait FrameSink {
    /// Failure while consuming a frame.
    type Error: std::error::Error + 'static;

    /// Receives one processed frame.
    fn accept(&mut self, view: FrameView<'_>) -> Result<(), Self::Error>;
}

/// Collects the reports, dropping the trees.
impl FrameSink for Vec<FrameReport> {
    type Error = Infallible;

    fn accept(&mut self, view: FrameView<'_>) -> Result<(), Self::Error> {
        self.push(view.report.clone());
        Ok(())
    }
}

/// Failure of [`FramePipeline::run`], tagged with the source frame index.
#[derive(Debug, Error)]
pub enum RunError<S, K>
where
    S: std::error::Error + 'static,
    K: std::error::Error + 'static,
{
    /// The source could not produce the frame.
    #[error("frame {frame}: {source}")]
    Source {
        /// Frame index.
        frame: usize,
        /// Source failure.
        #[source]
        source: S,
    },
    /// The pipeline rejected the frame.
    #[error("frame {frame}: {source}")]
    Pipeline {
        /// Frame index.
        frame: usize,
        /// Pipeline failure.
        #[source]
        source: StrataError,
    },
    /// The sink rejected the frame.
    #[error("frame {frame}: {source}")]
    Sink {
        /// Frame index.
        frame: usize,
        /// Sink failure.
        #[source]
        source: K,
    },
}

/// Threads the previous frame's tree and groups through successive frames.
///
/// Frames must arrive in temporal order; the pipeline takes `&mut self` for
/// every step, so a single caller owns the sequence.
#[derive(Debug, Clone)]
pub struct FramePipeline {
    config: PipelineConfig,
    tree: Option<Node>,
    tracker: DomainTracker,
    frame: usize,
}

impl FramePipeline {
    /// Creates a pipeline with no history.
    ///
    /// # Errors
    /// Whatever [`PipelineConfig::validate`] rejects.
    pub fn new(config: PipelineConfig) -> Result<Self, StrataError> {
        config.validate()?;
        Ok(Self {
            config,
            tree: None,
            tracker: DomainTracker::new(),
            frame: 0,
        })
    }

    /// Active configuration.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Tree of the last processed frame.
    pub fn tree(&self) -> Option<&Node> {
        self.tree.as_ref()
    }

    /// Identity tracker state.
    pub fn tracker(&self) -> &DomainTracker {
        &self.tracker
    }

    /// Number of frames stepped so far.
    pub fn frames_processed(&self) -> usize {
        self.frame
    }

    /// Processes one frame.
    ///
    /// The first frame, and any frame after an empty one, is built from
    /// scratch; later frames go through [`update`] with the configured
    /// threshold. An empty frame drops the tree and resets the tracker.
    ///
    /// # Errors
    /// [`StrataError::IndexOutOfRange`] when `aabbs` holds fewer objects than
    /// the previous frame; pipeline state is unchanged in that case.
    #[instrument(level = "debug", skip(self, aabbs), fields(frame = self.frame, objects = aabbs.len()))]
    pub fn step(&mut self, aabbs: &[Aabb]) -> Result<FrameReport, StrataError> {
        let frame = self.frame;
        if aabbs.is_empty() {
            debug!("empty frame; dropping tree and domain history");
            self.frame += 1;
            self.tree = None;
            self.tracker.reset();
            return Ok(FrameReport {
                frame,
                update: TreeUpdate::Empty,
                touched: 0,
                groups: Vec::new(),
                domain_ids: Vec::new(),
            });
        }

        let (update_kind, touched) = if let Some(root) = self.tree.as_mut() {
            let report = update(root, aabbs, self.config.overlap_threshold)?;
            let kind = match report.kind {
                UpdateKind::Refit => TreeUpdate::Refit,
                UpdateKind::Rebuilt(reason) => TreeUpdate::Rebuilt(reason),
            };
            (kind, report.touched)
        } else {
            (TreeUpdate::Built, 0)
        };
        self.frame += 1;

        if update_kind == TreeUpdate::Built {
            self.tree = build(aabbs);
        }

        let groups = match &self.tree {
            Some(root) => self.config.strategy.apply(root, self.config.subdomains)?,
            None => Vec::new(),
        };
        let groups = self.tracker.match_groups(groups);
        let domain_ids = self.tracker.domain_ids();
        debug!(update = %update_kind, touched, groups = groups.len(), "frame processed");

        Ok(FrameReport {
            frame,
            update: update_kind,
            touched,
            groups,
            domain_ids,
        })
    }

    /// Feeds every frame of `source` through [`FramePipeline::step`] into
    /// `sink`, in order. Returns the number of frames processed.
    ///
    /// Stops at the first failure.
    pub fn run<Src, Snk>(
        &mut self,
        source: &Src,
        sink: &mut Snk,
    ) -> Result<usize, RunError<Src::Error, Snk::Error>>
    where
        Src: FrameSource + ?Sized,
        Snk: FrameSink + ?Sized,
    {
        let count = source.frame_count();
        for frame in 0..count {
            let aabbs = source
                .frame_aabbs(frame)
                .map_err(|source| RunError::Source { frame, source })?;
            let report = self
                .step(&aabbs)
                .map_err(|source| RunError::Pipeline { frame, source })?;
            let view = FrameView {
                frame,
                time: source.frame_time(frame),
                tree: self.tree.as_ref(),
                report: &report,
            };
            sink.accept(view)
                .map_err(|source| RunError::Sink { frame, source })?;
        }
        Ok(count)
    }
}
