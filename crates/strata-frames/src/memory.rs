// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

use strata_core::{Aabb, FrameSource};

use crate::error::FrameError;

/// Frames held in memory, optionally timestamped.
#[derive(Debug, Clone, Default)]
pub struct VecFrameSource {
    frames: Vec<Vec<Aabb>>,
    times: Vec<Option<f64>>,
}

impl VecFrameSource {
    /// Untimed frames, in order.
    pub fn new(frames: Vec<Vec<Aabb>>) -> Self {
        let times = vec![None; frames.len()];
        Self { frames, times }
    }

    /// Appends an untimed frame.
    pub fn push(&mut self, aabbs: Vec<Aabb>) {
        self.frames.push(aabbs);
        self.times.push(None);
    }

    /// Appends a frame recorded at `time`.
    pub fn push_timed(&mut self, time: f64, aabbs: Vec<Aabb>) {
        self.frames.push(aabbs);
        self.times.push(Some(time));
    }

    /// Number of frames.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Returns `true` if no frames were added.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

impl FromIterator<Vec<Aabb>> for VecFrameSource {
    fn from_iter<I: IntoIterator<Item = Vec<Aabb>>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl FrameSource for VecFrameSource {
    type Error = FrameError;

    fn frame_count(&self) -> usize {
        self.frames.len()
    }

    fn frame_aabbs(&self, frame: usize) -> Result<Vec<Aabb>, FrameError> {
        self.frames
            .get(frame)
            .cloned()
            .ok_or(FrameError::FrameOutOfRange {
                frame,
                count: self.frames.len(),
            })
    }

    fn frame_time(&self, frame: usize) -> Option<f64> {
        self.times.get(frame).copied().flatten()
    }
}
