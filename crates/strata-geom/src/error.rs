// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

use thiserror::Error;

use crate::Axis;

/// Errors raised while constructing geometry from caller-provided values.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum GeomError {
    /// The minimum corner exceeds the maximum corner on `axis`.
    #[error("invalid AABB: min {min} > max {max} on axis {axis}")]
    InvalidBounds {
        /// Offending axis.
        axis: Axis,
        /// Minimum-corner component on that axis.
        min: f32,
        /// Maximum-corner component on that axis.
        max: f32,
    },
    /// A component is NaN or infinite.
    #[error("invalid AABB: non-finite component on axis {axis}")]
    NonFinite {
        /// Offending axis.
        axis: Axis,
    },
}
