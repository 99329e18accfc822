// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

use crate::{Axis, GeomError, Vec3};

/// Axis-aligned bounding box in world coordinates.
///
/// Invariants:
/// - `min` components are less than or equal to `max` components.
/// - All components are finite `f32` values.
///
/// Both are checked by [`Aabb::new`]; no other constructor can produce a box
/// that violates them.
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "RawAabb"))]
pub struct Aabb {
    min: Vec3,
    max: Vec3,
}

impl Aabb {
    /// Constructs an AABB from its minimum and maximum corners.
    ///
    /// # Errors
    /// Returns [`GeomError::NonFinite`] if any component is NaN or infinite and
    /// [`GeomError::InvalidBounds`] if `min` exceeds `max` on any axis.
    pub fn new(min: Vec3, max: Vec3) -> Result<Self, GeomError> {
        for axis in Axis::ALL {
            let (lo, hi) = (min[axis], max[axis]);
            if !lo.is_finite() || !hi.is_finite() {
                return Err(GeomError::NonFinite { axis });
            }
            if lo > hi {
                return Err(GeomError::InvalidBounds { axis, min: lo, max: hi });
            }
        }
        Ok(Self { min, max })
    }

    /// Constructs an AABB from raw corner arrays.
    ///
    /// # Errors
    /// Same as [`Aabb::new`].
    pub fn from_arrays(min: [f32; 3], max: [f32; 3]) -> Result<Self, GeomError> {
        Self::new(Vec3::from(min), Vec3::from(max))
    }

    /// Returns the minimum corner.
    pub const fn min(&self) -> Vec3 {
        self.min
    }

    /// Returns the maximum corner.
    pub const fn max(&self) -> Vec3 {
        self.max
    }

    /// Per-axis side lengths.
    pub fn extent(&self) -> Vec3 {
        self.max.sub(self.min)
    }

    /// Center point.
    pub fn center(&self) -> Vec3 {
        self.min.add(self.max).scale(0.5)
    }

    /// Midpoint coordinate along a single axis.
    pub fn midpoint(&self, axis: Axis) -> f32 {
        (self.min[axis] + self.max[axis]) / 2.0
    }

    /// Product of the per-axis extents. Zero for flat or point boxes.
    pub fn volume(&self) -> f32 {
        self.extent().product()
    }

    /// Axis with the largest extent. Ties resolve to the lowest axis (x, then y, then z).
    pub fn longest_axis(&self) -> Axis {
        let extent = self.extent();
        let mut best = Axis::X;
        for axis in [Axis::Y, Axis::Z] {
            if extent[axis] > extent[best] {
                best = axis;
            }
        }
        best
    }

    /// Returns the union of two AABBs (componentwise min of mins, max of maxes).
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Union of every box in `boxes`, or `None` when the iterator is empty.
    pub fn union_all<'a>(boxes: impl IntoIterator<Item = &'a Self>) -> Option<Self> {
        boxes
            .into_iter()
            .fold(None, |acc: Option<Self>, bb| Some(acc.map_or(*bb, |acc| acc.union(bb))))
    }

    /// Volume of the componentwise intersection; each axis is clamped at zero
    /// before multiplying, so disjoint boxes yield `0.0`.
    pub fn intersection_volume(&self, other: &Self) -> f32 {
        let lo = self.min.max(other.min);
        let hi = self.max.min(other.max);
        Axis::ALL
            .into_iter()
            .map(|axis| (hi[axis] - lo[axis]).max(0.0))
            .product()
    }

    /// Intersection volume divided by the smaller of the two volumes.
    ///
    /// Degenerate geometry is not an error: if either box has zero volume the
    /// ratio is `0.0`.
    pub fn overlap_ratio(&self, other: &Self) -> f32 {
        let smaller = self.volume().min(other.volume());
        if smaller <= 0.0 {
            return 0.0;
        }
        self.intersection_volume(other) / smaller
    }
}

#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct RawAabb {
    min: Vec3,
    max: Vec3,
}

#[cfg(feature = "serde")]
impl TryFrom<RawAabb> for Aabb {
    type Error = GeomError;

    fn try_from(raw: RawAabb) -> Result<Self, Self::Error> {
        Self::new(raw.min, raw.max)
    }
}
