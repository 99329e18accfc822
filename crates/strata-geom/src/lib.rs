// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![doc = r"Geometry primitives for Strata.

This crate provides:
- A small `f32` vector type (`Vec3`).
- Axis-aligned bounding boxes (`Aabb`) with merge, volume, and overlap ratio.
- Split-axis selection (`Axis`).

Design notes:
- Validated at construction: an `Aabb` always satisfies `min <= max` on every
  axis with finite components. Malformed boxes are rejected with a
  [`GeomError`], never silently negated.
- Deterministic: no ambient RNG; axis ties resolve to the lowest axis.
- Float32 throughout, matching the frame data the hierarchy is built from.
"]

mod aabb;
mod axis;
mod error;
mod vec3;

pub use aabb::Aabb;
pub use axis::Axis;
pub use error::GeomError;
pub use vec3::Vec3;
