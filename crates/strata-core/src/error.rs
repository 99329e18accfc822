// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Structural errors surfaced by the core algorithms.
//!
//! Geometry degeneracy (zero-volume boxes) and tracker group-count mismatches
//! are handled by documented fallbacks and never appear here.

use strata_geom::GeomError;
use thiserror::Error;

/// Errors emitted by hierarchy construction, refit, and partitioning.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StrataError {
    /// A caller-provided box is malformed (`min > max` or non-finite).
    #[error("invalid input: {0}")]
    InvalidInput(#[from] GeomError),
    /// A leaf references an object index absent from the supplied box list.
    #[error("object index {index} out of range for {len} boxes")]
    IndexOutOfRange {
        /// Offending object index.
        index: usize,
        /// Length of the supplied box list.
        len: usize,
    },
    /// The requested subdomain count is unusable for the chosen strategy.
    #[error("invalid subdomain count {count}: {reason}")]
    InvalidSubdomainCount {
        /// Requested count.
        count: usize,
        /// Why the count was rejected.
        reason: &'static str,
    },
    /// The sibling-overlap threshold is unusable (NaN, infinite, or a negative
    /// configured value).
    #[error("invalid overlap threshold {0}")]
    InvalidThreshold(f32),
}
