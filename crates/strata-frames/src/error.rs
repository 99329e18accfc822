// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

use std::path::PathBuf;

use strata_core::GeomError;
use thiserror::Error;

/// Errors raised while loading or indexing frames.
///
/// Line numbers are 1-based and count the header line.
#[derive(Debug, Error)]
pub enum FrameError {
    /// The recording could not be opened or read.
    #[error("failed to read {}: {source}", path.display())]
    Open {
        /// File that failed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// Reading from an in-memory or streamed reader failed.
    #[error("read error: {0}")]
    Read(#[from] std::io::Error),
    /// The first data row cannot be split into whole objects.
    #[error("line {line}: {columns} columns do not form whole objects (expected 1 + 6 * N)")]
    RaggedColumns {
        /// Line of the offending row.
        line: usize,
        /// Number of columns found.
        columns: usize,
    },
    /// A row has fewer columns than the object count requires.
    #[error("line {line}: expected at least {expected} columns, found {found}")]
    TooFewColumns {
        /// Line of the offending row.
        line: usize,
        /// Columns required.
        expected: usize,
        /// Columns present.
        found: usize,
    },
    /// A value is not a number.
    #[error("line {line}, column {column}: cannot parse {value:?} as a number")]
    Parse {
        /// Line of the offending row.
        line: usize,
        /// 1-based column.
        column: usize,
        /// Raw text.
        value: String,
    },
    /// An object's corners do not form a valid box.
    #[error("line {line}, object {object}: {source}")]
    InvalidBox {
        /// Line of the offending row.
        line: usize,
        /// Object index within the row.
        object: usize,
        /// Geometry validation failure.
        #[source]
        source: GeomError,
    },
    /// A frame index past the end of the source.
    #[error("frame {frame} out of range for {count} frames")]
    FrameOutOfRange {
        /// Requested frame.
        frame: usize,
        /// Frames available.
        count: usize,
    },
}
