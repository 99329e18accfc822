// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![doc = r"Frame sources for the Strata pipeline.

Two implementations of [`strata_core::FrameSource`]:

- [`CsvFrameSource`]: a recording with one header line followed by one row
  per frame, `time, minx, miny, minz, maxx, maxy, maxz, ...` with six columns
  per object. Object `i` occupies columns `1 + 6i .. 7 + 6i`.
- [`VecFrameSource`]: frames held in memory, for tests and embedding.

Both validate every box on load, so a source that constructed successfully
only ever hands well-formed boxes to the pipeline."]

mod csv;
mod error;
mod memory;

pub use csv::{CsvFrameSource, COLUMNS_PER_OBJECT};
pub use error::FrameError;
pub use memory::VecFrameSource;
