// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! CSV recordings of per-object boxes.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use strata_core::{Aabb, FrameSource};
use tracing::debug;

use crate::error::FrameError;

/// Columns occupied by one object: min corner then max corner.
pub const COLUMNS_PER_OBJECT: usize = 6;

#[derive(Debug, Clone)]
struct Frame {
    time: f64,
    aabbs: Vec<Aabb>,
}

/// Frames loaded eagerly from a CSV recording.
///
/// The first line is a header and is skipped whatever it contains. Every
/// following non-blank line is one frame. Trailing empty cells (a dangling
/// comma) are dropped before the row is read, and columns past the last
/// object are ignored.
#[derive(Debug, Clone, Default)]
pub struct CsvFrameSource {
    frames: Vec<Frame>,
    objects: usize,
}

impl CsvFrameSource {
    /// Loads the recording at `path`.
    ///
    /// With `objects` unset the count is inferred from the first data row.
    pub fn from_path(path: impl AsRef<Path>, objects: Option<usize>) -> Result<Self, FrameError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| FrameError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(BufReader::new(file), objects)
    }

    /// Parses a recording held in memory.
    pub fn parse(text: &str, objects: Option<usize>) -> Result<Self, FrameError> {
        Self::from_reader(text.as_bytes(), objects)
    }

    /// Parses a recording from any buffered reader.
    pub fn from_reader(reader: impl BufRead, objects: Option<usize>) -> Result<Self, FrameError> {
        let mut objects = objects;
        let mut frames = Vec::new();

        for (index, line) in reader.lines().enumerate() {
            let line_no = index + 1;
            let line = line?;
            if line_no == 1 || line.trim().is_empty() {
                continue;
            }
            let fields = split_fields(&line);
            let count = match objects {
                Some(count) => count,
                None => {
                    let inferred = infer_object_count(line_no, fields.len())?;
                    objects = Some(inferred);
                    inferred
                }
            };
            frames.push(parse_row(line_no, &fields, count)?);
        }

        let objects = objects.unwrap_or(0);
        debug!(frames = frames.len(), objects, "loaded csv frames");
        Ok(Self { frames, objects })
    }

    /// Objects per frame.
    pub fn object_count(&self) -> usize {
        self.objects
    }

    /// Number of frames.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Returns `true` if the recording holds no frames.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Earliest and latest timestamps, or `None` without frames.
    pub fn time_range(&self) -> Option<(f64, f64)> {
        let mut times = self.frames.iter().map(|f| f.time);
        let first = times.next()?;
        Some(times.fold((first, first), |(lo, hi), t| (lo.min(t), hi.max(t))))
    }
}

impl FrameSource for CsvFrameSource {
    type Error = FrameError;

    fn frame_count(&self) -> usize {
        self.frames.len()
    }

    fn frame_aabbs(&self, frame: usize) -> Result<Vec<Aabb>, FrameError> {
        self.frames
            .get(frame)
            .map(|f| f.aabbs.clone())
            .ok_or(FrameError::FrameOutOfRange {
                frame,
                count: self.frames.len(),
            })
    }

    fn frame_time(&self, frame: usize) -> Option<f64> {
        self.frames.get(frame).map(|f| f.time)
    }
}

fn split_fields(line: &str) -> Vec<&str> {
    let mut fields: Vec<&str> = line.split(',').map(str::trim).collect();
    while fields.last().is_some_and(|f| f.is_empty()) {
        fields.pop();
    }
    fields
}

fn infer_object_count(line: usize, columns: usize) -> Result<usize, FrameError> {
    let payload = columns.saturating_sub(1);
    if columns == 0 || payload % COLUMNS_PER_OBJECT != 0 {
        return Err(FrameError::RaggedColumns { line, columns });
    }
    Ok(payload / COLUMNS_PER_OBJECT)
}

fn parse_row(line: usize, fields: &[&str], objects: usize) -> Result<Frame, FrameError> {
    let expected = 1 + objects * COLUMNS_PER_OBJECT;
    if fields.len() < expected {
        return Err(FrameError::TooFewColumns {
            line,
            expected,
            found: fields.len(),
        });
    }

    let time = parse_number::<f64>(line, 0, fields[0])?;
    let mut aabbs = Vec::with_capacity(objects);
    for object in 0..objects {
        let base = 1 + object * COLUMNS_PER_OBJECT;
        let mut values = [0.0_f32; COLUMNS_PER_OBJECT];
        for (offset, value) in values.iter_mut().enumerate() {
            let column = base + offset;
            *value = parse_number(line, column, fields[column])?;
        }
        let [x0, y0, z0, x1, y1, z1] = values;
        let bb = Aabb::from_arrays([x0, y0, z0], [x1, y1, z1])
            .map_err(|source| FrameError::InvalidBox { line, object, source })?;
        aabbs.push(bb);
    }
    Ok(Frame { time, aabbs })
}

fn parse_number<T: std::str::FromStr>(line: usize, column: usize, text: &str) -> Result<T, FrameError> {
    text.parse().map_err(|_| FrameError::Parse {
        line,
        column: column + 1,
        value: text.to_owned(),
    })
}
