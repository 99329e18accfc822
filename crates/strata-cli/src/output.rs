// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Frame sinks that render pipeline output for the terminal.

use std::convert::Infallible;
use std::io::Write;

use comfy_table::presets::UTF8_FULL;
use comfy_table::Table;
use serde::Serialize;
use strata_core::{DomainId, FrameSink, FrameView};

/// Accumulates one table row per frame.
pub struct TableSink {
    table: Table,
}

impl Default for TableSink {
    fn default() -> Self {
        Self::new()
    }
}

impl TableSink {
    /// Empty table with the frame/time/update/touched/domains header.
    pub fn new() -> Self {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_header(vec!["frame", "time", "update", "touched", "domains"]);
        Self { table }
    }

    /// Finished table, ready to print once the run ends.
    pub fn into_table(self) -> Table {
        self.table
    }
}

impl FrameSink for TableSink {
    type Error = Infallible;

    fn accept(&mut self, view: FrameView<'_>) -> Result<(), Infallible> {
        let report = view.report;
        let time = view.time.map_or_else(String::new, |t| format!("{t:.3}"));
        let domains: Vec<String> = report
            .domain_ids
            .iter()
            .zip(&report.groups)
            .map(|(id, group)| format!("{id}:{}", group.len()))
            .collect();
        self.table.add_row(vec![
            view.frame.to_string(),
            time,
            report.update.to_string(),
            report.touched.to_string(),
            domains.join(" "),
        ]);
        Ok(())
    }
}

#[derive(Serialize)]
struct FrameRecord<'a> {
    frame: usize,
    time: Option<f64>,
    update: String,
    touched: usize,
    leaves: usize,
    domains: Vec<DomainRecord<'a>>,
}

#[derive(Serialize)]
struct DomainRecord<'a> {
    id: DomainId,
    objects: &'a [usize],
}

/// Writes one JSON object per frame, newline separated.
pub struct JsonLinesSink<W> {
    out: W,
}

impl<W: Write> JsonLinesSink<W> {
    /// Sink writing records to `out` as frames arrive.
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write> FrameSink for JsonLinesSink<W> {
    type Error = serde_json::Error;

    fn accept(&mut self, view: FrameView<'_>) -> Result<(), serde_json::Error> {
        let report = view.report;
        let record = FrameRecord {
            frame: view.frame,
            time: view.time,
            update: report.update.to_string(),
            touched: report.touched,
            leaves: view.tree.map_or(0, |tree| tree.leaf_count()),
            domains: report
                .domain_ids
                .iter()
                .zip(&report.groups)
                .map(|(&id, objects)| DomainRecord { id, objects })
                .collect(),
        };
        serde_json::to_writer(&mut self.out, &record)?;
        writeln!(self.out).map_err(serde_json::Error::io)
    }
}
