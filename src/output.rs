//! Output rendering
//!
//! A parse produces three artifacts: a one-row summary, the base call table as
//! tab-separated text, and the aligned trace channels. [`ParsedAb1`] bundles
//! them and serializes to the JSON layout consumed by trace viewers:
//!
//! ```json
//! {
//!   "summary": [{"file name": "x.ab1", "base count": 4, "trace length": 12}],
//!   "baseData": "base_symbol\tbase_location\tbase_quality\nA\t10\t30...",
//!   "peakData": {"length": 12, "channels": ["G", "A", "T", "C"], "G": [], "A": [], "T": [], "C": []}
//! }
//! ```

use std::io::Write;

use serde::{Serialize, Serializer};

use crate::calls::BaseCalls;
use crate::error::Result;
use crate::trace::Trace;

/// Header row of the base call table
pub const BASE_TABLE_HEADER: &str = "base_symbol\tbase_location\tbase_quality";

/// Header row of the tab-separated summary
pub const SUMMARY_HEADER: &str = "file name\tbase count\ttrace length";

/// Channel labels in output order
pub const CHANNEL_LABELS: [&str; 4] = ["G", "A", "T", "C"];

/// Renders the base call table: header, then one row per call, joined by `\n`
#[must_use]
pub fn base_table(calls: &BaseCalls) -> String {
    // "A\t" + two numbers + separators
    let mut out = String::with_capacity(BASE_TABLE_HEADER.len() + calls.len() * 16);
    let mut buffer = itoa::Buffer::new();
    out.push_str(BASE_TABLE_HEADER);
    for call in calls {
        out.push('\n');
        out.push(call.symbol as char);
        out.push('\t');
        out.push_str(buffer.format(call.position));
        out.push('\t');
        out.push_str(buffer.format(call.quality));
    }
    out
}

/// One-row summary of a parsed file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    #[serde(rename = "file name")]
    pub filename: String,
    #[serde(rename = "base count")]
    pub base_count: usize,
    #[serde(rename = "trace length")]
    pub trace_length: usize,
}
impl Summary {
    /// Renders the summary as a tab-separated row (see [`SUMMARY_HEADER`])
    #[must_use]
    pub fn tsv_row(&self) -> String {
        let mut buffer = itoa::Buffer::new();
        let mut row = self.filename.clone();
        row.push('\t');
        row.push_str(buffer.format(self.base_count));
        row.push('\t');
        row.push_str(buffer.format(self.trace_length));
        row
    }
}

/// Aligned trace channels with their common length
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PeakData {
    pub length: usize,
    pub channels: [&'static str; 4],
    #[serde(rename = "G")]
    pub g: Vec<i32>,
    #[serde(rename = "A")]
    pub a: Vec<i32>,
    #[serde(rename = "T")]
    pub t: Vec<i32>,
    #[serde(rename = "C")]
    pub c: Vec<i32>,
}
impl From<Trace> for PeakData {
    fn from(trace: Trace) -> Self {
        let length = trace.len();
        let [g, a, t, c] = trace.into_channels();
        Self {
            length,
            channels: CHANNEL_LABELS,
            g,
            a,
            t,
            c,
        }
    }
}

fn as_single_row<S: Serializer>(
    summary: &Summary,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    std::slice::from_ref(summary).serialize(serializer)
}

/// The complete result of parsing one trace file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedAb1 {
    #[serde(serialize_with = "as_single_row")]
    pub summary: Summary,
    pub base_data: String,
    pub peak_data: PeakData,
}
impl ParsedAb1 {
    #[must_use]
    pub fn new(filename: &str, trace: Trace, calls: &BaseCalls) -> Self {
        Self {
            summary: Summary {
                filename: filename.to_string(),
                base_count: calls.len(),
                trace_length: trace.len(),
            },
            base_data: base_table(calls),
            peak_data: trace.into(),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Serializes to `writer` as JSON
    pub fn write_json<W: Write>(&self, writer: &mut W, pretty: bool) -> Result<()> {
        if pretty {
            serde_json::to_writer_pretty(&mut *writer, self)?;
        } else {
            serde_json::to_writer(&mut *writer, self)?;
        }
        Ok(())
    }
}
