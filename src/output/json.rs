//! JSON output document
//!
//! Layout of the document:
//!
//! ```text
//! {
//!   "ts":          [int...],            // shared-timeline epoch seconds, ascending
//!   "viewers":     [[int|null...]...],  // one array per marathon ordinal, aligned to "ts"
//!   "donations":   [[number|null...]...],
//!   "marathons":   [string...],         // display names, same ordinals
//!   "other_stats": [{ name, id, max_donations, max_viewers,
//!                     max_viewers_ts, max_viewers_game }...]  // id descending
//! }
//! ```
//!
//! Missing values are written as `null`, never `0`.

use crate::peak::PeakSummary;
use crate::pipeline::Report;
use crate::Result;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

/// Peak statistics of one marathon as written to the document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonPeakStats {
    pub name: String,
    pub id: i64,
    pub max_donations: Option<f64>,
    pub max_viewers: i64,
    /// Epoch seconds (real time, not shifted)
    pub max_viewers_ts: i64,
    pub max_viewers_game: Option<String>,
}

impl From<&PeakSummary> for JsonPeakStats {
    fn from(peak: &PeakSummary) -> Self {
        Self {
            name: peak.name.clone(),
            id: peak.marathon,
            max_donations: peak.max_donations,
            max_viewers: peak.max_viewers,
            max_viewers_ts: peak.max_viewers_ts.timestamp(),
            max_viewers_game: peak.max_viewers_game.clone(),
        }
    }
}

/// The complete output document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportDocument {
    pub ts: Vec<i64>,
    pub viewers: Vec<Vec<Option<i64>>>,
    pub donations: Vec<Vec<Option<f64>>>,
    pub marathons: Vec<String>,
    pub other_stats: Vec<JsonPeakStats>,
}

impl ReportDocument {
    pub fn from_report(report: &Report) -> Self {
        Self {
            ts: report.series.ts.clone(),
            viewers: report.series.viewers.clone(),
            donations: report.series.donations.clone(),
            marathons: report.marathons.iter().map(|m| m.name.clone()).collect(),
            other_stats: report.peaks.iter().map(JsonPeakStats::from).collect(),
        }
    }

    /// Serialize the document
    pub fn to_json(&self, pretty: bool) -> Result<String> {
        let json = if pretty {
            serde_json::to_string_pretty(self)
        } else {
            serde_json::to_string(self)
        };
        json.context("Failed to serialize output document")
    }
}

/// Write the report's document to `path`
///
/// The document is fully serialized and written to a sibling temporary file
/// first, then renamed over `path`, so readers never observe a truncated file.
pub fn write_report(path: &Path, report: &Report, pretty: bool) -> Result<()> {
    let json = ReportDocument::from_report(report).to_json(pretty)?;
    write_atomic(path, json.as_bytes())
}

fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let tmp = temp_path(path);

    if let Err(e) = fs::write(&tmp, contents) {
        let _ = fs::remove_file(&tmp);
        return Err(e).with_context(|| format!("Failed to write {}", tmp.display()));
    }

    if let Err(e) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(e)
            .with_context(|| format!("Failed to move output into place: {}", path.display()));
    }

    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from("out.json"));
    name.push(".tmp");
    path.with_file_name(name)
}
