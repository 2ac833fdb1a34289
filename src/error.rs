//! Typed error conditions
//!
//! Fatal conditions abort a run before any output is produced. Per-record
//! anomalies are represented here too so they can be logged uniformly, but
//! callers skip the record instead of propagating them.

use crate::model::MarathonId;
use thiserror::Error;

/// Errors raised by the alignment pipeline
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PipelineError {
    /// No marathon could be anchored, so the root instant is undefined
    #[error("empty dataset: no marathon has any {source_kind} to anchor the timeline")]
    EmptyDataset { source_kind: &'static str },

    /// A record points at a marathon id that is not in the marathon set
    #[error("{record} references unknown marathon id {marathon}")]
    UnresolvedMarathon {
        record: &'static str,
        marathon: MarathonId,
    },
}

/// Errors raised while importing a stats file
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("no marathon named '{0}' found")]
    UnknownMarathon(String),

    #[error("malformed stats file {path}: {reason}")]
    MalformedStatsFile { path: String, reason: String },
}
