//! Raw record types
//!
//! These are the three record kinds held by the sample store. All of them are
//! read-only inputs to the pipeline; nothing in the core mutates them.

use chrono::{DateTime, Utc};

/// Stable marathon identifier assigned at creation
pub type MarathonId = i64;

/// A fundraising marathon
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Marathon {
    pub id: MarathonId,
    /// Display name (unique across the store)
    pub name: String,
}

impl Marathon {
    pub fn new(id: MarathonId, name: impl Into<String>) -> Self {
        Self { id, name: name.into() }
    }
}

/// A game-change event: `name` started being played at `ts`
///
/// There is no end time. A game stays active until the next game of the same
/// marathon starts.
#[derive(Debug, Clone, PartialEq)]
pub struct Game {
    pub ts: DateTime<Utc>,
    pub name: String,
    pub marathon: MarathonId,
}

impl Game {
    pub fn new(marathon: MarathonId, ts: DateTime<Utc>, name: impl Into<String>) -> Self {
        Self {
            ts,
            name: name.into(),
            marathon,
        }
    }
}

/// One reading of viewer count and cumulative donation total
///
/// Either reading may be missing. `donations` is cumulative and expected to be
/// non-decreasing within a marathon.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewerSample {
    pub ts: DateTime<Utc>,
    pub viewers: Option<i64>,
    pub donations: Option<f64>,
    pub marathon: MarathonId,
}

impl ViewerSample {
    pub fn new(
        marathon: MarathonId,
        ts: DateTime<Utc>,
        viewers: Option<i64>,
        donations: Option<f64>,
    ) -> Self {
        Self {
            ts,
            viewers,
            donations,
            marathon,
        }
    }
}
