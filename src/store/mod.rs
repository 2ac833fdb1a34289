//! Raw sample store
//!
//! The store is the boundary between the pipeline and wherever marathon data
//! actually lives. The pipeline never queries a store piecemeal: it takes one
//! materialized [`Snapshot`] up front so the root instant and every offset are
//! computed from a consistent view of the data.
//!
//! # Backends
//!
//! - **MemoryStore**: arena of records held in memory
//! - **SqliteStore**: SQLite database file (see [`sqlite`])
//!
//! # Example
//!
//! ```
//! use marathon_stats::store::{MemoryStore, SampleStore};
//! use marathon_stats::util::time::from_epoch;
//!
//! let mut store = MemoryStore::new();
//! let id = store.add_marathon("SGDQ 2021");
//! store.add_sample(id, from_epoch(1_625_411_100).unwrap(), Some(10), Some(5.0));
//!
//! let snapshot = store.snapshot().unwrap();
//! assert_eq!(snapshot.marathons.len(), 1);
//! assert_eq!(snapshot.samples.len(), 1);
//! ```

pub mod sqlite;

use crate::error::PipelineError;
use crate::model::{Game, Marathon, MarathonId, ViewerSample};
use crate::Result;
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use tracing::warn;

pub use sqlite::{ImportTransaction, SqliteStore};

/// Read access to the three record kinds
///
/// Implementations return marathons ordered by id ascending, and samples and
/// games ordered by timestamp with ties kept in insertion order.
pub trait SampleStore {
    /// All marathons, ordered by id ascending
    fn marathons(&self) -> Result<Vec<Marathon>>;

    /// All viewer samples, ordered by timestamp
    fn viewer_samples(&self) -> Result<Vec<ViewerSample>>;

    /// All game-change events, ordered by timestamp
    fn games(&self) -> Result<Vec<Game>>;

    /// Materialize the whole dataset
    ///
    /// Backends that can change underneath the reader should override this
    /// and read all three record kinds from one consistent view.
    fn snapshot(&self) -> Result<Snapshot> {
        Ok(Snapshot::new(
            self.marathons()?,
            self.viewer_samples()?,
            self.games()?,
        ))
    }
}

/// A closed, immutable copy of the dataset
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    /// Ordered by id ascending; position is the output ordinal
    pub marathons: Vec<Marathon>,
    /// Ordered by timestamp
    pub samples: Vec<ViewerSample>,
    /// Ordered by timestamp
    pub games: Vec<Game>,
}

/// Records dropped by [`Snapshot::resolve_references`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolveSummary {
    pub dropped_samples: usize,
    pub dropped_games: usize,
}

impl Snapshot {
    /// Build a snapshot, enforcing the ordering the pipeline relies on
    ///
    /// Sorting is stable so records with equal timestamps keep the order the
    /// store produced them in.
    pub fn new(
        mut marathons: Vec<Marathon>,
        mut samples: Vec<ViewerSample>,
        mut games: Vec<Game>,
    ) -> Self {
        marathons.sort_by_key(|m| m.id);
        samples.sort_by_key(|s| s.ts);
        games.sort_by_key(|g| g.ts);
        Self {
            marathons,
            samples,
            games,
        }
    }

    /// Ordinal of a marathon in the output arrays
    pub fn ordinal(&self, id: MarathonId) -> Option<usize> {
        self.marathons.binary_search_by_key(&id, |m| m.id).ok()
    }

    /// Drop samples and games that point at an unknown marathon
    ///
    /// Each dropped record is logged. Dropping is the only handling: a dangling
    /// reference must never reach the ordinal-indexed output arrays.
    pub fn resolve_references(&mut self) -> ResolveSummary {
        let known: HashSet<MarathonId> = self.marathons.iter().map(|m| m.id).collect();

        let before = self.samples.len();
        self.samples.retain(|s| {
            let ok = known.contains(&s.marathon);
            if !ok {
                warn!(
                    "{}",
                    PipelineError::UnresolvedMarathon { record: "viewer sample", marathon: s.marathon }
                );
            }
            ok
        });
        let dropped_samples = before - self.samples.len();

        let before = self.games.len();
        self.games.retain(|g| {
            let ok = known.contains(&g.marathon);
            if !ok {
                warn!(
                    "{}",
                    PipelineError::UnresolvedMarathon { record: "game", marathon: g.marathon }
                );
            }
            ok
        });
        let dropped_games = before - self.games.len();

        ResolveSummary {
            dropped_samples,
            dropped_games,
        }
    }
}

/// In-memory record arena
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    marathons: Vec<Marathon>,
    samples: Vec<ViewerSample>,
    games: Vec<Game>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a marathon with the next free id and return that id
    pub fn add_marathon(&mut self, name: impl Into<String>) -> MarathonId {
        let id = self.marathons.iter().map(|m| m.id + 1).max().unwrap_or(0);
        self.marathons.push(Marathon::new(id, name));
        id
    }

    /// Add a marathon with an explicit id
    pub fn insert_marathon(&mut self, marathon: Marathon) {
        self.marathons.push(marathon);
    }

    pub fn add_sample(
        &mut self,
        marathon: MarathonId,
        ts: DateTime<Utc>,
        viewers: Option<i64>,
        donations: Option<f64>,
    ) {
        self.samples.push(ViewerSample::new(marathon, ts, viewers, donations));
    }

    pub fn add_game(&mut self, marathon: MarathonId, ts: DateTime<Utc>, name: impl Into<String>) {
        self.games.push(Game::new(marathon, ts, name));
    }
}

impl SampleStore for MemoryStore {
    fn marathons(&self) -> Result<Vec<Marathon>> {
        let mut marathons = self.marathons.clone();
        marathons.sort_by_key(|m| m.id);
        Ok(marathons)
    }

    fn viewer_samples(&self) -> Result<Vec<ViewerSample>> {
        let mut samples = self.samples.clone();
        samples.sort_by_key(|s| s.ts);
        Ok(samples)
    }

    fn games(&self) -> Result<Vec<Game>> {
        let mut games = self.games.clone();
        games.sort_by_key(|g| g.ts);
        Ok(games)
    }
}
