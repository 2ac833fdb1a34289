//! Timeline alignment
//!
//! Marathons run on different calendar dates but all begin broadcasting near
//! the same wall-clock hour. Each marathon is given a *kickoff instant* (the
//! configured hour on the day of its first record); the earliest kickoff across
//! all marathons is the *root instant*, and every marathon's offset is its
//! kickoff minus the root. Subtracting that offset from a raw timestamp moves it
//! onto the shared timeline.
//!
//! # Example
//!
//! ```
//! use marathon_stats::store::{MemoryStore, SampleStore};
//! use marathon_stats::timeline::{AnchorSource, Timeline};
//! use marathon_stats::util::time::from_epoch;
//! use chrono::Duration;
//!
//! let mut store = MemoryStore::new();
//! let a = store.add_marathon("A");
//! let b = store.add_marathon("B");
//! // 2021-07-04 15:05 and 2022-01-09 15:05 UTC
//! store.add_sample(a, from_epoch(1_625_411_100).unwrap(), Some(10), None);
//! store.add_sample(b, from_epoch(1_641_740_700).unwrap(), Some(5), None);
//!
//! let snapshot = store.snapshot().unwrap();
//! let timeline = Timeline::build(&snapshot, AnchorSource::Samples, 15).unwrap();
//! assert_eq!(timeline.offset(a), Some(Duration::zero()));
//! assert_eq!(timeline.offset(b), Some(Duration::days(189)));
//! ```

use crate::error::PipelineError;
use crate::model::MarathonId;
use crate::store::Snapshot;
use crate::util::time::truncate_to_day;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::fmt;

const MAX_KICKOFF_HOUR: u32 = 23;

/// Which records define a marathon's first-seen instant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnchorSource {
    /// Earliest viewer sample
    #[default]
    Samples,
    /// Earliest game-change event
    Games,
}

impl AnchorSource {
    fn record_kind(self) -> &'static str {
        match self {
            AnchorSource::Samples => "viewer sample",
            AnchorSource::Games => "game",
        }
    }
}

impl fmt::Display for AnchorSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnchorSource::Samples => write!(f, "samples"),
            AnchorSource::Games => write!(f, "games"),
        }
    }
}

/// Per-marathon normalization point
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarathonAnchor {
    pub marathon: MarathonId,
    /// Earliest record of the marathon
    pub first_seen: DateTime<Utc>,
    /// `kickoff_hour` on the calendar day of `first_seen`
    pub kickoff: DateTime<Utc>,
}

impl MarathonAnchor {
    pub fn new(marathon: MarathonId, first_seen: DateTime<Utc>, kickoff_hour: u32) -> Self {
        Self {
            marathon,
            first_seen,
            kickoff: kickoff_instant(first_seen, kickoff_hour),
        }
    }
}

/// Midnight of `first_seen`'s day plus `kickoff_hour` hours
///
/// Hours past 23 are clamped to 23, so the kickoff always falls on the same
/// calendar day as `first_seen`.
pub fn kickoff_instant(first_seen: DateTime<Utc>, kickoff_hour: u32) -> DateTime<Utc> {
    truncate_to_day(first_seen) + Duration::hours(i64::from(kickoff_hour.min(MAX_KICKOFF_HOUR)))
}

/// Earliest timestamp per marathon, turned into anchors
///
/// Marathons that never appear in `records` get no anchor.
pub fn compute_anchors<I>(records: I, kickoff_hour: u32) -> Vec<MarathonAnchor>
where
    I: IntoIterator<Item = (MarathonId, DateTime<Utc>)>,
{
    let mut first_seen: BTreeMap<MarathonId, DateTime<Utc>> = BTreeMap::new();
    for (marathon, ts) in records {
        match first_seen.entry(marathon) {
            Entry::Vacant(e) => {
                e.insert(ts);
            }
            Entry::Occupied(mut e) => {
                if ts < *e.get() {
                    e.insert(ts);
                }
            }
        }
    }

    first_seen
        .into_iter()
        .map(|(marathon, ts)| MarathonAnchor::new(marathon, ts, kickoff_hour))
        .collect()
}

/// The shared timeline: root instant plus one anchor per aligned marathon
#[derive(Debug, Clone)]
pub struct Timeline {
    root: DateTime<Utc>,
    anchors: BTreeMap<MarathonId, MarathonAnchor>,
}

impl Timeline {
    /// Align every marathon of the snapshot that has at least one anchoring record
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::EmptyDataset`] when no marathon can be anchored.
    pub fn build(
        snapshot: &Snapshot,
        source: AnchorSource,
        kickoff_hour: u32,
    ) -> Result<Self, PipelineError> {
        let anchors = match source {
            AnchorSource::Samples => compute_anchors(
                snapshot.samples.iter().map(|s| (s.marathon, s.ts)),
                kickoff_hour,
            ),
            AnchorSource::Games => compute_anchors(
                snapshot.games.iter().map(|g| (g.marathon, g.ts)),
                kickoff_hour,
            ),
        };

        Self::from_anchors(anchors).ok_or(PipelineError::EmptyDataset {
            source_kind: source.record_kind(),
        })
    }

    /// Build from precomputed anchors; `None` if there are none
    pub fn from_anchors(anchors: Vec<MarathonAnchor>) -> Option<Self> {
        let root = anchors.iter().map(|a| a.kickoff).min()?;
        let anchors = anchors.into_iter().map(|a| (a.marathon, a)).collect();
        Some(Self { root, anchors })
    }

    /// Zero point of the shared timeline
    pub fn root(&self) -> DateTime<Utc> {
        self.root
    }

    pub fn anchor(&self, marathon: MarathonId) -> Option<&MarathonAnchor> {
        self.anchors.get(&marathon)
    }

    /// Anchors ordered by marathon id
    pub fn anchors(&self) -> impl Iterator<Item = &MarathonAnchor> {
        self.anchors.values()
    }

    /// Number of aligned marathons
    pub fn len(&self) -> usize {
        self.anchors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.anchors.is_empty()
    }

    /// Shift applied to move the marathon onto the shared timeline (never negative)
    pub fn offset(&self, marathon: MarathonId) -> Option<Duration> {
        self.anchor(marathon).map(|a| a.kickoff - self.root)
    }

    /// Project a raw timestamp onto the shared timeline
    pub fn shift(&self, marathon: MarathonId, ts: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.offset(marathon).map(|offset| ts - offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, SampleStore};
    use chrono::{NaiveDate, TimeZone};

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    #[test]
    fn test_kickoff_instant() {
        assert_eq!(kickoff_instant(at(2021, 7, 4, 16, 30), 15), at(2021, 7, 4, 15, 0));
        // first record before the kickoff hour still anchors to the same day
        assert_eq!(kickoff_instant(at(2021, 7, 4, 9, 0), 15), at(2021, 7, 4, 15, 0));
        assert_eq!(kickoff_instant(at(2021, 7, 4, 9, 0), 0), at(2021, 7, 4, 0, 0));
    }

    #[test]
    fn test_kickoff_hour_is_clamped_to_same_day() {
        assert_eq!(kickoff_instant(at(2021, 7, 4, 9, 0), 40), at(2021, 7, 4, 23, 0));
        assert_eq!(kickoff_instant(at(2021, 7, 4, 9, 0), u32::MAX), at(2021, 7, 4, 23, 0));

        let last_day = NaiveDate::MAX.and_hms_opt(12, 0, 0).unwrap().and_utc();
        let kickoff = kickoff_instant(last_day, 30);
        assert_eq!(kickoff, NaiveDate::MAX.and_hms_opt(23, 0, 0).unwrap().and_utc());
    }

    #[test]
    fn test_compute_anchors_uses_minimum() {
        let anchors = compute_anchors(
            vec![
                (2, at(2022, 1, 9, 18, 0)),
                (1, at(2021, 7, 4, 15, 10)),
                (2, at(2022, 1, 9, 15, 30)),
                (1, at(2021, 7, 4, 15, 5)),
            ],
            15,
        );

        assert_eq!(anchors.len(), 2);
        assert_eq!(anchors[0].marathon, 1);
        assert_eq!(anchors[0].first_seen, at(2021, 7, 4, 15, 5));
        assert_eq!(anchors[1].marathon, 2);
        assert_eq!(anchors[1].first_seen, at(2022, 1, 9, 15, 30));
        assert_eq!(anchors[1].kickoff, at(2022, 1, 9, 15, 0));
    }

    #[test]
    fn test_two_marathon_scenario() {
        let mut store = MemoryStore::new();
        let a = store.add_marathon("A");
        let b = store.add_marathon("B");
        store.add_sample(a, at(2021, 7, 4, 15, 5), Some(10), None);
        store.add_sample(a, at(2021, 7, 4, 15, 10), Some(20), None);
        store.add_sample(b, at(2022, 1, 9, 15, 5), Some(5), None);

        let snapshot = store.snapshot().unwrap();
        let timeline = Timeline::build(&snapshot, AnchorSource::Samples, 15).unwrap();

        assert_eq!(timeline.root(), at(2021, 7, 4, 15, 0));
        assert_eq!(timeline.offset(a), Some(Duration::zero()));
        assert_eq!(timeline.offset(b), Some(at(2022, 1, 9, 15, 0) - at(2021, 7, 4, 15, 0)));
        assert_eq!(timeline.shift(b, at(2022, 1, 9, 15, 5)), Some(at(2021, 7, 4, 15, 5)));
    }

    #[test]
    fn test_root_is_minimum_and_offsets_non_negative() {
        let anchors = compute_anchors(
            vec![
                (0, at(2023, 6, 25, 16, 0)),
                (1, at(2019, 1, 6, 16, 0)),
                (2, at(2020, 8, 16, 12, 0)),
            ],
            15,
        );
        let timeline = Timeline::from_anchors(anchors).unwrap();

        assert_eq!(timeline.root(), at(2019, 1, 6, 15, 0));
        for anchor in timeline.anchors() {
            assert!(timeline.root() <= anchor.kickoff);
            assert!(timeline.offset(anchor.marathon).unwrap() >= Duration::zero());
        }
        assert_eq!(timeline.offset(1), Some(Duration::zero()));
    }

    #[test]
    fn test_marathon_without_samples_is_not_aligned() {
        let mut store = MemoryStore::new();
        let a = store.add_marathon("A");
        let empty = store.add_marathon("Empty");
        store.add_sample(a, at(2021, 7, 4, 15, 5), Some(10), None);

        let snapshot = store.snapshot().unwrap();
        let timeline = Timeline::build(&snapshot, AnchorSource::Samples, 15).unwrap();

        assert_eq!(timeline.len(), 1);
        assert!(timeline.offset(empty).is_none());
        assert!(timeline.shift(empty, at(2021, 7, 4, 15, 5)).is_none());
    }

    #[test]
    fn test_empty_dataset() {
        let mut store = MemoryStore::new();
        store.add_marathon("A");
        let snapshot = store.snapshot().unwrap();

        let err = Timeline::build(&snapshot, AnchorSource::Samples, 15).unwrap_err();
        assert_eq!(err, PipelineError::EmptyDataset { source_kind: "viewer sample" });

        let err = Timeline::build(&Snapshot::default(), AnchorSource::Games, 15).unwrap_err();
        assert_eq!(err, PipelineError::EmptyDataset { source_kind: "game" });
    }

    #[test]
    fn test_anchor_from_games() {
        let mut store = MemoryStore::new();
        let a = store.add_marathon("A");
        store.add_game(a, at(2021, 7, 3, 23, 0), "Pre-Show");
        store.add_sample(a, at(2021, 7, 4, 15, 5), Some(10), None);

        let snapshot = store.snapshot().unwrap();
        let by_games = Timeline::build(&snapshot, AnchorSource::Games, 15).unwrap();
        let by_samples = Timeline::build(&snapshot, AnchorSource::Samples, 15).unwrap();

        assert_eq!(by_games.root(), at(2021, 7, 3, 15, 0));
        assert_eq!(by_samples.root(), at(2021, 7, 4, 15, 0));
    }
}
