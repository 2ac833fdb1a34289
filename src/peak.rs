//! Peak-viewer summary
//!
//! For each marathon: the highest viewer reading, when it happened, which game
//! was on at that moment, and the highest donation total ever recorded (which
//! may come from a different sample than the viewer peak).
//!
//! # Tie-break
//!
//! When several samples share the maximum viewer count, the earliest one in
//! snapshot order wins (timestamp ascending, then store order). Any stable
//! choice is acceptable here; this one is simply the first encountered.

use crate::model::{Game, MarathonId};
use crate::store::Snapshot;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};

/// Per-marathon peak statistics
#[derive(Debug, Clone, PartialEq)]
pub struct PeakSummary {
    pub marathon: MarathonId,
    pub name: String,
    /// Highest donation total across all samples, if any had one
    pub max_donations: Option<f64>,
    pub max_viewers: i64,
    pub max_viewers_ts: DateTime<Utc>,
    /// Game active at the peak; `None` if the peak precedes every game change
    pub max_viewers_game: Option<String>,
}

/// Game-change events grouped per marathon, for point-in-time lookups
pub struct GameLog<'a> {
    by_marathon: HashMap<MarathonId, Vec<&'a Game>>,
}

impl<'a> GameLog<'a> {
    pub fn new(games: &'a [Game]) -> Self {
        let mut by_marathon: HashMap<MarathonId, Vec<&'a Game>> = HashMap::new();
        for game in games {
            by_marathon.entry(game.marathon).or_default().push(game);
        }
        for log in by_marathon.values_mut() {
            log.sort_by_key(|g| g.ts);
        }
        Self { by_marathon }
    }

    /// Latest game of `marathon` that started strictly before `ts`
    pub fn active_at(&self, marathon: MarathonId, ts: DateTime<Utc>) -> Option<&'a Game> {
        let log = self.by_marathon.get(&marathon)?;
        let started_before = log.partition_point(|g| g.ts < ts);
        started_before.checked_sub(1).map(|idx| log[idx])
    }
}

#[derive(Default)]
struct Accumulator {
    peak: Option<(i64, DateTime<Utc>)>,
    max_donations: Option<f64>,
}

/// Compute peak summaries, ordered by marathon id descending
///
/// Marathons without a single viewer reading are left out.
pub fn summarize(snapshot: &Snapshot) -> Vec<PeakSummary> {
    let mut per_marathon: BTreeMap<MarathonId, Accumulator> = BTreeMap::new();

    for sample in &snapshot.samples {
        let acc = per_marathon.entry(sample.marathon).or_default();

        if let Some(viewers) = sample.viewers {
            let better = match acc.peak {
                Some((best, _)) => viewers > best,
                None => true,
            };
            if better {
                acc.peak = Some((viewers, sample.ts));
            }
        }

        if let Some(donations) = sample.donations {
            acc.max_donations = Some(match acc.max_donations {
                Some(current) => current.max(donations),
                None => donations,
            });
        }
    }

    let games = GameLog::new(&snapshot.games);

    snapshot
        .marathons
        .iter()
        .rev()
        .filter_map(|marathon| {
            let acc = per_marathon.get(&marathon.id)?;
            let (max_viewers, max_viewers_ts) = acc.peak?;
            Some(PeakSummary {
                marathon: marathon.id,
                name: marathon.name.clone(),
                max_donations: acc.max_donations,
                max_viewers,
                max_viewers_ts,
                max_viewers_game: games
                    .active_at(marathon.id, max_viewers_ts)
                    .map(|g| g.name.clone()),
            })
        })
        .collect()
}
