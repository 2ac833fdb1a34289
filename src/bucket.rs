//! Bucketing and max-aggregation
//!
//! Every viewer sample is shifted onto the shared timeline, dropped if it falls
//! at or before the root instant (pre-broadcast noise), floored onto a fixed
//! grid, and folded into the bucket for `(grid timestamp, marathon)`.
//!
//! Aggregation is an element-wise max that ignores missing readings: a null
//! never lowers or clears a bucket's value, and a bucket that only ever saw
//! nulls for a field reports no value for it (not zero).
//!
//! Donation totals are cumulative, so for well-formed input the max of a
//! bucket is also its last reading. Only the max is guaranteed.
//!
//! # Example
//!
//! ```
//! use marathon_stats::bucket::BucketAggregator;
//! use marathon_stats::store::{MemoryStore, SampleStore};
//! use marathon_stats::timeline::{AnchorSource, Timeline};
//! use marathon_stats::util::time::from_epoch;
//!
//! let mut store = MemoryStore::new();
//! let id = store.add_marathon("SGDQ 2021");
//! store.add_sample(id, from_epoch(1_625_411_100).unwrap(), Some(10), Some(1.0));
//! store.add_sample(id, from_epoch(1_625_411_160).unwrap(), Some(30), None);
//!
//! let snapshot = store.snapshot().unwrap();
//! let timeline = Timeline::build(&snapshot, AnchorSource::Samples, 15).unwrap();
//!
//! let mut aggregator = BucketAggregator::new(&timeline, 300);
//! aggregator.add_samples(&snapshot.samples);
//! let buckets = aggregator.finish();
//!
//! let (key, value) = buckets.iter().next().unwrap();
//! assert_eq!(key.ts, 1_625_411_100);
//! assert_eq!(value.viewers, Some(30));
//! assert_eq!(value.donations, Some(1.0));
//! ```

use crate::model::{MarathonId, ViewerSample};
use crate::timeline::Timeline;
use crate::util::time::floor_to_grid;
use std::collections::BTreeMap;

/// Default bucket width (5 minutes)
pub const DEFAULT_BUCKET_SECONDS: i64 = 300;

/// Bucket identity
///
/// Field order matters: the derived `Ord` sorts by timestamp first and then by
/// marathon id, which is the iteration order series assembly relies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BucketKey {
    /// Grid-aligned epoch seconds on the shared timeline
    pub ts: i64,
    pub marathon: MarathonId,
}

/// Aggregated readings of one bucket
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BucketValue {
    pub viewers: Option<i64>,
    pub donations: Option<f64>,
    /// Samples folded into this bucket
    pub samples: usize,
}

impl BucketValue {
    /// Fold one reading into the bucket
    pub fn absorb(&mut self, viewers: Option<i64>, donations: Option<f64>) {
        self.viewers = max_present(self.viewers, viewers, i64::max);
        self.donations = max_present(self.donations, donations, f64::max);
        self.samples += 1;
    }
}

fn max_present<T>(current: Option<T>, new: Option<T>, max: fn(T, T) -> T) -> Option<T> {
    match (current, new) {
        (Some(a), Some(b)) => Some(max(a, b)),
        (a, None) => a,
        (None, b) => b,
    }
}

/// Counters describing what happened to the input samples
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BucketStats {
    /// Samples folded into some bucket
    pub accepted: usize,
    /// Samples at or before the root instant after shifting
    pub before_kickoff: usize,
    /// Samples of marathons that have no anchor
    pub unaligned: usize,
}

/// Accumulates samples into buckets
pub struct BucketAggregator<'a> {
    timeline: &'a Timeline,
    width_secs: i64,
    buckets: BTreeMap<BucketKey, BucketValue>,
    stats: BucketStats,
}

impl<'a> BucketAggregator<'a> {
    /// Create an aggregator for the given timeline
    ///
    /// `width_secs` must be positive; configuration validation enforces this.
    pub fn new(timeline: &'a Timeline, width_secs: i64) -> Self {
        Self {
            timeline,
            width_secs: width_secs.max(1),
            buckets: BTreeMap::new(),
            stats: BucketStats::default(),
        }
    }

    /// Bucket key a sample maps to, or `None` if it does not qualify
    pub fn key_for(&self, sample: &ViewerSample) -> Option<BucketKey> {
        let shifted = self.timeline.shift(sample.marathon, sample.ts)?;
        if shifted <= self.timeline.root() {
            return None;
        }
        Some(BucketKey {
            ts: floor_to_grid(shifted.timestamp(), self.width_secs),
            marathon: sample.marathon,
        })
    }

    /// Fold one sample in; returns whether it qualified
    pub fn add_sample(&mut self, sample: &ViewerSample) -> bool {
        if self.timeline.anchor(sample.marathon).is_none() {
            self.stats.unaligned += 1;
            return false;
        }

        match self.key_for(sample) {
            Some(key) => {
                self.buckets
                    .entry(key)
                    .or_default()
                    .absorb(sample.viewers, sample.donations);
                self.stats.accepted += 1;
                true
            }
            None => {
                self.stats.before_kickoff += 1;
                false
            }
        }
    }

    pub fn add_samples<'s, I>(&mut self, samples: I)
    where
        I: IntoIterator<Item = &'s ViewerSample>,
    {
        for sample in samples {
            self.add_sample(sample);
        }
    }

    pub fn finish(self) -> BucketSet {
        BucketSet {
            width_secs: self.width_secs,
            buckets: self.buckets,
            stats: self.stats,
        }
    }
}

/// Finished buckets, iterable in (timestamp, marathon id) order
#[derive(Debug, Clone)]
pub struct BucketSet {
    width_secs: i64,
    buckets: BTreeMap<BucketKey, BucketValue>,
    stats: BucketStats,
}

impl BucketSet {
    pub fn iter(&self) -> impl Iterator<Item = (&BucketKey, &BucketValue)> {
        self.buckets.iter()
    }

    pub fn get(&self, ts: i64, marathon: MarathonId) -> Option<&BucketValue> {
        self.buckets.get(&BucketKey { ts, marathon })
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn width_secs(&self) -> i64 {
        self.width_secs
    }

    pub fn stats(&self) -> BucketStats {
        self.stats
    }
}
