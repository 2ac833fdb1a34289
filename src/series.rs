//! Series assembly
//!
//! Turns the bucket set into one shared, strictly ascending time axis plus one
//! value array per marathon. Arrays are indexed by marathon ordinal (position
//! in the snapshot's marathon list) and aligned to the axis; a marathon with no
//! bucket at some timestamp gets `None` there.

use crate::bucket::BucketSet;
use crate::model::{Marathon, MarathonId};
use std::collections::HashMap;

/// Combined multi-series dataset
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeriesSet {
    /// Epoch seconds on the shared timeline, strictly ascending
    pub ts: Vec<i64>,
    /// `viewers[ordinal][i]` is the value at `ts[i]`
    pub viewers: Vec<Vec<Option<i64>>>,
    /// `donations[ordinal][i]` is the value at `ts[i]`
    pub donations: Vec<Vec<Option<f64>>>,
}

impl SeriesSet {
    /// Assemble the series for `marathons` (in ordinal order) from `buckets`
    ///
    /// Buckets for marathons not in the list are ignored.
    pub fn assemble(marathons: &[Marathon], buckets: &BucketSet) -> Self {
        let ordinals: HashMap<MarathonId, usize> = marathons
            .iter()
            .enumerate()
            .map(|(ordinal, m)| (m.id, ordinal))
            .collect();

        // Buckets iterate in timestamp order, so the axis comes out sorted
        let mut ts: Vec<i64> = Vec::new();
        for (key, _) in buckets.iter() {
            if ts.last() != Some(&key.ts) {
                ts.push(key.ts);
            }
        }

        let mut viewers = vec![vec![None; ts.len()]; marathons.len()];
        let mut donations = vec![vec![None; ts.len()]; marathons.len()];

        let mut position = 0;
        for (key, value) in buckets.iter() {
            while ts[position] != key.ts {
                position += 1;
            }
            let Some(&ordinal) = ordinals.get(&key.marathon) else {
                continue;
            };
            viewers[ordinal][position] = value.viewers;
            donations[ordinal][position] = value.donations;
        }

        Self {
            ts,
            viewers,
            donations,
        }
    }

    /// Number of points on the shared axis
    pub fn len(&self) -> usize {
        self.ts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ts.is_empty()
    }
}
