//! Stats file import
//!
//! Loads one marathon's recording into the SQLite store. A stats file is a JSON
//! object:
//!
//! ```text
//! {
//!   "viewers": [[ts, viewers, donations], ...],   // ts in epoch seconds
//!   "games":   [[ts, name, ...], ...]
//! }
//! ```
//!
//! Only the leading elements of each row are read; anything after them is
//! ignored. A row that cannot be understood is skipped with a warning and
//! counted, it never fails the import. Re-importing a marathon replaces all of
//! its samples and games.

use crate::error::ImportError;
use crate::model::{Game, MarathonId, ViewerSample};
use crate::store::SqliteStore;
use crate::util::time::from_epoch;
use crate::Result;
use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Deserialize)]
struct StatsFile {
    #[serde(default)]
    viewers: Vec<Value>,
    #[serde(default)]
    games: Vec<Value>,
}

/// One parsed viewer row
#[derive(Debug, Clone, PartialEq)]
pub struct SampleRow {
    pub ts: DateTime<Utc>,
    pub viewers: Option<i64>,
    pub donations: Option<f64>,
}

/// One parsed game row
#[derive(Debug, Clone, PartialEq)]
pub struct GameRow {
    pub ts: DateTime<Utc>,
    pub name: String,
}

/// Parsed contents of a stats file
#[derive(Debug, Clone, Default)]
pub struct StatsRecording {
    pub samples: Vec<SampleRow>,
    pub games: Vec<GameRow>,
    /// Rows that could not be parsed
    pub skipped: usize,
}

impl StatsRecording {
    /// Attach the rows to a marathon
    pub fn into_records(self, marathon: MarathonId) -> (Vec<ViewerSample>, Vec<Game>) {
        let samples = self
            .samples
            .into_iter()
            .map(|row| ViewerSample::new(marathon, row.ts, row.viewers, row.donations))
            .collect();
        let games = self
            .games
            .into_iter()
            .map(|row| Game::new(marathon, row.ts, row.name))
            .collect();
        (samples, games)
    }
}

/// Outcome of an import
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSummary {
    pub marathon: MarathonId,
    pub created: bool,
    pub samples: usize,
    pub games: usize,
    pub skipped: usize,
}

/// Default location of a marathon's stats file
pub fn stats_path(stats_dir: &Path, marathon_name: &str) -> PathBuf {
    stats_dir.join(format!("{}.json", marathon_name))
}

/// Parse the text of a stats file
pub fn parse_stats(contents: &str, source: &str) -> Result<StatsRecording> {
    let file: StatsFile = serde_json::from_str(contents).map_err(|e| {
        ImportError::MalformedStatsFile {
            path: source.to_string(),
            reason: e.to_string(),
        }
    })?;

    let mut recording = StatsRecording::default();

    for (index, row) in file.viewers.iter().enumerate() {
        match parse_sample_row(row) {
            Some(sample) => recording.samples.push(sample),
            None => {
                warn!(index, row = %row, "skipping malformed viewer row");
                recording.skipped += 1;
            }
        }
    }

    for (index, row) in file.games.iter().enumerate() {
        match parse_game_row(row) {
            Some(game) => recording.games.push(game),
            None => {
                warn!(index, row = %row, "skipping malformed game row");
                recording.skipped += 1;
            }
        }
    }

    Ok(recording)
}

fn parse_sample_row(row: &Value) -> Option<SampleRow> {
    let items = row.as_array()?;
    if items.len() < 3 {
        return None;
    }

    Some(SampleRow {
        ts: parse_timestamp(&items[0])?,
        viewers: parse_nullable(&items[1], parse_count)?,
        donations: parse_nullable(&items[2], Value::as_f64)?,
    })
}

fn parse_game_row(row: &Value) -> Option<GameRow> {
    let items = row.as_array()?;
    if items.len() < 2 {
        return None;
    }

    Some(GameRow {
        ts: parse_timestamp(&items[0])?,
        name: items[1].as_str()?.to_string(),
    })
}

/// Integral epoch seconds; a float timestamp is rounded to the nearest second
fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    let secs = match value.as_i64() {
        Some(secs) => secs,
        None => {
            let f = value.as_f64()?;
            if !f.is_finite() || f.abs() > i64::MAX as f64 {
                return None;
            }
            f.round() as i64
        }
    };
    from_epoch(secs)
}

fn parse_count(value: &Value) -> Option<i64> {
    value.as_i64().or_else(|| {
        let f = value.as_f64()?;
        (f.fract() == 0.0 && f.abs() <= i64::MAX as f64).then_some(f as i64)
    })
}

/// `Some(None)` for JSON null, `Some(Some(v))` for a valid value, `None` if invalid
fn parse_nullable<T>(value: &Value, parse: impl Fn(&Value) -> Option<T>) -> Option<Option<T>> {
    if value.is_null() {
        Some(None)
    } else {
        parse(value).map(Some)
    }
}

/// Import a stats file for the marathon named `name`
///
/// Fails with [`ImportError::UnknownMarathon`] if the marathon does not exist
/// and `create` is false. Creating the marathon and replacing its data happen
/// in one transaction, so a failed import leaves the store as it was.
pub fn import_marathon(
    store: &mut SqliteStore,
    name: &str,
    path: &Path,
    create: bool,
) -> Result<ImportSummary> {
    if !create && store.find_marathon(name)?.is_none() {
        return Err(ImportError::UnknownMarathon(name.to_string()).into());
    }

    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read stats file: {}", path.display()))?;
    let recording = parse_stats(&contents, &path.display().to_string())?;
    let skipped = recording.skipped;

    let tx = store.begin_import()?;
    let (marathon, created) = match tx.find_marathon(name)? {
        Some(marathon) => (marathon, false),
        None if create => (tx.create_marathon(name)?, true),
        None => return Err(ImportError::UnknownMarathon(name.to_string()).into()),
    };

    let (samples, games) = recording.into_records(marathon.id);
    tx.replace_marathon_data(marathon.id, &samples, &games)
        .with_context(|| format!("Failed to import data for marathon '{}'", name))?;
    tx.commit()?;

    info!(
        marathon = marathon.id,
        name,
        samples = samples.len(),
        games = games.len(),
        skipped,
        created,
        "import complete"
    );

    Ok(ImportSummary {
        marathon: marathon.id,
        created,
        samples: samples.len(),
        games: games.len(),
        skipped,
    })
}
