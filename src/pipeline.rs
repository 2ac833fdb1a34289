//! End-to-end run: snapshot → resolve → align → bucket → assemble, plus peaks
//!
//! The run is a single pass over a closed snapshot. It either produces a full
//! [`Report`] or fails before bucketing starts; there are no partial results.

use crate::bucket::{BucketAggregator, BucketStats};
use crate::config::{AlignmentConfig, Config};
use crate::error::PipelineError;
use crate::model::Marathon;
use crate::peak::{self, PeakSummary};
use crate::series::SeriesSet;
use crate::output::json;
use crate::store::{ResolveSummary, SampleStore, Snapshot, SqliteStore};
use crate::timeline::{MarathonAnchor, Timeline};
use crate::Result;
use anyhow::Context;
use chrono::{DateTime, Utc};
use tracing::{debug, info};

/// Everything one run produces
#[derive(Debug, Clone)]
pub struct Report {
    /// Marathons in ordinal order
    pub marathons: Vec<Marathon>,
    /// Zero point of the shared timeline
    pub root: DateTime<Utc>,
    /// Anchors of the aligned marathons, by id
    pub anchors: Vec<MarathonAnchor>,
    pub series: SeriesSet,
    /// Ordered by marathon id descending
    pub peaks: Vec<PeakSummary>,
    pub resolve: ResolveSummary,
    pub buckets: BucketStats,
}

/// Run the pipeline over a snapshot
///
/// # Errors
///
/// [`PipelineError::EmptyDataset`] when no marathon can be anchored.
pub fn run(mut snapshot: Snapshot, alignment: &AlignmentConfig) -> std::result::Result<Report, PipelineError> {
    let resolve = snapshot.resolve_references();
    if resolve != ResolveSummary::default() {
        info!(
            dropped_samples = resolve.dropped_samples,
            dropped_games = resolve.dropped_games,
            "dropped records referencing unknown marathons"
        );
    }

    let timeline = Timeline::build(&snapshot, alignment.anchor, alignment.kickoff_hour)?;
    info!(
        root = %timeline.root(),
        aligned = timeline.len(),
        marathons = snapshot.marathons.len(),
        "timeline aligned"
    );
    for anchor in timeline.anchors() {
        debug!(
            marathon = anchor.marathon,
            first_seen = %anchor.first_seen,
            kickoff = %anchor.kickoff,
            "anchor"
        );
    }

    let mut aggregator = BucketAggregator::new(&timeline, alignment.bucket_seconds);
    aggregator.add_samples(&snapshot.samples);
    let buckets = aggregator.finish();
    let bucket_stats = buckets.stats();
    info!(
        buckets = buckets.len(),
        accepted = bucket_stats.accepted,
        before_kickoff = bucket_stats.before_kickoff,
        unaligned = bucket_stats.unaligned,
        "samples bucketed"
    );

    let series = SeriesSet::assemble(&snapshot.marathons, &buckets);
    let peaks = peak::summarize(&snapshot);
    debug!(points = series.len(), peaks = peaks.len(), "series assembled");

    Ok(Report {
        root: timeline.root(),
        anchors: timeline.anchors().copied().collect(),
        marathons: snapshot.marathons,
        series,
        peaks,
        resolve,
        buckets: bucket_stats,
    })
}

/// Snapshot a store and run the pipeline over it
pub fn run_store<S: SampleStore + ?Sized>(store: &S, alignment: &AlignmentConfig) -> Result<Report> {
    let snapshot = store.snapshot().context("Failed to read dataset snapshot")?;
    debug!(
        marathons = snapshot.marathons.len(),
        samples = snapshot.samples.len(),
        games = snapshot.games.len(),
        "snapshot loaded"
    );

    Ok(run(snapshot, alignment)?)
}

/// Read the configured database, run the pipeline, and write the output document
///
/// The document is only written after the whole run succeeded; on any error an
/// existing output file is left as it was.
pub fn generate(config: &Config) -> Result<Report> {
    let store = SqliteStore::open_read_only(&config.database)?;
    let report = run_store(&store, &config.alignment)?;

    json::write_report(&config.output.path, &report, config.output.pretty)?;
    info!(
        path = %config.output.path.display(),
        points = report.series.len(),
        marathons = report.marathons.len(),
        "output written"
    );

    Ok(report)
}
