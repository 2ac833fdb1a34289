//! marathon-stats - multi-marathon viewership comparison
//!
//! Fundraising marathons are recorded independently and start on different
//! calendar dates. This crate aligns their viewer and donation samples onto one
//! synthetic timeline so they can be compared directly.
//!
//! # Architecture
//!
//! - **Store**: marathons, game changes, and viewer samples (in memory or SQLite)
//! - **Timeline**: per-marathon kickoff instants, a global root, and offsets
//! - **Buckets**: shifted samples floored onto a fixed grid with max-aggregation
//! - **Series**: one shared time axis plus ordinal-indexed value arrays
//! - **Peaks**: highest viewer count per marathon and the game on at that moment
//! - **Import**: loading a marathon's stats file into the store

pub mod bucket;
pub mod config;
pub mod error;
pub mod import;
pub mod model;
pub mod output;
pub mod peak;
pub mod pipeline;
pub mod series;
pub mod store;
pub mod timeline;
pub mod util;

// Re-export commonly used types
pub use config::Config;
pub use error::{ImportError, PipelineError};
pub use pipeline::Report;
pub use store::{SampleStore, Snapshot};

/// Result type used throughout marathon-stats
pub type Result<T> = anyhow::Result<T>;
