//! Configuration module
//!
//! Handles CLI argument parsing, TOML configuration files, and validation.
//! Values come from built-in defaults, then an optional TOML file, then the
//! command line (highest precedence).

pub mod cli;
pub mod cli_convert;
pub mod toml;
pub mod validator;

use crate::bucket::DEFAULT_BUCKET_SECONDS;
use crate::timeline::AnchorSource;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Default wall-clock hour (UTC) at which marathons are treated as starting
pub const DEFAULT_KICKOFF_HOUR: u32 = 15;

/// Complete run configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// SQLite database holding marathons, games, and viewer samples
    #[serde(default = "default_database")]
    pub database: PathBuf,
    #[serde(default)]
    pub alignment: AlignmentConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub import: ImportConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: default_database(),
            alignment: AlignmentConfig::default(),
            output: OutputConfig::default(),
            import: ImportConfig::default(),
        }
    }
}

/// Timeline alignment and bucketing settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignmentConfig {
    /// Records that define each marathon's first-seen instant
    #[serde(default)]
    pub anchor: AnchorSource,
    /// Hour of day (0-23, UTC) used as the kickoff instant
    #[serde(default = "default_kickoff_hour")]
    pub kickoff_hour: u32,
    /// Bucket width in seconds
    #[serde(default = "default_bucket_seconds")]
    pub bucket_seconds: i64,
}

impl Default for AlignmentConfig {
    fn default() -> Self {
        Self {
            anchor: AnchorSource::default(),
            kickoff_hour: DEFAULT_KICKOFF_HOUR,
            bucket_seconds: DEFAULT_BUCKET_SECONDS,
        }
    }
}

/// Output document settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Where the JSON document is written
    #[serde(default = "default_output_path")]
    pub path: PathBuf,
    /// Pretty-print the JSON document
    #[serde(default)]
    pub pretty: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: default_output_path(),
            pretty: false,
        }
    }
}

/// Import settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportConfig {
    /// Directory holding `<marathon name>.json` stats files
    #[serde(default = "default_stats_dir")]
    pub stats_dir: PathBuf,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            stats_dir: default_stats_dir(),
        }
    }
}

fn default_database() -> PathBuf {
    PathBuf::from("gdq.db")
}

fn default_kickoff_hour() -> u32 {
    DEFAULT_KICKOFF_HOUR
}

fn default_bucket_seconds() -> i64 {
    DEFAULT_BUCKET_SECONDS
}

fn default_output_path() -> PathBuf {
    PathBuf::from("out.json")
}

fn default_stats_dir() -> PathBuf {
    PathBuf::from(".")
}

impl fmt::Display for AlignmentConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "anchor={}, kickoff={:02}:00 UTC, bucket={}s",
            self.anchor, self.kickoff_hour, self.bucket_seconds
        )
    }
}
