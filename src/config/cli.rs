//! CLI argument parsing using clap

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Anchor source as accepted on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AnchorArg {
    /// Earliest viewer sample of each marathon
    Samples,
    /// Earliest game change of each marathon
    Games,
}

/// marathon-stats - align marathon viewership and donations onto one timeline
#[derive(Parser, Debug)]
#[command(name = "marathon-stats")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// TOML configuration file
    #[arg(short = 'c', long, global = true, env = "MARATHON_STATS_CONFIG")]
    pub config: Option<PathBuf>,

    /// SQLite database file (default: gdq.db)
    #[arg(long, global = true, env = "MARATHON_STATS_DB")]
    pub database: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build the combined time-aligned dataset and peak summary
    Generate(GenerateArgs),
    /// Load one marathon's stats file into the database
    Import(ImportArgs),
}

#[derive(Args, Debug, Default)]
pub struct GenerateArgs {
    /// Output JSON file (default: out.json)
    #[arg(short = 'o', long)]
    pub output: Option<PathBuf>,

    /// Pretty-print the JSON document
    #[arg(long)]
    pub pretty: bool,

    /// Records that define each marathon's start
    #[arg(long, value_enum)]
    pub anchor: Option<AnchorArg>,

    /// Kickoff hour of day, UTC (0-23)
    #[arg(long)]
    pub kickoff_hour: Option<u32>,

    /// Bucket width (e.g., 300, 300s, 5m)
    #[arg(long)]
    pub bucket: Option<String>,

    /// Don't print the summary to stdout
    #[arg(short = 'q', long)]
    pub quiet: bool,
}

#[derive(Args, Debug, Default)]
pub struct ImportArgs {
    /// Display name of the marathon
    #[arg(value_name = "NAME")]
    pub name: String,

    /// Stats file to import (default: <stats-dir>/<NAME>.json)
    #[arg(short = 'f', long)]
    pub file: Option<PathBuf>,

    /// Directory holding stats files
    #[arg(long)]
    pub stats_dir: Option<PathBuf>,

    /// Create the marathon if it does not exist yet
    #[arg(long)]
    pub create: bool,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate CLI arguments
    pub fn validate(&self) -> anyhow::Result<()> {
        match &self.command {
            Command::Generate(args) => {
                if let Some(hour) = args.kickoff_hour {
                    if hour > 23 {
                        anyhow::bail!("kickoff-hour must be between 0 and 23, got {}", hour);
                    }
                }
            }
            Command::Import(args) => {
                if args.name.trim().is_empty() {
                    anyhow::bail!("marathon name must not be empty");
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_generate() {
        let cli = Cli::try_parse_from([
            "marathon-stats",
            "--database",
            "stats.db",
            "generate",
            "-o",
            "combined.json",
            "--anchor",
            "games",
            "--bucket",
            "15m",
        ])
        .unwrap();

        assert_eq!(cli.database, Some(PathBuf::from("stats.db")));
        match cli.command {
            Command::Generate(args) => {
                assert_eq!(args.output, Some(PathBuf::from("combined.json")));
                assert_eq!(args.anchor, Some(AnchorArg::Games));
                assert_eq!(args.bucket.as_deref(), Some("15m"));
                assert!(!args.pretty);
            }
            Command::Import(_) => panic!("expected generate"),
        }
    }

    #[test]
    fn test_parse_import() {
        let cli = Cli::try_parse_from(["marathon-stats", "import", "AGDQ 2022", "--create", "--debug"])
            .unwrap();

        assert!(cli.debug);
        match cli.command {
            Command::Import(args) => {
                assert_eq!(args.name, "AGDQ 2022");
                assert!(args.create);
                assert!(args.file.is_none());
            }
            Command::Generate(_) => panic!("expected import"),
        }
    }

    #[test]
    fn test_import_requires_name() {
        assert!(Cli::try_parse_from(["marathon-stats", "import"]).is_err());
    }

    #[test]
    fn test_validate_kickoff_hour() {
        let cli = Cli::try_parse_from(["marathon-stats", "generate", "--kickoff-hour", "24"]).unwrap();
        assert!(cli.validate().is_err());

        let cli = Cli::try_parse_from(["marathon-stats", "generate", "--kickoff-hour", "0"]).unwrap();
        assert!(cli.validate().is_ok());
    }

    #[test]
    fn test_validate_blank_name() {
        let cli = Cli::try_parse_from(["marathon-stats", "import", "  "]).unwrap();
        assert!(cli.validate().is_err());
    }
}
