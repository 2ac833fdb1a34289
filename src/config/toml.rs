//! TOML configuration file parsing

use super::*;
use crate::config::cli::{Cli, Command};
use crate::config::cli_convert::{convert_anchor, parse_bucket_width};
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Parse TOML configuration file
pub fn parse_toml_file(path: &Path) -> Result<Config> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    parse_toml_string(&contents)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Parse TOML configuration from string
pub fn parse_toml_string(contents: &str) -> Result<Config> {
    let config: Config = ::toml::from_str(contents)
        .context("Failed to parse TOML configuration")?;

    Ok(config)
}

/// Load the config file named on the command line (or defaults) and apply CLI overrides
pub fn load_config(cli: &Cli) -> Result<Config> {
    let config = match cli.config {
        Some(ref path) => parse_toml_file(path)?,
        None => Config::default(),
    };

    merge_cli_with_config(cli, config)
}

/// Merge CLI arguments with TOML configuration (CLI takes precedence)
pub fn merge_cli_with_config(cli: &Cli, mut config: Config) -> Result<Config> {
    if let Some(ref database) = cli.database {
        config.database = database.clone();
    }

    match &cli.command {
        Command::Generate(args) => {
            if let Some(ref path) = args.output {
                config.output.path = path.clone();
            }
            if args.pretty {
                config.output.pretty = true;
            }
            if let Some(anchor) = args.anchor {
                config.alignment.anchor = convert_anchor(anchor);
            }
            if let Some(hour) = args.kickoff_hour {
                config.alignment.kickoff_hour = hour;
            }
            if let Some(ref width) = args.bucket {
                config.alignment.bucket_seconds = parse_bucket_width(width)?;
            }
        }
        Command::Import(args) => {
            if let Some(ref dir) = args.stats_dir {
                config.import.stats_dir = dir.clone();
            }
        }
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::cli::{self, GenerateArgs, ImportArgs};
    use crate::timeline::AnchorSource;
    use std::io::Write;
    use std::path::PathBuf;
    use tempfile::NamedTempFile;

    fn generate_cli(args: GenerateArgs) -> Cli {
        Cli {
            config: None,
            database: None,
            debug: false,
            command: Command::Generate(args),
        }
    }

    #[test]
    fn test_parse_full_config() {
        let config = parse_toml_string(
            r#"
            database = "/data/gdq.db"

            [alignment]
            anchor = "games"
            kickoff_hour = 16
            bucket_seconds = 900

            [output]
            path = "/srv/www/out.json"
            pretty = true

            [import]
            stats_dir = "/data/agdq-stats"
            "#,
        )
        .unwrap();

        assert_eq!(config.database, PathBuf::from("/data/gdq.db"));
        assert_eq!(config.alignment.anchor, AnchorSource::Games);
        assert_eq!(config.alignment.kickoff_hour, 16);
        assert_eq!(config.alignment.bucket_seconds, 900);
        assert_eq!(config.output.path, PathBuf::from("/srv/www/out.json"));
        assert!(config.output.pretty);
        assert_eq!(config.import.stats_dir, PathBuf::from("/data/agdq-stats"));
    }

    #[test]
    fn test_parse_partial_config_uses_defaults() {
        let config = parse_toml_string("[alignment]\nkickoff_hour = 12\n").unwrap();
        assert_eq!(config.alignment.kickoff_hour, 12);
        assert_eq!(config.alignment.bucket_seconds, 300);
        assert_eq!(config.database, PathBuf::from("gdq.db"));

        assert_eq!(parse_toml_string("").unwrap(), Config::default());
    }

    #[test]
    fn test_parse_invalid_config() {
        assert!(parse_toml_string("[alignment]\nanchor = \"donations\"\n").is_err());
        assert!(parse_toml_string("database = ").is_err());
    }

    #[test]
    fn test_parse_toml_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "database = \"from-file.db\"").unwrap();

        let config = parse_toml_file(file.path()).unwrap();
        assert_eq!(config.database, PathBuf::from("from-file.db"));

        assert!(parse_toml_file(Path::new("/nonexistent/marathon-stats.toml")).is_err());
    }

    #[test]
    fn test_cli_overrides_file() {
        let file_config = parse_toml_string(
            "database = \"file.db\"\n[alignment]\nbucket_seconds = 60\nkickoff_hour = 9\n",
        )
        .unwrap();

        let mut cli = generate_cli(GenerateArgs {
            output: Some(PathBuf::from("cli.json")),
            bucket: Some("10m".to_string()),
            anchor: Some(cli::AnchorArg::Games),
            ..GenerateArgs::default()
        });
        cli.database = Some(PathBuf::from("cli.db"));

        let config = merge_cli_with_config(&cli, file_config).unwrap();
        assert_eq!(config.database, PathBuf::from("cli.db"));
        assert_eq!(config.output.path, PathBuf::from("cli.json"));
        assert_eq!(config.alignment.bucket_seconds, 600);
        assert_eq!(config.alignment.anchor, AnchorSource::Games);
        // not given on the command line, so the file value stays
        assert_eq!(config.alignment.kickoff_hour, 9);
    }

    #[test]
    fn test_import_overrides() {
        let cli = Cli {
            config: None,
            database: None,
            debug: false,
            command: Command::Import(ImportArgs {
                name: "AGDQ 2022".to_string(),
                stats_dir: Some(PathBuf::from("/tmp/stats")),
                ..ImportArgs::default()
            }),
        };

        let config = merge_cli_with_config(&cli, Config::default()).unwrap();
        assert_eq!(config.import.stats_dir, PathBuf::from("/tmp/stats"));
    }

    #[test]
    fn test_invalid_bucket_on_cli() {
        let cli = generate_cli(GenerateArgs {
            bucket: Some("soon".to_string()),
            ..GenerateArgs::default()
        });
        assert!(merge_cli_with_config(&cli, Config::default()).is_err());
    }
}
