//! Configuration validation

use super::*;
use anyhow::Result;

const SECONDS_PER_DAY: i64 = 24 * 60 * 60;

/// Validate complete configuration
pub fn validate_config(config: &Config) -> Result<()> {
    validate_alignment(&config.alignment)?;
    validate_output(&config.output)?;

    if config.database.as_os_str().is_empty() {
        anyhow::bail!("database path must not be empty");
    }

    Ok(())
}

/// Validate alignment configuration
pub fn validate_alignment(alignment: &AlignmentConfig) -> Result<()> {
    if alignment.kickoff_hour > 23 {
        anyhow::bail!(
            "kickoff_hour must be between 0 and 23, got {}",
            alignment.kickoff_hour
        );
    }

    if alignment.bucket_seconds <= 0 || alignment.bucket_seconds > SECONDS_PER_DAY {
        anyhow::bail!(
            "bucket_seconds must be between 1 and {}, got {}",
            SECONDS_PER_DAY,
            alignment.bucket_seconds
        );
    }

    Ok(())
}

/// Validate output configuration
pub fn validate_output(output: &OutputConfig) -> Result<()> {
    if output.path.as_os_str().is_empty() {
        anyhow::bail!("output path must not be empty");
    }

    if output.path.is_dir() {
        anyhow::bail!("output path is a directory: {}", output.path.display());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_kickoff_hour_bounds() {
        let mut alignment = AlignmentConfig::default();
        alignment.kickoff_hour = 23;
        assert!(validate_alignment(&alignment).is_ok());
        alignment.kickoff_hour = 24;
        assert!(validate_alignment(&alignment).is_err());
    }

    #[test]
    fn test_bucket_seconds_bounds() {
        let mut alignment = AlignmentConfig::default();
        for bad in [0, -300, SECONDS_PER_DAY + 1] {
            alignment.bucket_seconds = bad;
            assert!(validate_alignment(&alignment).is_err(), "{} accepted", bad);
        }
        for good in [1, 300, SECONDS_PER_DAY] {
            alignment.bucket_seconds = good;
            assert!(validate_alignment(&alignment).is_ok(), "{} rejected", good);
        }
    }

    #[test]
    fn test_output_path_checks() {
        let dir = TempDir::new().unwrap();
        let output = OutputConfig {
            path: dir.path().to_path_buf(),
            pretty: false,
        };
        assert!(validate_output(&output).is_err());

        let output = OutputConfig {
            path: PathBuf::new(),
            pretty: false,
        };
        assert!(validate_output(&output).is_err());
    }

    #[test]
    fn test_empty_database_path() {
        let config = Config {
            database: PathBuf::new(),
            ..Config::default()
        };
        assert!(validate_config(&config).is_err());
    }
}
