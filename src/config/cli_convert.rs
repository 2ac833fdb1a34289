//! CLI to Config conversion utilities

use crate::config::cli;
use crate::timeline::AnchorSource;
use anyhow::{Context, Result};

/// Parse a bucket width string (e.g., "300", "300s", "5m", "1h") to seconds
pub fn parse_bucket_width(s: &str) -> Result<i64> {
    let s = s.trim().to_lowercase();

    let (num_str, multiplier) = if s.ends_with("sec") || s.ends_with('s') {
        (s.trim_end_matches("sec").trim_end_matches('s'), 1i64)
    } else if s.ends_with("min") || s.ends_with('m') {
        (s.trim_end_matches("min").trim_end_matches('m'), 60)
    } else if s.ends_with("hr") || s.ends_with('h') {
        (s.trim_end_matches("hr").trim_end_matches('h'), 3600)
    } else {
        (s.as_str(), 1)
    };

    let num: i64 = num_str
        .trim()
        .parse()
        .with_context(|| format!("Invalid bucket width: {}", s))?;

    num.checked_mul(multiplier)
        .with_context(|| format!("Bucket width out of range: {}", s))
}

/// Convert CLI AnchorArg to timeline AnchorSource
pub fn convert_anchor(arg: cli::AnchorArg) -> AnchorSource {
    match arg {
        cli::AnchorArg::Samples => AnchorSource::Samples,
        cli::AnchorArg::Games => AnchorSource::Games,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bucket_width_seconds() {
        assert_eq!(parse_bucket_width("300").unwrap(), 300);
        assert_eq!(parse_bucket_width("300s").unwrap(), 300);
        assert_eq!(parse_bucket_width("300sec").unwrap(), 300);
    }

    #[test]
    fn test_parse_bucket_width_minutes() {
        assert_eq!(parse_bucket_width("5m").unwrap(), 300);
        assert_eq!(parse_bucket_width("15min").unwrap(), 900);
        assert_eq!(parse_bucket_width(" 5M ").unwrap(), 300);
    }

    #[test]
    fn test_parse_bucket_width_hours() {
        assert_eq!(parse_bucket_width("1h").unwrap(), 3600);
        assert_eq!(parse_bucket_width("2hr").unwrap(), 7200);
    }

    #[test]
    fn test_parse_bucket_width_invalid() {
        assert!(parse_bucket_width("five").is_err());
        assert!(parse_bucket_width("").is_err());
        assert!(parse_bucket_width("5d").is_err());
    }

    #[test]
    fn test_convert_anchor() {
        assert_eq!(convert_anchor(cli::AnchorArg::Samples), AnchorSource::Samples);
        assert_eq!(convert_anchor(cli::AnchorArg::Games), AnchorSource::Games);
    }
}
