//! Human-readable console summary

use crate::pipeline::Report;
use crate::util::time::{format_instant, format_offset};
use std::fmt;

const RULE: &str = "═══════════════════════════════════════════════════════════";

/// Print the run summary to stdout
pub fn print_report(report: &Report) {
    print!("{}", report);
}

/// Run summary
///
/// Shows the shared timeline, per-marathon alignment, and the peak-viewer
/// table in the same order as the output document.
impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", RULE)?;
        writeln!(f, "                  MARATHON COMPARISON")?;
        writeln!(f, "{}", RULE)?;
        writeln!(f)?;

        writeln!(f, "Timeline:")?;
        writeln!(f, "  Root:     {}", format_instant(self.root))?;
        writeln!(f, "  Buckets:  {}", format_number(self.series.len() as i64))?;
        writeln!(
            f,
            "  Samples:  {} bucketed, {} before kickoff, {} unaligned",
            format_number(self.buckets.accepted as i64),
            format_number(self.buckets.before_kickoff as i64),
            format_number(self.buckets.unaligned as i64)
        )?;
        if self.resolve.dropped_samples > 0 || self.resolve.dropped_games > 0 {
            writeln!(
                f,
                "  Dropped:  {} samples, {} games (unknown marathon)",
                self.resolve.dropped_samples, self.resolve.dropped_games
            )?;
        }
        writeln!(f)?;

        writeln!(f, "Marathons:")?;
        for marathon in &self.marathons {
            match self.anchors.iter().find(|a| a.marathon == marathon.id) {
                Some(anchor) => writeln!(
                    f,
                    "  [{}] {:<24} kickoff {}  offset {}",
                    marathon.id,
                    marathon.name,
                    format_instant(anchor.kickoff),
                    format_offset(anchor.kickoff - self.root)
                )?,
                None => writeln!(f, "  [{}] {:<24} (no data)", marathon.id, marathon.name)?,
            }
        }
        writeln!(f)?;

        writeln!(f, "Peak viewers:")?;
        if self.peaks.is_empty() {
            writeln!(f, "  (none)")?;
        }
        for peak in &self.peaks {
            writeln!(
                f,
                "  {:<24} {:>10} viewers at {}  playing {}",
                peak.name,
                format_number(peak.max_viewers),
                format_instant(peak.max_viewers_ts),
                peak.max_viewers_game.as_deref().unwrap_or("none")
            )?;
            if let Some(donations) = peak.max_donations {
                writeln!(f, "  {:<24} {:>10} raised", "", format_money(donations))?;
            }
        }

        writeln!(f, "{}", RULE)
    }
}

/// Format a number with thousands separators
fn format_number(n: i64) -> String {
    let s = n.unsigned_abs().to_string();
    let mut result = String::new();

    for (count, c) in s.chars().rev().enumerate() {
        if count > 0 && count % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    if n < 0 {
        result.push('-');
    }

    result.chars().rev().collect()
}

/// Format a donation total as dollars and cents
fn format_money(amount: f64) -> String {
    let cents = (amount * 100.0).round() as i64;
    let sign = if cents < 0 { "-" } else { "" };
    let cents = cents.unsigned_abs();
    format!("{}${}.{:02}", sign, format_number((cents / 100) as i64), cents % 100)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bucket::BucketStats;
    use crate::model::Marathon;
    use crate::peak::PeakSummary;
    use crate::series::SeriesSet;
    use crate::store::ResolveSummary;
    use crate::timeline::MarathonAnchor;
    use crate::util::time::from_epoch;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1000), "1,000");
        assert_eq!(format_number(1234567), "1,234,567");
        assert_eq!(format_number(-1234), "-1,234");
    }

    #[test]
    fn test_format_money() {
        assert_eq!(format_money(0.0), "$0.00");
        assert_eq!(format_money(1234.5), "$1,234.50");
        assert_eq!(format_money(3_163_420.66), "$3,163,420.66");
        assert_eq!(format_money(-0.5), "-$0.50");
        assert_eq!(format_money(-1234.5), "-$1,234.50");
    }

    #[test]
    fn test_report_display() {
        let root = from_epoch(1_625_410_800).unwrap();
        let report = Report {
            marathons: vec![Marathon::new(0, "SGDQ 2021"), Marathon::new(1, "Empty")],
            root,
            anchors: vec![MarathonAnchor::new(0, from_epoch(1_625_411_100).unwrap(), 15)],
            series: SeriesSet {
                ts: vec![1_625_411_100],
                viewers: vec![vec![Some(1200)], vec![None]],
                donations: vec![vec![Some(150.5)], vec![None]],
            },
            peaks: vec![PeakSummary {
                marathon: 0,
                name: "SGDQ 2021".to_string(),
                max_donations: Some(150.5),
                max_viewers: 1200,
                max_viewers_ts: from_epoch(1_625_411_100).unwrap(),
                max_viewers_game: None,
            }],
            resolve: ResolveSummary::default(),
            buckets: BucketStats { accepted: 1, before_kickoff: 0, unaligned: 0 },
        };

        let text = report.to_string();
        assert!(text.contains("Root:     2021-07-04 15:00:00 UTC"));
        assert!(text.contains("offset 0d 00h 00m"));
        assert!(text.contains("[1] Empty"));
        assert!(text.contains("(no data)"));
        assert!(text.contains("1,200 viewers at 2021-07-04 15:05:00 UTC  playing none"));
        assert!(text.contains("$150.50 raised"));
        assert!(!text.contains("Dropped"));
    }
}
