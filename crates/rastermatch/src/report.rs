//! Result reporting: a terminal status line or a JSON record.

use std::time::Duration;

use serde::Serialize;

/// Outcome of one comparison run.
#[derive(Debug, Serialize)]
pub struct CompareReport {
    pub width: u32,
    pub height: u32,
    pub diff_pixels: u64,
    pub total_pixels: u64,
    /// 0.0 = identical, 1.0 = every pixel differs.
    pub score: f64,
    pub elapsed_ms: f64,
}

impl CompareReport {
    pub fn new(width: u32, height: u32, diff_pixels: u64, elapsed: Duration) -> Self {
        let total_pixels = u64::from(width) * u64::from(height);
        let score = if total_pixels > 0 {
            diff_pixels as f64 / total_pixels as f64
        } else {
            0.0
        };
        Self {
            width,
            height,
            diff_pixels,
            total_pixels,
            score,
            elapsed_ms: elapsed.as_secs_f64() * 1000.0,
        }
    }

    pub fn is_match(&self) -> bool {
        self.diff_pixels == 0
    }
}

pub fn format_duration(d: Duration) -> String {
    let ms = d.as_millis();
    if ms < 1000 {
        format!("{ms}ms")
    } else {
        format!("{:.1}s", d.as_secs_f64())
    }
}

/// Print the human-readable result line.
pub fn print_line(report: &CompareReport) {
    let time = format_duration(Duration::from_secs_f64(report.elapsed_ms / 1000.0));
    let time_suffix = format!("  \x1b[2m{time}\x1b[0m");

    if report.is_match() {
        println!(
            "  \x1b[32mMATCH\x1b[0m  {}x{}{time_suffix}",
            report.width, report.height
        );
    } else {
        println!(
            "  \x1b[31mDIFF\x1b[0m  {} of {} pixels ({:.2}%){time_suffix}",
            report.diff_pixels,
            report.total_pixels,
            report.score * 100.0
        );
    }
}

/// Print the result as a JSON record on stdout.
pub fn print_json(report: &CompareReport) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_is_diff_over_total() {
        let report = CompareReport::new(10, 10, 25, Duration::from_millis(5));
        assert_eq!(report.total_pixels, 100);
        assert_eq!(report.score, 0.25);
        assert!(!report.is_match());
    }

    #[test]
    fn empty_image_scores_zero() {
        let report = CompareReport::new(0, 0, 0, Duration::ZERO);
        assert_eq!(report.score, 0.0);
        assert!(report.is_match());
    }

    #[test]
    fn durations_format_in_ms_then_seconds() {
        assert_eq!(format_duration(Duration::from_millis(7)), "7ms");
        assert_eq!(format_duration(Duration::from_millis(2350)), "2.4s");
    }

    #[test]
    fn report_serializes_every_field() {
        let report = CompareReport::new(4, 2, 3, Duration::from_millis(12));
        let json = serde_json::to_string(&report).unwrap();
        for key in [
            "width",
            "height",
            "diff_pixels",
            "total_pixels",
            "score",
            "elapsed_ms",
        ] {
            assert!(json.contains(key), "missing {key}");
        }
    }
}
