use std::io;
use std::path::Path;
use std::time::SystemTime;

use chrono::{DateTime, Local};
use thiserror::Error;

use crate::trial::{Region, Trial};

#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
#[error("no session has been started")]
pub struct NotStartedError;

#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
#[error("no region time recorded")]
pub struct NoDataError;

/// Per-region line of a generated report.
#[derive(Clone, Copy, Debug)]
pub struct RegionTotal {
    pub region: Region,
    pub seconds: f64,
    pub percent: f64,
}

/// Point-in-time summary of a session. Derived from the timer on request and
/// owned by the caller; never written back.
#[derive(Clone, Debug)]
pub struct Report {
    pub subject_id: String,
    pub generated_at: DateTime<Local>,
    pub planned_secs: usize,
    pub effective_secs: f64,
    pub totals: [RegionTotal; 3],
}

/// Floor for the effective duration, so a session stopped before its first
/// tick cannot divide the percentages by zero.
const MIN_EFFECTIVE_SECS: f64 = 0.001;

impl Report {
    pub fn generate(trial: &Trial) -> Result<Self, NotStartedError> {
        Self::generate_at(trial, SystemTime::now())
    }

    /// Builds a report from the trial as of `now`. A running session reports
    /// elapsed time so far; a stopped one reports planned time minus the
    /// countdown frozen at stop, which keeps early manual stops accurate.
    pub fn generate_at(trial: &Trial, now: SystemTime) -> Result<Self, NotStartedError> {
        let started = trial.started_at().ok_or(NotStartedError)?;

        let effective = if trial.is_running() {
            now.duration_since(started).unwrap_or_default().as_secs_f64()
        } else {
            trial.planned_secs() as f64 - trial.remaining_secs()
        };
        let effective = if effective <= 0.0 {
            MIN_EFFECTIVE_SECS
        } else {
            effective
        };

        let snapshot = trial.snapshot_at(now);
        let totals = snapshot.regions.map(|r| RegionTotal {
            region: r.region,
            seconds: r.accumulated_secs,
            percent: 100.0 * r.accumulated_secs / effective,
        });

        Ok(Self {
            subject_id: trial.subject_id().to_string(),
            generated_at: Local::now(),
            planned_secs: trial.planned_secs(),
            effective_secs: effective,
            totals,
        })
    }

    /// Renders the exportable report text. Region order is fixed and every
    /// figure is printed with two decimals.
    pub fn to_text(&self) -> String {
        let mut text = String::from("--- Open Field Test Report ---\n\n");
        text.push_str(&format!("Subject ID: {}\n", self.subject_id));
        text.push_str(&format!(
            "Date/Time: {}\n",
            self.generated_at.format("%Y-%m-%d %H:%M:%S")
        ));
        text.push_str(&format!("Planned Duration: {} seconds\n", self.planned_secs));
        text.push_str(&format!(
            "Effective Duration: {:.2} seconds\n\n",
            self.effective_secs
        ));
        text.push_str("Accumulated Time per Region:\n");
        for total in &self.totals {
            text.push_str(&format!(
                "  {}: {:.2} seconds ({:.2}%)\n",
                total.region, total.seconds, total.percent
            ));
        }
        text
    }

    /// Chart series with never-visited regions dropped, so a region the
    /// subject never entered does not show up as a zero-size slice.
    pub fn chart_data(&self) -> Result<Vec<(Region, f64)>, NoDataError> {
        let data: Vec<(Region, f64)> = self
            .totals
            .iter()
            .filter(|t| t.seconds > 0.0)
            .map(|t| (t.region, t.seconds))
            .collect();
        if data.is_empty() {
            return Err(NoDataError);
        }
        Ok(data)
    }

    /// Writes the rendered report text verbatim as UTF-8.
    pub fn export<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        std::fs::write(path, self.to_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn base() -> SystemTime {
        SystemTime::UNIX_EPOCH + Duration::from_secs(1_750_000_000)
    }

    fn at(secs: u64) -> SystemTime {
        base() + Duration::from_secs(secs)
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn report_before_any_start_fails() {
        let trial = Trial::new();
        let err = Report::generate_at(&trial, base()).unwrap_err();
        assert_eq!(err, NotStartedError);
    }

    #[test]
    fn percentages_are_independent_per_region() {
        let mut trial = Trial::new();
        trial.start_at("rat-9", 100, base()).unwrap();
        trial.press_at(Region::Corner, at(0));
        trial.release_at(Region::Corner, at(30));
        trial.on_tick_at(at(100));

        let report = Report::generate_at(&trial, at(100)).unwrap();

        assert!(approx(report.effective_secs, 100.0));
        assert!(approx(report.totals[0].seconds, 30.0));
        assert!(approx(report.totals[0].percent, 30.0));
        assert!(approx(report.totals[1].percent, 0.0));
        assert!(approx(report.totals[2].percent, 0.0));

        let chart = report.chart_data().unwrap();
        assert_eq!(chart.len(), 1);
        assert_eq!(chart[0].0, Region::Corner);
        assert!(approx(chart[0].1, 30.0));
    }

    #[test]
    fn running_report_uses_elapsed_time_and_live_intervals() {
        let mut trial = Trial::new();
        trial.start_at("rat-3", 60, base()).unwrap();
        trial.press_at(Region::Center, at(0));

        let report = Report::generate_at(&trial, at(10)).unwrap();

        assert!(approx(report.effective_secs, 10.0));
        assert!(approx(report.totals[2].seconds, 10.0));
        assert!(approx(report.totals[2].percent, 100.0));
    }

    #[test]
    fn early_manual_stop_reports_elapsed_portion() {
        let mut trial = Trial::new();
        trial.start_at("rat-7", 60, base()).unwrap();
        trial.press_at(Region::Center, at(0));
        trial.release_at(Region::Center, at(10));
        trial.on_tick_at(at(10));
        trial.stop_at(true, at(10));

        let report = Report::generate_at(&trial, at(10)).unwrap();

        assert!(approx(report.effective_secs, 10.0));
        assert!(approx(report.totals[2].seconds, 10.0));
        assert!(approx(report.totals[2].percent, 100.0));
        assert!(approx(report.totals[0].seconds, 0.0));
        assert!(approx(report.totals[1].seconds, 0.0));
    }

    #[test]
    fn stop_before_first_tick_falls_back_to_epsilon_floor() {
        let mut trial = Trial::new();
        trial.start_at("rat-1", 60, base()).unwrap();
        trial.stop_at(true, base());

        let report = Report::generate_at(&trial, base()).unwrap();

        assert_eq!(report.effective_secs, 0.001);
        for total in &report.totals {
            assert_eq!(total.percent, 0.0);
        }
    }

    #[test]
    fn text_layout_is_deterministic() {
        let mut trial = Trial::new();
        trial.start_at("rat-9", 100, base()).unwrap();
        trial.press_at(Region::Corner, at(0));
        trial.release_at(Region::Corner, at(30));
        trial.on_tick_at(at(100));

        let report = Report::generate_at(&trial, at(100)).unwrap();
        let text = report.to_text();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "--- Open Field Test Report ---");
        assert_eq!(lines[2], "Subject ID: rat-9");
        assert!(lines[3].starts_with("Date/Time: "));
        assert_eq!(lines[4], "Planned Duration: 100 seconds");
        assert_eq!(lines[5], "Effective Duration: 100.00 seconds");
        assert_eq!(lines[7], "Accumulated Time per Region:");
        assert_eq!(lines[8], "  Corner: 30.00 seconds (30.00%)");
        assert_eq!(lines[9], "  Lateral: 0.00 seconds (0.00%)");
        assert_eq!(lines[10], "  Center: 0.00 seconds (0.00%)");
    }

    #[test]
    fn chart_data_with_nothing_recorded_is_an_error() {
        let mut trial = Trial::new();
        trial.start_at("rat-1", 60, base()).unwrap();
        trial.on_tick_at(at(60));

        let report = Report::generate_at(&trial, at(60)).unwrap();
        assert_eq!(report.chart_data(), Err(NoDataError));
    }

    #[test]
    fn export_writes_report_text_verbatim() {
        let mut trial = Trial::new();
        trial.start_at("rat-5", 30, base()).unwrap();
        trial.press_at(Region::Lateral, at(0));
        trial.release_at(Region::Lateral, at(6));
        trial.on_tick_at(at(30));

        let report = Report::generate_at(&trial, at(30)).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.txt");
        report.export(&path).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, report.to_text());
        assert!(written.contains("Lateral: 6.00 seconds (20.00%)"));
    }
}
