use crate::report::{NoDataError, Report};

/// One renderable bar: region label, bar magnitude, and the value text drawn
/// on the bar. Magnitudes are in centiseconds so short sessions still get
/// visible bars.
pub fn chart_bars(report: &Report) -> Result<Vec<(&'static str, u64, String)>, NoDataError> {
    let data = report.chart_data()?;
    Ok(data
        .into_iter()
        .map(|(region, secs)| (region.label(), (secs * 100.0).round() as u64, format!("{secs:.2} s")))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trial::{Region, Trial};
    use std::time::{Duration, SystemTime};

    fn base() -> SystemTime {
        SystemTime::UNIX_EPOCH + Duration::from_secs(1_750_000_000)
    }

    fn at(secs: u64) -> SystemTime {
        base() + Duration::from_secs(secs)
    }

    #[test]
    fn test_chart_bars_drop_zero_regions() {
        let mut trial = Trial::new();
        trial.start_at("rat-1", 60, base()).unwrap();
        trial.press_at(Region::Corner, at(0));
        trial.release_at(Region::Corner, at(12));
        trial.on_tick_at(at(60));

        let report = Report::generate_at(&trial, at(60)).unwrap();
        let bars = chart_bars(&report).unwrap();

        assert_eq!(bars.len(), 1);
        assert_eq!(bars[0].0, "Corner");
        assert_eq!(bars[0].1, 1200);
        assert_eq!(bars[0].2, "12.00 s");
    }

    #[test]
    fn test_chart_bars_without_data() {
        let mut trial = Trial::new();
        trial.start_at("rat-1", 60, base()).unwrap();
        trial.on_tick_at(at(60));

        let report = Report::generate_at(&trial, at(60)).unwrap();
        assert_eq!(chart_bars(&report), Err(NoDataError));
    }
}
