use crate::types::rain_status::RainStatus;
use crate::types::record::FetchOutcome;
use crate::types::station_window::QueryWindow;

/// Turns a fetch outcome into the rain status of one date.
///
/// Ineligible dates are `Pass` whatever was fetched. A failed fetch, or a
/// successful one without a single record, is `Fail`. Otherwise records inside
/// `window` (both ends inclusive) with a non-zero amount make the date
/// `RainDetected`, listed as `HH:MM` in the order received.
pub fn classify(eligible: bool, outcome: &FetchOutcome, window: &QueryWindow) -> RainStatus {
    if !eligible {
        return RainStatus::Pass;
    }

    let records = match outcome {
        FetchOutcome::Success(records) if !records.is_empty() => records,
        _ => return RainStatus::Fail,
    };

    let rain_times: Vec<String> = records
        .iter()
        .filter(|record| window.contains(record.observed_at) && record.is_wet())
        .map(|record| record.observed_at.format("%H:%M").to_string())
        .collect();

    if rain_times.is_empty() {
        RainStatus::NoRain
    } else {
        RainStatus::RainDetected(rain_times)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::precipitation::error::FetchFailure;
    use crate::types::record::PrecipitationRecord;
    use crate::types::station_window::parse_hhmm;
    use std::time::Duration;

    fn window(start: &str, end: &str) -> QueryWindow {
        QueryWindow::new(parse_hhmm(start).unwrap(), parse_hhmm(end).unwrap())
    }

    fn records(rows: &[(&str, f64)]) -> FetchOutcome {
        FetchOutcome::Success(
            rows.iter()
                .map(|(t, amount)| PrecipitationRecord::new(parse_hhmm(t).unwrap(), *amount))
                .collect(),
        )
    }

    #[test]
    fn test_rain_detected_in_window() {
        let outcome = records(&[("1030", 0.0), ("1130", 0.5)]);
        assert_eq!(
            classify(true, &outcome, &window("1000", "1600")),
            RainStatus::RainDetected(vec!["11:30".to_string()])
        );
    }

    #[test]
    fn test_all_zero_is_no_rain() {
        let outcome = records(&[("1000", 0.0), ("1001", 0.0), ("1559", 0.0)]);
        assert_eq!(
            classify(true, &outcome, &window("1000", "1600")),
            RainStatus::NoRain
        );
    }

    #[test]
    fn test_ineligible_is_pass_regardless_of_outcome() {
        let wet = records(&[("1130", 2.0)]);
        let failed = FetchOutcome::Failure(FetchFailure::Timeout(Duration::from_secs(20)));
        assert_eq!(classify(false, &wet, &window("1000", "1600")), RainStatus::Pass);
        assert_eq!(classify(false, &failed, &window("1000", "1600")), RainStatus::Pass);
    }

    #[test]
    fn test_failure_and_empty_are_fail() {
        let failed = FetchOutcome::Failure(FetchFailure::HttpStatus(502));
        assert_eq!(classify(true, &failed, &window("1000", "1600")), RainStatus::Fail);
        assert_eq!(
            classify(true, &FetchOutcome::Success(vec![]), &window("1000", "1600")),
            RainStatus::Fail
        );
    }

    #[test]
    fn test_window_bounds_are_inclusive() {
        let outcome = records(&[("0959", 1.0), ("1000", 0.5), ("1230", 0.5), ("1231", 0.5)]);
        assert_eq!(
            classify(true, &outcome, &window("1000", "1230")),
            RainStatus::RainDetected(vec!["10:00".to_string(), "12:30".to_string()])
        );
    }

    #[test]
    fn test_order_is_preserved() {
        let outcome = records(&[("1400", 0.5), ("1015", 0.5), ("1200", 0.0), ("1500", 1.5)]);
        assert_eq!(
            classify(true, &outcome, &window("1000", "1600")),
            RainStatus::RainDetected(vec![
                "14:00".to_string(),
                "10:15".to_string(),
                "15:00".to_string()
            ])
        );
    }

    #[test]
    fn test_classification_is_idempotent() {
        let outcome = records(&[("1030", 0.0), ("1130", 0.5)]);
        let w = window("1000", "1600");
        assert_eq!(classify(true, &outcome, &w), classify(true, &outcome, &w));
    }
}
