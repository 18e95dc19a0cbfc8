//! Parses the whitespace-delimited AWS minute-data table.
//!
//! The API answers with comment lines starting with `#` (header, legend,
//! end marker) and one data row per minute with a fixed 18-column layout.

use crate::precipitation::error::PayloadError;
use crate::types::record::PrecipitationRecord;
use crate::types::station_window::parse_hhmm;

/// Column layout of a data row.
pub const COLUMN_NAMES: [&str; 18] = [
    "YYMMDDHHMI", "STN", "WD1", "WS1", "WDS", "WSS", "WD10", "WS10", "TA", "RE", "RN-15m",
    "RN-60m", "RN-12H", "RN-DAY", "HM", "PA", "PS", "TD",
];

/// Name of the precipitation column. Its presence in a response body is also
/// how credential validation recognises a real data answer.
pub const PRECIPITATION_COLUMN: &str = "RE";

const TIMESTAMP_INDEX: usize = 0;
const PRECIPITATION_INDEX: usize = 9;

/// Parses a response body into records, in the order they appear.
///
/// Amounts that do not parse as a number, and negative "missing" sentinels,
/// are stored as 0.
pub fn parse_payload(text: &str) -> Result<Vec<PrecipitationRecord>, PayloadError> {
    let mut records = Vec::new();

    for (index, line) in text.lines().enumerate() {
        let line_no = index + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let fields: Vec<&str> = trimmed.split_whitespace().collect();
        if fields.len() <= PRECIPITATION_INDEX {
            return Err(PayloadError::TruncatedRow {
                line: line_no,
                expected: PRECIPITATION_INDEX + 1,
                found: fields.len(),
            });
        }

        let stamp = fields[TIMESTAMP_INDEX];
        let observed_at = minute_of(stamp).ok_or_else(|| PayloadError::BadTimestamp {
            line: line_no,
            value: stamp.to_string(),
        })?;

        records.push(PrecipitationRecord::new(
            observed_at,
            coerce_amount(fields[PRECIPITATION_INDEX]),
        ));
    }

    Ok(records)
}

// YYYYMMDDHHMI -> HHMM; the date part is implied by the query.
fn minute_of(stamp: &str) -> Option<chrono::NaiveTime> {
    if stamp.len() < 4 || !stamp.is_ascii() {
        return None;
    }
    parse_hhmm(&stamp[stamp.len() - 4..])
}

fn coerce_amount(raw: &str) -> f64 {
    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() && value > 0.0 => value,
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    const SAMPLE: &str = "\
#START7777
#--------------------------------------------------------------------------------------------------
#  YYMMDDHHMI STN  WD1   WS1  WDS   WSS  WD10  WS10    TA      RE  RN-15m  RN-60m  RN-12H  RN-DAY    HM      PA      PS    TD
#--------------------------------------------------------------------------------------------------
202407031000 400 250.3 1.2 245.1 1.9 248.0 1.1 27.3 0.0 0.0 0.0 0.0 0.0 81.2 1002.1 1008.7 23.8
202407031001 400 251.0 1.4 247.8 2.0 249.1 1.2 27.3 0.5 0.5 0.5 0.5 0.5 81.4 1002.1 1008.7 23.9
202407031002 400 251.0 1.4 247.8 2.0 249.1 1.2 27.2 -99.9 0.5 0.5 0.5 0.5 81.4 1002.1 1008.7 23.9
202407031003 400 251.0 1.4 247.8 2.0 249.1 1.2 27.2 . 0.5 0.5 0.5 0.5 81.4 1002.1 1008.7 23.9
#7777END
";

    #[test]
    fn test_parse_sample_payload() {
        let records = parse_payload(SAMPLE).unwrap();
        assert_eq!(records.len(), 4);
        assert_eq!(records[0].observed_at, NaiveTime::from_hms_opt(10, 0, 0).unwrap());
        assert_eq!(records[1].observed_at, NaiveTime::from_hms_opt(10, 1, 0).unwrap());
        assert_eq!(records[1].amount_mm, 0.5);
        assert!(records[1].is_wet());
    }

    #[test]
    fn test_missing_and_sentinel_amounts_become_zero() {
        let records = parse_payload(SAMPLE).unwrap();
        assert_eq!(records[2].amount_mm, 0.0);
        assert_eq!(records[3].amount_mm, 0.0);
        assert!(!records[3].is_wet());
    }

    #[test]
    fn test_comment_only_payload_is_empty() {
        let records = parse_payload("#START7777\n\n#7777END\n").unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_truncated_row_is_rejected() {
        let err = parse_payload("#header\n202407031000 400 1.0\n").unwrap_err();
        assert_eq!(
            err,
            PayloadError::TruncatedRow {
                line: 2,
                expected: 10,
                found: 3
            }
        );
    }

    #[test]
    fn test_error_body_is_rejected() {
        // The hub answers some authentication problems with a JSON body and status 200.
        let body = r#"{"result":{"status":403,"message":"Unauthorized"}}"#;
        assert!(matches!(
            parse_payload(body),
            Err(PayloadError::TruncatedRow { line: 1, .. })
        ));
    }

    #[test]
    fn test_bad_timestamp_is_rejected() {
        let row = "2024070310xx 400 0 0 0 0 0 0 0 0.0 0 0 0 0 0 0 0 0";
        assert!(matches!(
            parse_payload(row),
            Err(PayloadError::BadTimestamp { line: 1, .. })
        ));
    }

    #[test]
    fn test_schema_has_precipitation_column() {
        assert_eq!(COLUMN_NAMES.len(), 18);
        assert_eq!(COLUMN_NAMES[PRECIPITATION_INDEX], PRECIPITATION_COLUMN);
    }
}
