use crate::types::station_window::{truncate_to_minute, QueryWindow};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, TimeDelta};

/// Resolves the minutes to query for `date`, given the current local time.
///
/// * Any date other than today gets the full `[start, end]` window.
/// * Today before `start`, or still inside the `start` minute, collapses to
///   `(start, start)`: too early to query.
/// * Today at or after `end` gets the full window.
/// * Otherwise the window ends one minute before `now`, because the current
///   minute may still be incomplete on the API side. The end never falls
///   before `start`.
///
/// `now` must be expressed in the station's local offset.
pub fn resolve_window(
    date: NaiveDate,
    now: DateTime<FixedOffset>,
    start: NaiveTime,
    end: NaiveTime,
) -> QueryWindow {
    if date != now.date_naive() {
        return QueryWindow::new(start, end);
    }

    let time = now.time();
    if time >= end {
        return QueryWindow::new(start, end);
    }

    let minute = truncate_to_minute(time);
    if minute <= start {
        QueryWindow::new(start, start)
    } else {
        QueryWindow::new(start, minute - TimeDelta::minutes(1))
    }
}
