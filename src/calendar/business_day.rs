//! Business-day rules: weekdays only, no public holidays, and never May 1.

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, NaiveTime, Weekday};
use log::warn;
use std::collections::BTreeSet;
use std::ops::RangeInclusive;

/// `(month, day)` of Korean public holidays that fall on the same solar date every year.
pub const KOREAN_FIXED_HOLIDAYS: [(u32, u32); 8] = [
    (1, 1),   // New Year's Day
    (3, 1),   // Independence Movement Day
    (5, 5),   // Children's Day
    (6, 6),   // Memorial Day
    (8, 15),  // Liberation Day
    (10, 3),  // National Foundation Day
    (10, 9),  // Hangul Day
    (12, 25), // Christmas
];

/// Years covered by [`KOREAN_MOVABLE_HOLIDAYS`].
pub const KOREAN_MOVABLE_YEARS: RangeInclusive<i32> = 2020..=2026;

/// `(year, month, day)` of Korean public holidays that move from year to year:
/// Seollal and Chuseok (three days each), Buddha's Birthday, substitute
/// holidays, election days and one-off temporary holidays.
#[rustfmt::skip]
pub const KOREAN_MOVABLE_HOLIDAYS: [(i32, u32, u32); 75] = [
    // 2020
    (2020, 1, 24), (2020, 1, 25), (2020, 1, 26), (2020, 1, 27), // Seollal + substitute
    (2020, 4, 15), // general election
    (2020, 4, 30), // Buddha's Birthday
    (2020, 8, 17), // temporary
    (2020, 9, 30), (2020, 10, 1), (2020, 10, 2), // Chuseok
    // 2021
    (2021, 2, 11), (2021, 2, 12), (2021, 2, 13), // Seollal
    (2021, 5, 19), // Buddha's Birthday
    (2021, 8, 16), // Liberation Day substitute
    (2021, 9, 20), (2021, 9, 21), (2021, 9, 22), // Chuseok
    (2021, 10, 4), // National Foundation Day substitute
    (2021, 10, 11), // Hangul Day substitute
    // 2022
    (2022, 1, 31), (2022, 2, 1), (2022, 2, 2), // Seollal
    (2022, 3, 9), // presidential election
    (2022, 5, 8), // Buddha's Birthday
    (2022, 6, 1), // local elections
    (2022, 9, 9), (2022, 9, 10), (2022, 9, 11), (2022, 9, 12), // Chuseok + substitute
    (2022, 10, 10), // Hangul Day substitute
    // 2023
    (2023, 1, 21), (2023, 1, 22), (2023, 1, 23), (2023, 1, 24), // Seollal + substitute
    (2023, 5, 27), (2023, 5, 29), // Buddha's Birthday + substitute
    (2023, 9, 28), (2023, 9, 29), (2023, 9, 30), // Chuseok
    (2023, 10, 2), // temporary
    // 2024
    (2024, 2, 9), (2024, 2, 10), (2024, 2, 11), (2024, 2, 12), // Seollal + substitute
    (2024, 4, 10), // general election
    (2024, 5, 6), // Children's Day substitute
    (2024, 5, 15), // Buddha's Birthday
    (2024, 9, 16), (2024, 9, 17), (2024, 9, 18), // Chuseok
    (2024, 10, 1), // temporary (Armed Forces Day)
    // 2025
    (2025, 1, 27), // temporary
    (2025, 1, 28), (2025, 1, 29), (2025, 1, 30), // Seollal
    (2025, 3, 3), // Independence Movement Day substitute
    (2025, 5, 6), // Children's Day / Buddha's Birthday substitute
    (2025, 6, 3), // presidential election
    (2025, 10, 5), (2025, 10, 6), (2025, 10, 7), (2025, 10, 8), // Chuseok + substitute
    // 2026
    (2026, 2, 16), (2026, 2, 17), (2026, 2, 18), // Seollal
    (2026, 3, 2), // Independence Movement Day substitute
    (2026, 5, 24), (2026, 5, 25), // Buddha's Birthday + substitute
    (2026, 6, 3), // local elections
    (2026, 8, 17), // Liberation Day substitute
    (2026, 9, 24), (2026, 9, 25), (2026, 9, 26), // Chuseok
    (2026, 10, 5), // National Foundation Day substitute
];

/// A set of holiday dates.
///
/// [`HolidayCalendar::korean`] covers every Korean public holiday for the
/// years in [`KOREAN_MOVABLE_YEARS`]. Later years only get the fixed solar
/// dates; add their lunar and substitute days with [`HolidayCalendar::insert`]
/// or [`HolidayCalendar::extend`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HolidayCalendar {
    dates: BTreeSet<NaiveDate>,
}

impl HolidayCalendar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_dates(dates: impl IntoIterator<Item = NaiveDate>) -> Self {
        Self {
            dates: dates.into_iter().collect(),
        }
    }

    /// Fixed-date Korean public holidays for each year in `years`.
    pub fn korean_fixed(years: impl IntoIterator<Item = i32>) -> Self {
        let dates = years.into_iter().flat_map(|year| {
            KOREAN_FIXED_HOLIDAYS
                .iter()
                .filter_map(move |&(month, day)| NaiveDate::from_ymd_opt(year, month, day))
        });
        Self::from_dates(dates)
    }

    /// All Korean public holidays for each year in `years`: the fixed solar
    /// dates plus the lunar, substitute and temporary ones.
    pub fn korean(years: impl IntoIterator<Item = i32>) -> Self {
        let years: BTreeSet<i32> = years.into_iter().collect();
        for year in years.iter().filter(|y| !KOREAN_MOVABLE_YEARS.contains(*y)) {
            warn!(
                "No lunar or substitute holidays known for {}, only fixed dates are excluded",
                year
            );
        }

        let mut calendar = Self::korean_fixed(years.iter().copied());
        calendar.extend(
            KOREAN_MOVABLE_HOLIDAYS
                .iter()
                .filter(|(year, _, _)| years.contains(year))
                .filter_map(|&(year, month, day)| NaiveDate::from_ymd_opt(year, month, day)),
        );
        calendar
    }

    pub fn insert(&mut self, date: NaiveDate) -> bool {
        self.dates.insert(date)
    }

    pub fn extend(&mut self, dates: impl IntoIterator<Item = NaiveDate>) {
        self.dates.extend(dates);
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.dates.contains(&date)
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

/// True iff `date` is Monday to Friday, not in `holidays`, and not May 1.
///
/// May 1 is excluded on its own, whether or not `holidays` contains it.
pub fn is_business_day(date: NaiveDate, holidays: &HolidayCalendar) -> bool {
    let weekday = !matches!(date.weekday(), Weekday::Sat | Weekday::Sun);
    let may_first = date.month() == 5 && date.day() == 1;
    weekday && !holidays.contains(date) && !may_first
}

/// Every date from `start` to `end`, both inclusive. Empty when `start > end`.
pub fn dates_in_range(start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    start.iter_days().take_while(move |date| *date <= end)
}

/// Dates of `[start, end]` worth querying in a range check: business days,
/// and today only once the daily window has opened.
pub fn eligible_dates(
    start: NaiveDate,
    end: NaiveDate,
    holidays: &HolidayCalendar,
    now: DateTime<FixedOffset>,
    window_start: NaiveTime,
) -> Vec<NaiveDate> {
    let today = now.date_naive();
    dates_in_range(start, end)
        .filter(|date| is_business_day(*date, holidays))
        .filter(|date| *date != today || now.time() >= window_start)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_weekdays_are_business_days() {
        let holidays = HolidayCalendar::new();
        // 2024-07-01 is a Monday.
        for day in 1..=5 {
            assert!(is_business_day(d(2024, 7, day), &holidays));
        }
        assert!(!is_business_day(d(2024, 7, 6), &holidays), "Saturday");
        assert!(!is_business_day(d(2024, 7, 7), &holidays), "Sunday");
    }

    #[test]
    fn test_holidays_are_excluded() {
        let holidays = HolidayCalendar::from_dates([d(2024, 9, 17)]);
        assert!(!is_business_day(d(2024, 9, 17), &holidays));
        assert!(is_business_day(d(2024, 9, 19), &holidays));
    }

    #[test]
    fn test_may_first_is_excluded_without_holiday_entry() {
        // 2024-05-01 is a Wednesday.
        let empty = HolidayCalendar::new();
        assert!(!is_business_day(d(2024, 5, 1), &empty));
        let with_it = HolidayCalendar::from_dates([d(2024, 5, 1)]);
        assert!(!is_business_day(d(2024, 5, 1), &with_it));
        assert!(is_business_day(d(2024, 5, 2), &empty));
    }

    #[test]
    fn test_korean_fixed_holidays() {
        let holidays = HolidayCalendar::korean_fixed([2024, 2025]);
        assert_eq!(holidays.len(), 16);
        assert!(holidays.contains(d(2024, 8, 15)));
        assert!(holidays.contains(d(2025, 10, 9)));
        // 2024-10-03 is a Thursday.
        assert!(!is_business_day(d(2024, 10, 3), &holidays));
    }

    #[test]
    fn test_korean_includes_lunar_and_substitute_holidays() {
        let holidays = HolidayCalendar::korean([2024]);
        for date in [d(2024, 2, 12), d(2024, 5, 6), d(2024, 5, 15), d(2024, 9, 17)] {
            assert!(holidays.contains(date), "{} should be a holiday", date);
            assert!(!is_business_day(date, &holidays));
        }
        assert!(holidays.contains(d(2024, 12, 25)));
        // Other years' movable dates stay out.
        assert!(!holidays.contains(d(2025, 1, 28)));
        assert!(is_business_day(d(2024, 9, 19), &holidays));
    }

    #[test]
    fn test_movable_table_is_valid() {
        for (year, month, day) in KOREAN_MOVABLE_HOLIDAYS {
            assert!(KOREAN_MOVABLE_YEARS.contains(&year));
            assert!(NaiveDate::from_ymd_opt(year, month, day).is_some());
        }
        let all = HolidayCalendar::korean(KOREAN_MOVABLE_YEARS);
        assert_eq!(
            all.len(),
            KOREAN_FIXED_HOLIDAYS.len() * 7 + KOREAN_MOVABLE_HOLIDAYS.len()
        );
    }

    #[test]
    fn test_korean_outside_table_keeps_fixed_dates() {
        let holidays = HolidayCalendar::korean([2030]);
        assert_eq!(holidays, HolidayCalendar::korean_fixed([2030]));
    }

    #[test]
    fn test_dates_in_range() {
        let dates: Vec<_> = dates_in_range(d(2024, 2, 27), d(2024, 3, 1)).collect();
        assert_eq!(
            dates,
            vec![d(2024, 2, 27), d(2024, 2, 28), d(2024, 2, 29), d(2024, 3, 1)]
        );
        assert_eq!(dates_in_range(d(2024, 3, 2), d(2024, 3, 1)).count(), 0);
        assert_eq!(dates_in_range(d(2024, 3, 1), d(2024, 3, 1)).count(), 1);
    }

    #[test]
    fn test_eligible_dates_skips_today_before_window() {
        let kst = FixedOffset::east_opt(9 * 3600).unwrap();
        let holidays = HolidayCalendar::new();
        let start = NaiveTime::from_hms_opt(10, 0, 0).unwrap();

        // Friday 2024-07-05 at 09:30: the week minus today.
        let early = kst.with_ymd_and_hms(2024, 7, 5, 9, 30, 0).unwrap();
        let dates = eligible_dates(d(2024, 7, 1), d(2024, 7, 7), &holidays, early, start);
        assert_eq!(dates, (1..=4).map(|day| d(2024, 7, day)).collect::<Vec<_>>());

        let open = kst.with_ymd_and_hms(2024, 7, 5, 10, 0, 0).unwrap();
        let dates = eligible_dates(d(2024, 7, 1), d(2024, 7, 7), &holidays, open, start);
        assert_eq!(dates.len(), 5);
    }
}
