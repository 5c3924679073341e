//! Date-range shortcuts for the report commands

use chrono::{Datelike, Duration, NaiveDate};

/// The day before `today`
pub fn yesterday(today: NaiveDate) -> NaiveDate {
    today - Duration::days(1)
}

/// Monday of `today`'s week through `today`
pub fn this_week(today: NaiveDate) -> (NaiveDate, NaiveDate) {
    let monday = today - Duration::days(i64::from(today.weekday().num_days_from_monday()));
    (monday, today)
}

/// Monday through Sunday of the week before `today`'s
pub fn last_week(today: NaiveDate) -> (NaiveDate, NaiveDate) {
    let (monday, _) = this_week(today);
    (monday - Duration::days(7), monday - Duration::days(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_yesterday_crosses_month_boundary() {
        assert_eq!(yesterday(date(2025, 12, 1)), date(2025, 11, 30));
    }

    #[test]
    fn test_this_week_from_midweek() {
        // 2025-12-03 is a Wednesday
        assert_eq!(
            this_week(date(2025, 12, 3)),
            (date(2025, 12, 1), date(2025, 12, 3))
        );
    }

    #[test]
    fn test_this_week_on_a_monday() {
        // A Monday's week starts on itself
        assert_eq!(
            this_week(date(2025, 12, 1)),
            (date(2025, 12, 1), date(2025, 12, 1))
        );
    }

    #[test]
    fn test_last_week_is_monday_through_sunday() {
        assert_eq!(
            last_week(date(2025, 12, 3)),
            (date(2025, 11, 24), date(2025, 11, 30))
        );
    }
}
