use std::collections::HashSet;

use chrono::{Datelike, NaiveDate, Weekday};
use sqlx::SqliteConnection;

use crate::core::error::LeaveError;

/// Count of chargeable days in the inclusive range: every day that is neither
/// a weekend nor a declared holiday counts as 1.0. A result of 0.0 is a valid
/// output; callers decide whether that invalidates the request.
pub fn chargeable_days(
    start: NaiveDate,
    end: NaiveDate,
    holidays: &HashSet<NaiveDate>,
) -> Result<f64, LeaveError> {
    if start > end {
        return Err(LeaveError::InvalidDateRange);
    }

    let mut days = 0u32;
    let mut current = start;
    while current <= end {
        let weekend = matches!(current.weekday(), Weekday::Sat | Weekday::Sun);
        if !weekend && !holidays.contains(&current) {
            days += 1;
        }
        current = match current.succ_opt() {
            Some(d) => d,
            None => break,
        };
    }

    Ok(f64::from(days))
}

/// Declared holiday dates falling inside the inclusive range.
pub async fn holidays_in_range(
    conn: &mut SqliteConnection,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<HashSet<NaiveDate>, LeaveError> {
    let dates: Vec<NaiveDate> =
        sqlx::query_scalar("SELECT date FROM holidays WHERE date >= ? AND date <= ?")
            .bind(start)
            .bind(end)
            .fetch_all(conn)
            .await?;

    Ok(dates.into_iter().collect())
}

/// Convenience: holiday lookup plus the pure count in one call.
pub async fn working_days(
    conn: &mut SqliteConnection,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<f64, LeaveError> {
    if start > end {
        return Err(LeaveError::InvalidDateRange);
    }
    let holidays = holidays_in_range(conn, start, end).await?;
    chargeable_days(start, end, &holidays)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn monday_to_friday_is_five_days() {
        // 2026-09-07 is a Monday
        let days = chargeable_days(d(2026, 9, 7), d(2026, 9, 11), &HashSet::new()).unwrap();
        assert_eq!(days, 5.0);
    }

    #[test]
    fn weekend_only_range_is_zero() {
        // 2026-09-12/13 is Sat/Sun
        let days = chargeable_days(d(2026, 9, 12), d(2026, 9, 13), &HashSet::new()).unwrap();
        assert_eq!(days, 0.0);
    }

    #[test]
    fn holidays_are_excluded() {
        let holidays: HashSet<_> = [d(2026, 9, 9)].into_iter().collect();
        let days = chargeable_days(d(2026, 9, 7), d(2026, 9, 11), &holidays).unwrap();
        assert_eq!(days, 4.0);
    }

    #[test]
    fn weekend_holiday_is_not_double_counted() {
        let holidays: HashSet<_> = [d(2026, 9, 12)].into_iter().collect();
        let days = chargeable_days(d(2026, 9, 7), d(2026, 9, 13), &holidays).unwrap();
        assert_eq!(days, 5.0);
    }

    #[test]
    fn single_working_day() {
        let days = chargeable_days(d(2026, 9, 7), d(2026, 9, 7), &HashSet::new()).unwrap();
        assert_eq!(days, 1.0);
    }

    #[test]
    fn inverted_range_is_rejected() {
        let err = chargeable_days(d(2026, 9, 11), d(2026, 9, 7), &HashSet::new()).unwrap_err();
        assert!(matches!(err, LeaveError::InvalidDateRange));
    }
}
