//! Time helpers - statistics period keys and timestamps
//!
//! Both the incremental bump path and the nightly rebuild derive their
//! bucket keys from these helpers so the two paths always agree on what
//! "today" and "this month" mean. All statistics run in UTC.

use chrono::{DateTime, Datelike, Duration, Months, NaiveDate, Utc};

use super::{AppError, AppResult};

/// Current Unix timestamp in milliseconds
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Parse a date string (YYYY-MM-DD)
pub fn parse_date(date: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| AppError::validation(format!("Invalid date format: {}", date)))
}

fn date_of(at_millis: i64) -> NaiveDate {
    DateTime::<Utc>::from_timestamp_millis(at_millis)
        .map(|dt| dt.date_naive())
        .unwrap_or_default()
}

/// Daily period key for a Unix-millis instant: `YYYY-MM-DD`
pub fn day_key(at_millis: i64) -> String {
    date_of(at_millis).format("%Y-%m-%d").to_string()
}

/// Monthly period key for a Unix-millis instant: the first day of the
/// month, `YYYY-MM-01`
pub fn month_key(at_millis: i64) -> String {
    let date = date_of(at_millis);
    let first = date.with_day(1).unwrap_or(date);
    first.format("%Y-%m-%d").to_string()
}

/// How long until the next UTC midnight (nightly rebuild trigger)
pub fn until_next_utc_midnight() -> std::time::Duration {
    let now = Utc::now();
    let next = now
        .date_naive()
        .succ_opt()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
        .unwrap_or(now);
    (next - now).to_std().unwrap_or_default()
}

/// Numeric sort key for a period key: UTC midnight of that date, in millis
pub fn key_millis(date: NaiveDate) -> i64 {
    date.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().timestamp_millis())
        .unwrap_or(0)
}

/// All days from `epoch` up to and including today (UTC)
pub fn days_since(epoch: NaiveDate) -> Vec<NaiveDate> {
    let today = Utc::now().date_naive();
    let mut days = Vec::new();
    let mut current = epoch;
    while current <= today {
        days.push(current);
        current += Duration::days(1);
    }
    days
}

/// All month starts from `epoch`'s month up to and including the current month (UTC)
pub fn months_since(epoch: NaiveDate) -> Vec<NaiveDate> {
    let this_month = Utc::now().date_naive().with_day(1).unwrap_or_default();
    let mut months = Vec::new();
    let mut current = epoch.with_day(1).unwrap_or(epoch);
    while current <= this_month {
        months.push(current);
        current = match current.checked_add_months(Months::new(1)) {
            Some(next) => next,
            None => break,
        };
    }
    months
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn day_and_month_keys() {
        let at = Utc
            .with_ymd_and_hms(2023, 7, 15, 13, 45, 0)
            .unwrap()
            .timestamp_millis();
        assert_eq!(day_key(at), "2023-07-15");
        assert_eq!(month_key(at), "2023-07-01");
    }

    #[test]
    fn next_midnight_within_a_day() {
        let wait = until_next_utc_midnight();
        assert!(wait <= std::time::Duration::from_secs(24 * 60 * 60));
    }

    #[test]
    fn key_millis_is_utc_midnight() {
        let date = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
        assert_eq!(key_millis(date), 1_672_531_200_000);
    }

    #[test]
    fn daily_sequence_covers_every_day() {
        let epoch = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
        let days = days_since(epoch);
        let today = Utc::now().date_naive();
        assert_eq!(days.first(), Some(&epoch));
        assert_eq!(days.last(), Some(&today));
        assert_eq!(days.len() as i64, (today - epoch).num_days() + 1);
    }

    #[test]
    fn month_sequence_from_epoch() {
        let epoch = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
        let months = months_since(epoch);
        assert_eq!(months[0], epoch);
        assert!(months.len() >= 2);
        assert_eq!(months[1], NaiveDate::from_ymd_opt(2023, 2, 1).unwrap());
        // strictly increasing month starts
        for pair in months.windows(2) {
            assert!(pair[0] < pair[1]);
            assert_eq!(pair[1].day(), 1);
        }
    }

    #[test]
    fn invalid_date_rejected() {
        assert!(parse_date("2023-13-01").is_err());
        assert!(parse_date("not-a-date").is_err());
    }
}
