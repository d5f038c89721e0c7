//! Date window computation
//!
//! The sync always covers whole past days in the local timezone: the window
//! ends yesterday at 23:59:59.999 and starts `days` calendar days earlier at
//! midnight. Today is never included, so a day is only synced once it can no
//! longer change.

use chrono::{DateTime, Days, Local, NaiveTime, TimeZone, Utc};

use crate::error::AppError;

/// Compute the sync window for the given local reference time
///
/// Returns `(since, to)` in UTC where `to` is yesterday 23:59:59.999 local
/// and `since` is midnight `days - 1` calendar days before that. Both bounds
/// are resolved in the local timezone before conversion; an unrepresentable
/// local time (DST gap) is an internal error.
pub fn sync_window(
    days: u32,
    now: DateTime<Local>,
) -> Result<(DateTime<Utc>, DateTime<Utc>), AppError> {
    let yesterday = now
        .date_naive()
        .checked_sub_days(Days::new(1))
        .ok_or_else(|| AppError::Internal("date window underflow".to_string()))?;
    let first_day = yesterday
        .checked_sub_days(Days::new(u64::from(days.saturating_sub(1))))
        .ok_or_else(|| AppError::Internal("date window underflow".to_string()))?;

    let end_of_day = NaiveTime::from_hms_milli_opt(23, 59, 59, 999)
        .ok_or_else(|| AppError::Internal("invalid end-of-day time".to_string()))?;

    let to = resolve_local(yesterday.and_time(end_of_day))?;
    let since = resolve_local(first_day.and_time(NaiveTime::MIN))?;

    Ok((since, to))
}

fn resolve_local(naive: chrono::NaiveDateTime) -> Result<DateTime<Utc>, AppError> {
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| AppError::Internal(format!("unrepresentable local time: {naive}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    fn local(s: &str) -> DateTime<Local> {
        s.parse::<DateTime<Utc>>().unwrap().with_timezone(&Local)
    }

    // Test 1: A 7-day window covers the 7 days before today
    #[test]
    fn test_seven_day_window() {
        let now = local("2026-08-26T03:00:00Z");
        let (since, to) = sync_window(7, now).unwrap();

        assert_eq!(to.signed_duration_since(since).num_days(), 6);
        assert!(to < now.with_timezone(&Utc) + chrono::Duration::days(1));
        assert!(since < to);
    }

    // Test 2: The window never includes the current day
    #[test]
    fn test_excludes_today() {
        let now = local("2026-08-26T12:00:00Z");
        let (_, to) = sync_window(1, now).unwrap();

        let local_to = to.with_timezone(&Local);
        assert_eq!(
            local_to.date_naive(),
            now.date_naive().checked_sub_days(Days::new(1)).unwrap()
        );
    }

    // Test 3: The bounds sit on day edges in local time
    #[test]
    fn test_day_edges() {
        let now = local("2026-08-26T00:30:00Z");
        let (since, to) = sync_window(3, now).unwrap();

        let local_since = since.with_timezone(&Local);
        let local_to = to.with_timezone(&Local);

        assert_eq!(local_since.time(), NaiveTime::MIN);
        assert_eq!(local_to.hour(), 23);
        assert_eq!(local_to.minute(), 59);
        assert_eq!(local_to.second(), 59);
        assert_eq!(local_to.nanosecond() / 1_000_000, 999);
    }

    // Test 4: A 1-day window spans exactly yesterday
    #[test]
    fn test_single_day_window() {
        let now = local("2026-08-26T15:00:00Z");
        let (since, to) = sync_window(1, now).unwrap();

        assert_eq!(
            since.with_timezone(&Local).date_naive(),
            to.with_timezone(&Local).date_naive()
        );
    }
}
