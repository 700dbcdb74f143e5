//! Election countdown.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

/// Time remaining until an event, split for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct TimeLeft {
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
}

impl TimeLeft {
    /// Time from `now` until `target`. All zero once `target` has passed.
    #[must_use]
    pub fn until(target: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        let total = (target - now).num_seconds();
        if total <= 0 {
            return Self::default();
        }
        Self {
            days: total / 86_400,
            hours: (total / 3_600) % 24,
            minutes: (total / 60) % 60,
            seconds: total % 60,
        }
    }

    /// Time until midnight UTC at the start of `date`.
    #[must_use]
    pub fn until_date(date: NaiveDate, now: DateTime<Utc>) -> Self {
        Self::until(date.and_time(chrono::NaiveTime::MIN).and_utc(), now)
    }

    #[must_use]
    pub const fn is_over(&self) -> bool {
        self.days == 0 && self.hours == 0 && self.minutes == 0 && self.seconds == 0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;

    #[test]
    fn test_splits_duration() {
        let now = Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap();
        let target = now
            + Duration::days(3)
            + Duration::hours(4)
            + Duration::minutes(5)
            + Duration::seconds(6);
        assert_eq!(
            TimeLeft::until(target, now),
            TimeLeft {
                days: 3,
                hours: 4,
                minutes: 5,
                seconds: 6
            }
        );
    }

    #[test]
    fn test_past_is_zero() {
        let now = Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap();
        let left = TimeLeft::until(now - Duration::seconds(1), now);
        assert_eq!(left, TimeLeft::default());
        assert!(left.is_over());
        assert!(TimeLeft::until(now, now).is_over());
    }

    #[test]
    fn test_until_date_uses_utc_midnight() {
        let now = Utc.with_ymd_and_hms(2026, 10, 19, 23, 0, 0).unwrap();
        let date = NaiveDate::from_ymd_opt(2026, 10, 20).unwrap();
        assert_eq!(
            TimeLeft::until_date(date, now),
            TimeLeft {
                days: 0,
                hours: 1,
                minutes: 0,
                seconds: 0
            }
        );
    }
}
