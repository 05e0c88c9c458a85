use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Permits within this many days of expiry are flagged for renewal outreach.
pub const EXPIRING_WINDOW_DAYS: i64 = 30;

/// Display status derived from a permit's expiry date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PermitStatus {
    Active,
    Expiring,
    Expired,
}

impl PermitStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Expiring => "Expiring",
            Self::Expired => "Expired",
        }
    }
}

/// Whole calendar days between the UTC dates of `now` and `expiry`.
///
/// Time of day is discarded on both sides, so a permit expiring at 23:59 UTC
/// and one expiring at 00:00 UTC on the same date are the same distance away.
pub fn days_until_expiry(expiry: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    expiry
        .date_naive()
        .signed_duration_since(now.date_naive())
        .num_days()
}

/// A permit expiring today is already `Expired`.
pub fn classify(expiry: DateTime<Utc>, now: DateTime<Utc>) -> PermitStatus {
    match days_until_expiry(expiry, now) {
        days if days <= 0 => PermitStatus::Expired,
        days if days <= EXPIRING_WINDOW_DAYS => PermitStatus::Expiring,
        _ => PermitStatus::Active,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate, TimeZone};

    fn midnight(date: NaiveDate) -> DateTime<Utc> {
        date.and_hms_opt(0, 0, 0).expect("valid time").and_utc()
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 14, 15, 45, 0)
            .single()
            .expect("valid timestamp")
    }

    #[test]
    fn thirty_days_out_is_expiring() {
        let expiry = midnight(now().date_naive() + Duration::days(30));
        assert_eq!(days_until_expiry(expiry, now()), 30);
        assert_eq!(classify(expiry, now()), PermitStatus::Expiring);
    }

    #[test]
    fn thirty_one_days_out_is_active() {
        let expiry = midnight(now().date_naive() + Duration::days(31));
        assert_eq!(classify(expiry, now()), PermitStatus::Active);
    }

    #[test]
    fn yesterday_is_expired() {
        let expiry = midnight(now().date_naive() - Duration::days(1));
        assert_eq!(days_until_expiry(expiry, now()), -1);
        assert_eq!(classify(expiry, now()), PermitStatus::Expired);
    }

    #[test]
    fn expiring_today_is_expired_regardless_of_time() {
        let late_today = Utc
            .with_ymd_and_hms(2026, 3, 14, 23, 59, 59)
            .single()
            .expect("valid timestamp");
        assert_eq!(days_until_expiry(late_today, now()), 0);
        assert_eq!(classify(late_today, now()), PermitStatus::Expired);
    }

    #[test]
    fn tomorrow_is_expiring_even_when_fewer_than_24_hours_remain() {
        let early_tomorrow = Utc
            .with_ymd_and_hms(2026, 3, 15, 0, 5, 0)
            .single()
            .expect("valid timestamp");
        assert_eq!(days_until_expiry(early_tomorrow, now()), 1);
        assert_eq!(classify(early_tomorrow, now()), PermitStatus::Expiring);
    }

    #[test]
    fn classification_thresholds_hold_across_a_range_of_offsets() {
        for offset in -400..=400 {
            let expiry = midnight(now().date_naive() + Duration::days(offset));
            let expected = if offset <= 0 {
                PermitStatus::Expired
            } else if offset <= EXPIRING_WINDOW_DAYS {
                PermitStatus::Expiring
            } else {
                PermitStatus::Active
            };
            assert_eq!(classify(expiry, now()), expected, "offset {offset}");
        }
    }
}
