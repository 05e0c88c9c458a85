use chrono::{DateTime, NaiveDate, Utc};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

/// Midday keeps a date-only CLI override on the same UTC date.
pub(crate) fn at_midday(date: NaiveDate) -> DateTime<Utc> {
    date.and_hms_opt(12, 0, 0)
        .map(|noon| noon.and_utc())
        .unwrap_or_else(Utc::now)
}

pub(crate) fn at_midnight(date: NaiveDate) -> DateTime<Utc> {
    date.and_hms_opt(0, 0, 0)
        .map(|midnight| midnight.and_utc())
        .unwrap_or_else(Utc::now)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_date_accepts_iso_dates_only() {
        assert_eq!(
            parse_date(" 2026-05-01 "),
            Ok(NaiveDate::from_ymd_opt(2026, 5, 1).expect("valid date"))
        );
        assert!(parse_date("05/01/2026").is_err());
    }

    #[test]
    fn midday_and_midnight_stay_on_the_same_date() {
        let date = NaiveDate::from_ymd_opt(2026, 5, 1).expect("valid date");
        assert_eq!(at_midday(date).date_naive(), date);
        assert_eq!(at_midnight(date).date_naive(), date);
    }
}
