use crate::constants::MAX_DST_GAP_HOURS;
use crate::error::GatewayError;
use crate::validation::validate_time_range;
use chrono::{DateTime, Duration, LocalResult, NaiveTime, TimeZone};

/// Half-open query window `[start_ms, end_ms)` in epoch milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub start_ms: i64,
    pub end_ms: i64,
}

impl TimeRange {
    pub fn new(start_ms: i64, end_ms: i64) -> Result<Self, GatewayError> {
        validate_time_range(start_ms, end_ms)?;
        Ok(Self { start_ms, end_ms })
    }

    /// Window from the most recent local midnight up to `now`.
    pub fn today_at<Tz: TimeZone>(now: &DateTime<Tz>) -> Result<Self, GatewayError> {
        let midnight = local_midnight(now);
        Self::new(midnight.timestamp_millis(), now.timestamp_millis())
    }

    pub fn duration_ms(&self) -> i64 {
        self.end_ms - self.start_ms
    }
}

/// Start of the local day containing `now`.
///
/// Zones that skip midnight for DST get the first existing instant of the
/// day; when midnight occurs twice the earlier one wins.
pub fn local_midnight<Tz: TimeZone>(now: &DateTime<Tz>) -> DateTime<Tz> {
    let tz = now.timezone();
    let mut candidate = now.date_naive().and_time(NaiveTime::MIN);

    for _ in 0..=MAX_DST_GAP_HOURS {
        match tz.from_local_datetime(&candidate) {
            LocalResult::Single(start) => return start,
            LocalResult::Ambiguous(earliest, _) => return earliest,
            LocalResult::None => candidate += Duration::hours(1),
        }
    }

    log::warn!("No valid local midnight found, using current time as window start");
    now.clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};

    #[test]
    fn test_new_rejects_inverted_window() {
        assert!(TimeRange::new(2_000, 1_000).is_err());
        assert_eq!(TimeRange::new(1_000, 2_000).expect("valid").duration_ms(), 1_000);
    }

    #[test]
    fn test_local_midnight_utc() {
        let now = Utc
            .with_ymd_and_hms(2024, 3, 15, 13, 45, 30)
            .single()
            .expect("valid instant")
            + Duration::milliseconds(250);
        let midnight = local_midnight(&now);
        assert_eq!(
            midnight,
            Utc.with_ymd_and_hms(2024, 3, 15, 0, 0, 0).single().expect("valid instant")
        );
    }

    #[test]
    fn test_local_midnight_uses_local_date_not_utc_date() {
        // 01:30 at UTC+2 is still the previous day in UTC
        let tz = FixedOffset::east_opt(2 * 3600).expect("valid offset");
        let now = tz.with_ymd_and_hms(2024, 6, 1, 1, 30, 0).single().expect("valid instant");
        let midnight = local_midnight(&now);
        assert_eq!(midnight, tz.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).single().expect("valid"));
        assert_eq!(now.timestamp_millis() - midnight.timestamp_millis(), 90 * 60 * 1000);
    }

    #[test]
    fn test_today_at_spans_midnight_to_now() {
        let tz = FixedOffset::west_opt(5 * 3600).expect("valid offset");
        let now = tz.with_ymd_and_hms(2024, 1, 10, 8, 0, 0).single().expect("valid instant");
        let range = TimeRange::today_at(&now).expect("valid window");
        assert_eq!(range.end_ms, now.timestamp_millis());
        assert_eq!(range.duration_ms(), 8 * 3600 * 1000);
    }

    #[test]
    fn test_today_at_exactly_midnight_is_empty_window() {
        let now = Utc.with_ymd_and_hms(2024, 1, 10, 0, 0, 0).single().expect("valid instant");
        let range = TimeRange::today_at(&now).expect("valid window");
        assert_eq!(range.start_ms, range.end_ms);
    }
}
