use crate::platform::RawUsageStats;
use serde::Serialize;

/// Aggregated foreground usage of one package within a query window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageRecord {
    pub package_name: String,
    pub app_name: String,
    /// Milliseconds spent in the foreground
    pub total_time_in_foreground: i64,
    pub last_time_used: i64,
    pub first_time_stamp: i64,
    pub last_time_stamp: i64,
}

impl UsageRecord {
    pub fn from_raw(raw: RawUsageStats, app_name: String) -> Self {
        Self {
            package_name: raw.package_name,
            app_name,
            total_time_in_foreground: raw.total_time_in_foreground,
            last_time_used: raw.last_time_used,
            first_time_stamp: raw.first_time_stamp,
            last_time_stamp: raw.last_time_stamp,
        }
    }
}
