use crate::error::PlatformError;
use crate::models::TimeRange;

/// An application as reported by the package registry
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageEntry {
    pub package_name: String,
    pub label: String,
    pub is_system: bool,
}

/// One package's aggregated usage as reported by the usage-stats service
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawUsageStats {
    pub package_name: String,
    pub total_time_in_foreground: i64,
    pub last_time_used: i64,
    pub first_time_stamp: i64,
    pub last_time_stamp: i64,
}

/// Non-premultiplied RGBA8 pixels, row-major
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RgbaIcon {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

/// AppOps mode for the usage-stats operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessMode {
    Allowed,
    Ignored,
    Errored,
    Default,
    Foreground,
    Unknown(i32),
}

impl AccessMode {
    /// Map an `AppOpsManager.MODE_*` value.
    pub fn from_raw(mode: i32) -> Self {
        match mode {
            0 => AccessMode::Allowed,
            1 => AccessMode::Ignored,
            2 => AccessMode::Errored,
            3 => AccessMode::Default,
            4 => AccessMode::Foreground,
            other => AccessMode::Unknown(other),
        }
    }
}

/// OS services the gateway reads from.
pub trait UsagePlatform: Send + Sync {
    /// Current usage-access grant for this app.
    fn usage_access_mode(&self) -> Result<AccessMode, PlatformError>;

    /// Launch the system screen where the user grants usage access.
    fn open_usage_access_settings(&self) -> Result<(), PlatformError>;

    /// Every installed application, in registry order.
    fn installed_packages(&self) -> Result<Vec<PackageEntry>, PlatformError>;

    /// Display label of an installed package.
    fn application_label(&self, package_name: &str) -> Result<String, PlatformError>;

    /// Handle to the usage-stats service. Fails with
    /// `PlatformError::ServiceUnavailable` when the OS has none to give.
    fn usage_stats_service(&self) -> Result<Box<dyn UsageStatsService + '_>, PlatformError>;
}

pub trait UsageStatsService {
    /// Per-package usage aggregated over `range`, in the service's order.
    fn query_and_aggregate(&self, range: TimeRange) -> Result<Vec<RawUsageStats>, PlatformError>;
}

/// Raw icon pixels for a package, drawn at roughly `size_px` square.
pub trait IconSource: Send + Sync {
    fn application_icon(&self, package_name: &str, size_px: u32) -> Result<RgbaIcon, PlatformError>;
}
