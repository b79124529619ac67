pub mod types;

pub use types::{
    AccessMode, IconSource, PackageEntry, RawUsageStats, RgbaIcon, UsagePlatform,
    UsageStatsService,
};

#[cfg(target_os = "android")]
pub mod android;

#[cfg(target_os = "android")]
pub use android::AndroidPlatform as NativePlatform;

#[cfg(not(target_os = "android"))]
pub use self::UnsupportedPlatform as NativePlatform;

use crate::error::PlatformError;

/// Backend for targets without usage-access APIs.
/// Nothing is granted and nothing is listed.
#[derive(Debug, Default)]
pub struct UnsupportedPlatform;

impl UnsupportedPlatform {
    #[allow(
        clippy::unnecessary_wraps,
        reason = "same signature as AndroidPlatform::new so callers stay target-agnostic"
    )]
    pub fn new() -> Result<Self, PlatformError> {
        Ok(Self)
    }
}

impl UsagePlatform for UnsupportedPlatform {
    fn usage_access_mode(&self) -> Result<AccessMode, PlatformError> {
        Err(PlatformError::Unsupported("Usage access"))
    }

    fn open_usage_access_settings(&self) -> Result<(), PlatformError> {
        Err(PlatformError::Unsupported("Usage access settings"))
    }

    fn installed_packages(&self) -> Result<Vec<PackageEntry>, PlatformError> {
        Err(PlatformError::Unsupported("Package listing"))
    }

    fn application_label(&self, package_name: &str) -> Result<String, PlatformError> {
        Err(PlatformError::PackageNotFound(package_name.to_string()))
    }

    fn usage_stats_service(&self) -> Result<Box<dyn UsageStatsService + '_>, PlatformError> {
        Err(PlatformError::ServiceUnavailable("UsageStatsManager"))
    }
}

impl IconSource for UnsupportedPlatform {
    fn application_icon(&self, _package_name: &str, _size_px: u32) -> Result<RgbaIcon, PlatformError> {
        Err(PlatformError::Unsupported("App icons"))
    }
}

/// Convert Android `ARGB_8888` color ints to RGBA bytes.
#[cfg_attr(
    not(target_os = "android"),
    allow(dead_code, reason = "only the Android backend reads bitmaps")
)]
pub(crate) fn argb_to_rgba(argb: &[i32]) -> Vec<u8> {
    argb.iter()
        .flat_map(|px| {
            let [a, r, g, b] = px.to_be_bytes();
            [r, g, b, a]
        })
        .collect()
}
