//! Shared test utilities.
//!
//! `FakePlatform` stands in for the OS services and records how often the
//! usage-stats service was queried, so tests can assert on side effects.

#![cfg(test)]

use crate::error::PlatformError;
use crate::models::TimeRange;
use crate::platform::{
    AccessMode, IconSource, PackageEntry, RawUsageStats, RgbaIcon, UsagePlatform,
    UsageStatsService,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// What the fake permission registry answers.
#[derive(Debug, Clone, Copy)]
pub enum FakePermission {
    Granted,
    Denied,
    /// The registry call itself fails
    Broken,
}

pub struct FakePlatform {
    permission: FakePermission,
    settings_available: bool,
    packages: Vec<PackageEntry>,
    /// `None` means the usage-stats service cannot be obtained
    usage: Option<Vec<RawUsageStats>>,
    icons: HashMap<String, RgbaIcon>,
    usage_queries: AtomicUsize,
    settings_opened: AtomicUsize,
    last_range: Mutex<Option<TimeRange>>,
}

impl FakePlatform {
    /// Permission granted, settings screen available, nothing installed.
    pub fn new() -> Self {
        Self {
            permission: FakePermission::Granted,
            settings_available: true,
            packages: Vec::new(),
            usage: Some(Vec::new()),
            icons: HashMap::new(),
            usage_queries: AtomicUsize::new(0),
            settings_opened: AtomicUsize::new(0),
            last_range: Mutex::new(None),
        }
    }

    pub fn with_permission(mut self, permission: FakePermission) -> Self {
        self.permission = permission;
        self
    }

    pub fn without_settings_screen(mut self) -> Self {
        self.settings_available = false;
        self
    }

    pub fn with_package(mut self, package_name: &str, label: &str, is_system: bool) -> Self {
        self.packages.push(PackageEntry {
            package_name: package_name.to_string(),
            label: label.to_string(),
            is_system,
        });
        self
    }

    pub fn with_usage(mut self, package_name: &str, foreground_ms: i64) -> Self {
        self.usage
            .get_or_insert_with(Vec::new)
            .push(raw_stats(package_name, foreground_ms));
        self
    }

    pub fn without_usage_service(mut self) -> Self {
        self.usage = None;
        self
    }

    pub fn with_icon(mut self, package_name: &str, icon: RgbaIcon) -> Self {
        self.icons.insert(package_name.to_string(), icon);
        self
    }

    pub fn usage_queries(&self) -> usize {
        self.usage_queries.load(Ordering::SeqCst)
    }

    pub fn settings_opened(&self) -> usize {
        self.settings_opened.load(Ordering::SeqCst)
    }

    pub fn last_range(&self) -> Option<TimeRange> {
        *self.last_range.lock().expect("last_range lock")
    }
}

impl UsagePlatform for FakePlatform {
    fn usage_access_mode(&self) -> Result<AccessMode, PlatformError> {
        match self.permission {
            FakePermission::Granted => Ok(AccessMode::Allowed),
            FakePermission::Denied => Ok(AccessMode::Ignored),
            FakePermission::Broken => Err(PlatformError::Call("AppOpsManager threw".into())),
        }
    }

    fn open_usage_access_settings(&self) -> Result<(), PlatformError> {
        if !self.settings_available {
            return Err(PlatformError::Call("No activity found to handle Intent".into()));
        }
        self.settings_opened.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn installed_packages(&self) -> Result<Vec<PackageEntry>, PlatformError> {
        Ok(self.packages.clone())
    }

    fn application_label(&self, package_name: &str) -> Result<String, PlatformError> {
        self.packages
            .iter()
            .find(|p| p.package_name == package_name)
            .map(|p| p.label.clone())
            .ok_or_else(|| PlatformError::PackageNotFound(package_name.to_string()))
    }

    fn usage_stats_service(&self) -> Result<Box<dyn UsageStatsService + '_>, PlatformError> {
        match &self.usage {
            Some(stats) => Ok(Box::new(FakeUsageStats {
                platform: self,
                stats: stats.clone(),
            })),
            None => Err(PlatformError::ServiceUnavailable("UsageStatsManager")),
        }
    }
}

impl IconSource for FakePlatform {
    fn application_icon(&self, package_name: &str, _size_px: u32) -> Result<RgbaIcon, PlatformError> {
        self.icons
            .get(package_name)
            .cloned()
            .ok_or_else(|| PlatformError::Call(format!("No icon for {package_name}")))
    }
}

struct FakeUsageStats<'a> {
    platform: &'a FakePlatform,
    stats: Vec<RawUsageStats>,
}

impl UsageStatsService for FakeUsageStats<'_> {
    fn query_and_aggregate(&self, range: TimeRange) -> Result<Vec<RawUsageStats>, PlatformError> {
        self.platform.usage_queries.fetch_add(1, Ordering::SeqCst);
        *self.platform.last_range.lock().expect("last_range lock") = Some(range);
        Ok(self.stats.clone())
    }
}

pub fn raw_stats(package_name: &str, foreground_ms: i64) -> RawUsageStats {
    RawUsageStats {
        package_name: package_name.to_string(),
        total_time_in_foreground: foreground_ms,
        last_time_used: 1_700_000_900_000,
        first_time_stamp: 1_700_000_000_000,
        last_time_stamp: 1_700_003_600_000,
    }
}

/// Opaque single-color icon of the given size.
pub fn solid_icon(width: u32, height: u32) -> RgbaIcon {
    let pixel_count = usize::try_from(width * height).expect("icon size fits usize");
    RgbaIcon {
        width,
        height,
        pixels: [0x20, 0x80, 0xE0, 0xFF].repeat(pixel_count),
    }
}
