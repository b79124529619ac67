//! The usage access gateway.
//!
//! Five operations over the OS services: check and request the usage-access
//! grant, list installed apps with icons, and report per-app foreground time
//! for an arbitrary window or for today. Nothing is cached; every call reads
//! the OS afresh.

use crate::config::GatewayConfig;
use crate::constants::USAGE_STATS_SERVICE_NAME;
use crate::error::GatewayError;
use crate::icon::{png_data_uri, IconRenderer, PngIconRenderer};
use crate::models::{InstalledApp, TimeRange, UsageRecord};
use crate::platform::{AccessMode, IconSource, UsagePlatform};
use crate::validation::validate_epoch_millis;
use chrono::{DateTime, Local, TimeZone};
use log::{debug, error, warn};
use std::sync::Arc;

pub struct UsageGateway<P, R = PngIconRenderer<P>> {
    platform: Arc<P>,
    icons: R,
    config: GatewayConfig,
}

impl<P: UsagePlatform + IconSource> UsageGateway<P> {
    /// Gateway rendering icons from the platform's own icon source.
    pub fn new(platform: P, config: GatewayConfig) -> Self {
        let platform = Arc::new(platform);
        let icons = PngIconRenderer::new(Arc::clone(&platform), &config);
        Self {
            platform,
            icons,
            config,
        }
    }
}

impl<P: UsagePlatform, R: IconRenderer> UsageGateway<P, R> {
    pub fn with_icon_renderer(platform: Arc<P>, icons: R, config: GatewayConfig) -> Self {
        Self {
            platform,
            icons,
            config,
        }
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    /// Whether the usage-access grant is currently held.
    ///
    /// Fail-closed: anything but an explicit "allowed" from the registry,
    /// including a registry failure, reads as not granted.
    pub fn check_permission(&self) -> bool {
        match self.platform.usage_access_mode() {
            Ok(AccessMode::Allowed) => true,
            Ok(
                mode @ (AccessMode::Ignored
                | AccessMode::Errored
                | AccessMode::Default
                | AccessMode::Foreground
                | AccessMode::Unknown(_)),
            ) => {
                debug!("Usage access not granted (mode {mode:?})");
                false
            }
            Err(e) => {
                warn!("Usage access check failed, treating as not granted: {e}");
                false
            }
        }
    }

    /// Open the system usage-access settings screen.
    ///
    /// `Ok(true)` means the screen was launched, not that access was granted.
    /// Callers poll `check_permission` once the user returns.
    pub fn request_permission(&self) -> Result<bool, GatewayError> {
        self.platform.open_usage_access_settings().map_err(|e| {
            error!("Failed to open usage access settings: {e}");
            GatewayError::Operation(e.to_string())
        })?;
        Ok(true)
    }

    /// Every installed app, system apps included, in registry order.
    pub fn list_installed_applications(&self) -> Result<Vec<InstalledApp>, GatewayError> {
        let packages = self.platform.installed_packages().map_err(|e| {
            error!("Failed to list installed applications: {e}");
            GatewayError::from(e)
        })?;

        let apps = packages
            .into_iter()
            .map(|entry| {
                let icon = self.icon_for(&entry.package_name);
                InstalledApp::from_entry(entry, icon)
            })
            .collect();
        Ok(apps)
    }

    /// Foreground usage per app over `[start_ms, end_ms)`, busiest first.
    /// Apps without foreground time are left out.
    pub fn usage_statistics(&self, start_ms: i64, end_ms: i64) -> Result<Vec<UsageRecord>, GatewayError> {
        let range = TimeRange::new(start_ms, end_ms)?;
        self.usage_statistics_in(range)
    }

    /// `usage_statistics` for epoch milliseconds received as JS numbers.
    /// Malformed bounds are rejected before the permission check.
    pub fn usage_statistics_f64(&self, start_time: f64, end_time: f64) -> Result<Vec<UsageRecord>, GatewayError> {
        let start_ms = validate_epoch_millis("startTime", start_time)?;
        let end_ms = validate_epoch_millis("endTime", end_time)?;
        self.usage_statistics(start_ms, end_ms)
    }

    /// Usage from local midnight until now.
    pub fn today_usage_statistics(&self) -> Result<Vec<UsageRecord>, GatewayError> {
        self.today_usage_statistics_at(&Local::now())
    }

    /// Usage from the midnight preceding `now` until `now`.
    pub fn today_usage_statistics_at<Tz: TimeZone>(
        &self,
        now: &DateTime<Tz>,
    ) -> Result<Vec<UsageRecord>, GatewayError> {
        let range = TimeRange::today_at(now)?;
        self.usage_statistics_in(range)
    }

    fn usage_statistics_in(&self, range: TimeRange) -> Result<Vec<UsageRecord>, GatewayError> {
        if !self.check_permission() {
            return Err(GatewayError::PermissionDenied);
        }

        let service = self.platform.usage_stats_service().map_err(|e| {
            error!("Usage stats service unavailable: {e}");
            GatewayError::ServiceUnavailable {
                service: USAGE_STATS_SERVICE_NAME,
            }
        })?;

        let raw = service.query_and_aggregate(range).map_err(|e| {
            error!("Usage stats query failed: {e}");
            GatewayError::from(e)
        })?;

        let mut records: Vec<UsageRecord> = raw
            .into_iter()
            .filter(|stats| stats.total_time_in_foreground > 0)
            .map(|stats| {
                let app_name = self.display_name(&stats.package_name);
                UsageRecord::from_raw(stats, app_name)
            })
            .collect();

        // sort_by is stable: ties keep the service's order
        records.sort_by(|a, b| b.total_time_in_foreground.cmp(&a.total_time_in_foreground));
        Ok(records)
    }

    /// Label for a package, or the package name once it is uninstalled.
    fn display_name(&self, package_name: &str) -> String {
        match self.platform.application_label(package_name) {
            Ok(label) => label,
            Err(e) => {
                debug!("Using package name as label for {package_name}: {e}");
                package_name.to_string()
            }
        }
    }

    /// Data URI of the app icon, or empty when it cannot be rendered.
    fn icon_for(&self, package_name: &str) -> String {
        if !self.config.include_icons {
            return String::new();
        }
        match self.icons.render_png(package_name) {
            Ok(png) => png_data_uri(&png),
            Err(e) => {
                debug!("No icon for {package_name}: {e}");
                String::new()
            }
        }
    }
}
