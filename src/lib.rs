#[cfg(feature = "tauri")]
mod commands;
pub mod config;
pub mod constants;
pub mod error;
pub mod gateway;
pub mod icon;
pub mod models;
pub mod platform;
#[cfg(test)]
mod test_utils;
pub mod validation;

pub use config::GatewayConfig;
pub use error::{CommandError, GatewayError, IconError, PlatformError};
pub use gateway::UsageGateway;
pub use icon::{IconRenderer, PngIconRenderer};
pub use models::{InstalledApp, TimeRange, UsageRecord};
pub use platform::{NativePlatform, UsagePlatform};

#[cfg(feature = "tauri")]
use tauri::{
    plugin::{Builder, TauriPlugin},
    Manager, Runtime,
};

/// Tauri plugin exposing the usage gateway as `plugin:app-usage|<command>`.
///
/// Settings are read from `plugins.app-usage` in the host config; when the
/// section is missing the defaults apply.
#[cfg(feature = "tauri")]
pub fn init<R: Runtime>() -> TauriPlugin<R, Option<GatewayConfig>> {
    use crate::validation::validate_config;
    use log::error;
    use std::sync::Arc;

    Builder::<R, Option<GatewayConfig>>::new(constants::PLUGIN_NAME)
        .invoke_handler(tauri::generate_handler![
            commands::check_usage_stats_permission,
            commands::request_usage_stats_permission,
            commands::get_installed_apps,
            commands::get_app_usage_stats,
            commands::get_today_usage_stats,
        ])
        .setup(|app, api| {
            let config = api.config().clone().unwrap_or_default();
            if let Err(e) = validate_config(&config) {
                error!("Invalid app-usage plugin config: {e}");
                return Err(Box::new(e) as Box<dyn std::error::Error>);
            }

            let platform = match NativePlatform::new() {
                Ok(platform) => platform,
                Err(e) => {
                    error!("Failed to initialize usage platform: {e}");
                    return Err(Box::new(e) as Box<dyn std::error::Error>);
                }
            };

            let gateway: commands::SharedGateway = Arc::new(UsageGateway::new(platform, config));
            app.manage(gateway);
            Ok(())
        })
        .build()
}
