// src/commands.rs
//
// Tauri IPC command handlers. Each one is a thin wrapper over UsageGateway;
// errors cross the boundary as { code, message }.

use crate::error::CommandError;
use crate::gateway::UsageGateway;
use crate::models::{InstalledApp, UsageRecord};
use crate::platform::NativePlatform;
use std::sync::Arc;
use tauri::State;

pub type SharedGateway = Arc<UsageGateway<NativePlatform>>;

#[tauri::command]
pub fn check_usage_stats_permission(gateway: State<SharedGateway>) -> bool {
    gateway.check_permission()
}

/// Resolves `true` once the settings screen is launched. The grant itself
/// has to be confirmed with `check_usage_stats_permission` afterwards.
#[tauri::command]
pub fn request_usage_stats_permission(gateway: State<SharedGateway>) -> Result<bool, CommandError> {
    Ok(gateway.request_permission()?)
}

#[tauri::command]
pub fn get_installed_apps(gateway: State<SharedGateway>) -> Result<Vec<InstalledApp>, CommandError> {
    Ok(gateway.list_installed_applications()?)
}

#[tauri::command]
pub fn get_app_usage_stats(
    gateway: State<SharedGateway>,
    start_time: f64,
    end_time: f64,
) -> Result<Vec<UsageRecord>, CommandError> {
    Ok(gateway.usage_statistics_f64(start_time, end_time)?)
}

#[tauri::command]
pub fn get_today_usage_stats(gateway: State<SharedGateway>) -> Result<Vec<UsageRecord>, CommandError> {
    Ok(gateway.today_usage_statistics()?)
}
