use crate::constants::{ICON_PNG_QUALITY, ICON_SIZE_PX};
use serde::Deserialize;

/// Gateway settings, read from `plugins.app-usage` in the host config.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GatewayConfig {
    /// Render icons while listing installed apps
    pub include_icons: bool,
    pub icon_size_px: u32,
    /// Quality hint for the PNG encoder (0-100). PNG is lossless, so this
    /// only selects compression effort.
    pub icon_quality: u8,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            include_icons: true,
            icon_size_px: ICON_SIZE_PX,
            icon_quality: ICON_PNG_QUALITY,
        }
    }
}
