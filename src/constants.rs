// src/constants.rs

/// Name the Tauri plugin registers under (`plugin:app-usage|...`)
pub const PLUGIN_NAME: &str = "app-usage";

/// Service named when the usage-stats handle cannot be obtained
pub const USAGE_STATS_SERVICE_NAME: &str = "UsageStatsManager";

/// Edge length of rendered app icons, in pixels
pub const ICON_SIZE_PX: u32 = 64;

/// Largest icon edge accepted from configuration
pub const MAX_ICON_SIZE_PX: u32 = 512;

/// PNG quality hint passed to the encoder (0-100)
pub const ICON_PNG_QUALITY: u8 = 80;

/// Prefix of every rendered icon string
pub const PNG_DATA_URI_PREFIX: &str = "data:image/png;base64,";

/// Largest integer a JS number holds exactly (2^53 - 1)
pub const MAX_SAFE_EPOCH_MS: i64 = 9_007_199_254_740_991;

/// `MAX_SAFE_EPOCH_MS` as received over the IPC boundary
pub const MAX_SAFE_EPOCH_MS_F64: f64 = 9_007_199_254_740_991.0;

/// Hours to probe forward when local midnight falls in a DST gap
pub const MAX_DST_GAP_HOURS: u32 = 3;
