use crate::platform::PackageEntry;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InstalledApp {
    pub package_name: String,
    pub app_name: String,
    pub is_system_app: bool,
    /// `data:image/png;base64,...`, or empty when the icon could not be rendered
    pub icon: String,
}

impl InstalledApp {
    pub fn from_entry(entry: PackageEntry, icon: String) -> Self {
        Self {
            package_name: entry.package_name,
            app_name: entry.label,
            is_system_app: entry.is_system,
            icon,
        }
    }
}
