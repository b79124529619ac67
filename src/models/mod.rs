pub mod installed_app;
pub mod time_range;
pub mod usage_record;

pub use installed_app::InstalledApp;
pub use time_range::{local_midnight, TimeRange};
pub use usage_record::UsageRecord;
