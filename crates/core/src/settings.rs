//! Device display settings consumed by presentation formatting.

use serde::{Deserialize, Serialize};

/// Date format used when the device settings cannot be loaded.
pub const DEFAULT_DATE_FORMAT: &str = "mm/dd/yyyy";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceSettings {
    pub date_format: String,
    pub use_24_hour_clock: bool,
}

impl Default for DeviceSettings {
    fn default() -> Self {
        Self {
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            use_24_hour_clock: false,
        }
    }
}
