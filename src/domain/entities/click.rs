//! Click entity: one record per redirect attempt, successful or not.

use chrono::{DateTime, Utc};

/// Device class resolved from the user-agent string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceClass {
    Mobile,
    Tablet,
    Pc,
    Bot,
    Unknown,
}

impl DeviceClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceClass::Mobile => "Mobile",
            DeviceClass::Tablet => "Tablet",
            DeviceClass::Pc => "PC",
            DeviceClass::Bot => "Bot",
            DeviceClass::Unknown => "Unknown",
        }
    }
}

/// The four analytics dimensions resolved for one click, as names.
///
/// Every dimension degrades to `"Unknown"` rather than failing the redirect.
#[derive(Debug, Clone)]
pub struct ClickDimensions {
    pub country: String,
    pub browser: String,
    pub platform: String,
    pub device: String,
}

/// Dimension row ids after the upsert-and-increment pass.
#[derive(Debug, Clone, Copy)]
pub struct DimensionIds {
    pub country_id: i64,
    pub browser_id: i64,
    pub platform_id: i64,
    pub device_id: i64,
}

/// A recorded click event.
///
/// Created with `redirected = false` before the accessibility check; the flag
/// is flipped only when the redirect is actually served. `owner_id` is the
/// link's owner at click time, denormalized for per-owner analytics.
#[derive(Debug, Clone)]
pub struct Click {
    pub id: i64,
    pub link_id: i64,
    pub owner_id: Option<i64>,
    pub clicked_at: DateTime<Utc>,
    pub ip: String,
    pub redirected: bool,
}

/// Input data for recording a new click.
#[derive(Debug, Clone)]
pub struct NewClick {
    pub link_id: i64,
    pub owner_id: Option<i64>,
    pub ip: String,
    pub dimensions: DimensionIds,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_class_names() {
        assert_eq!(DeviceClass::Mobile.as_str(), "Mobile");
        assert_eq!(DeviceClass::Tablet.as_str(), "Tablet");
        assert_eq!(DeviceClass::Pc.as_str(), "PC");
        assert_eq!(DeviceClass::Bot.as_str(), "Bot");
        assert_eq!(DeviceClass::Unknown.as_str(), "Unknown");
    }
}
