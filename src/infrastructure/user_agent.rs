//! User-agent parsing for click analytics.
//!
//! Wraps `woothee` and maps its output onto the three analytics dimensions the
//! click recorder stores. A missing or unparseable header yields `"Unknown"`
//! for every dimension; parsing never fails a redirect.

use woothee::parser::Parser;

use crate::domain::entities::{ClickDimensions, DeviceClass};
use crate::infrastructure::geoip::UNKNOWN;

/// Browser family, platform family, and device class for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedUserAgent {
    pub browser: String,
    pub platform: String,
    pub device: DeviceClass,
}

impl ParsedUserAgent {
    /// Combines the parsed user agent with a resolved country into the four
    /// dimension names the click recorder persists.
    pub fn into_dimensions(self, country: String) -> ClickDimensions {
        ClickDimensions {
            country,
            browser: self.browser,
            platform: self.platform,
            device: self.device.as_str().to_string(),
        }
    }
}

/// Parses a user-agent header value.
pub fn parse_user_agent(user_agent: Option<&str>) -> ParsedUserAgent {
    let Some(ua) = user_agent.filter(|s| !s.trim().is_empty()) else {
        return unknown();
    };

    let Some(result) = Parser::new().parse(ua) else {
        return unknown();
    };

    let browser = non_empty_or_unknown(result.name);
    let platform = non_empty_or_unknown(result.os);
    let device = classify_device(result.category, result.os, ua);

    ParsedUserAgent {
        browser,
        platform,
        device,
    }
}

fn unknown() -> ParsedUserAgent {
    ParsedUserAgent {
        browser: UNKNOWN.to_string(),
        platform: UNKNOWN.to_string(),
        device: DeviceClass::Unknown,
    }
}

fn non_empty_or_unknown(value: &str) -> String {
    if value.is_empty() || value == "UNKNOWN" {
        UNKNOWN.to_string()
    } else {
        value.to_string()
    }
}

/// Maps woothee's category (plus a tablet heuristic, since woothee folds
/// tablets into `smartphone`) onto a [`DeviceClass`].
fn classify_device(category: &str, os: &str, ua: &str) -> DeviceClass {
    match category {
        "pc" => DeviceClass::Pc,
        "crawler" => DeviceClass::Bot,
        "smartphone" | "mobilephone" => {
            if os == "iPad" || ua.contains("iPad") || ua.contains("Tablet") {
                DeviceClass::Tablet
            } else {
                DeviceClass::Mobile
            }
        }
        _ => DeviceClass::Unknown,
    }
}
