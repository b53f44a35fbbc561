//! DTOs for link creation.

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::Deserialize;
use std::sync::LazyLock;
use validator::Validate;

/// Compiled regex for custom slug validation.
static CUSTOM_SLUG_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[a-z0-9-]+$").unwrap());

/// Request to shorten a URL.
///
/// `url` is only bounds-checked here; parsing is owned by the normalizer,
/// which also accepts scheme-less input (`example.com/page`) and rejects
/// non-HTTP(S) schemes.
#[derive(Debug, Deserialize, Validate)]
pub struct ShortenRequest {
    /// The destination to shorten.
    #[validate(length(min = 1, max = 2048, message = "URL must be 1-2048 characters"))]
    pub url: String,

    /// Optional custom slug (registered accounts only).
    #[validate(length(min = 4, max = 30))]
    #[validate(regex(path = "*CUSTOM_SLUG_REGEX"))]
    pub custom_slug: Option<String>,

    /// Optional expiry timestamp. After this time, redirects stop being served.
    pub expires_at: Option<DateTime<Utc>>,
}
