//! DTOs for link management responses.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::entities::Link;

/// JSON representation of a short link.
#[derive(Debug, Serialize)]
pub struct LinkResponse {
    pub id: i64,
    pub original_url: String,
    pub slug: String,
    pub short_url: String,
    pub customized: bool,
    pub is_active: bool,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl LinkResponse {
    /// Builds the response, deriving the full short URL from the service's
    /// public base URL.
    pub fn from_link(link: Link, base_url: &str) -> Self {
        let short_url = format!("{}/{}", base_url.trim_end_matches('/'), link.slug);

        Self {
            id: link.id,
            original_url: link.original_url,
            slug: link.slug,
            short_url,
            customized: link.customized,
            is_active: link.is_active,
            expires_at: link.expires_at,
            created_at: link.created_at,
        }
    }
}

/// Response for the link list endpoint.
#[derive(Debug, Serialize)]
pub struct LinkListResponse {
    pub total: usize,
    pub links: Vec<LinkResponse>,
}
