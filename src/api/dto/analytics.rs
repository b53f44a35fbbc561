//! DTOs for link analytics responses.

use serde::Serialize;

use crate::domain::repositories::LinkAnalytics;

/// Aggregated click analytics for one link.
#[derive(Debug, Serialize)]
pub struct AnalyticsResponse {
    pub total_clicks: i64,
    pub successful_redirects: i64,
    pub failed_redirects: i64,
    pub countries: Vec<String>,
    pub browsers: Vec<String>,
    pub platforms: Vec<String>,
    pub devices: Vec<String>,
}

impl From<LinkAnalytics> for AnalyticsResponse {
    fn from(analytics: LinkAnalytics) -> Self {
        Self {
            total_clicks: analytics.total_clicks,
            successful_redirects: analytics.successful_redirects,
            failed_redirects: analytics.failed_redirects,
            countries: analytics.countries,
            browsers: analytics.browsers,
            platforms: analytics.platforms,
            devices: analytics.devices,
        }
    }
}
