//! Shared application state injected into handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::application::services::{AnalyticsService, AuthService, LinkService, RedirectService};

/// Shared state: the database pool (for health checks) plus the wired
/// services handlers call into.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<PgPool>,
    /// Public base URL short links are advertised under, e.g. `https://sho.rt`.
    pub base_url: String,
    /// When true, client IPs are read from forwarding headers.
    pub behind_proxy: bool,
    /// Whether a geolocation database is loaded, for the health endpoint.
    pub geo_enabled: bool,
    pub link_service: Arc<LinkService>,
    pub redirect_service: Arc<RedirectService>,
    pub auth_service: Arc<AuthService>,
    pub analytics_service: Arc<AnalyticsService>,
}
