//! IP geolocation collaborators.
//!
//! Geolocation is strictly best-effort: every failure path (no database
//! configured, unresolvable address, timeout at the call site) degrades to the
//! `"Unknown"` country and must never abort a redirect.

pub mod maxmind;

use async_trait::async_trait;
use std::net::IpAddr;

pub use maxmind::MaxMindResolver;

/// Sentinel dimension value used whenever resolution fails.
pub const UNKNOWN: &str = "Unknown";

/// Errors a resolver can produce. Callers log and degrade, never propagate.
#[derive(Debug, thiserror::Error)]
pub enum GeoResolveError {
    #[error("no geolocation database configured")]
    Unavailable,

    #[error("address not found in geolocation database")]
    NotFound,

    #[error("geolocation lookup failed: {0}")]
    Lookup(String),
}

/// Resolves an IP address to a country name.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GeoResolver: Send + Sync {
    async fn resolve_country(&self, ip: IpAddr) -> Result<String, GeoResolveError>;
}

/// Resolver used when no geolocation database is configured; always fails,
/// which the caller turns into [`UNKNOWN`].
pub struct NullResolver;

#[async_trait]
impl GeoResolver for NullResolver {
    async fn resolve_country(&self, _ip: IpAddr) -> Result<String, GeoResolveError> {
        Err(GeoResolveError::Unavailable)
    }
}
