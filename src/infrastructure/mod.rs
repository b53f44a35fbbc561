//! Infrastructure adapters: persistence, token issuance, GeoIP and
//! user-agent enrichment.

pub mod geoip;
pub mod jwt;
pub mod persistence;
pub mod user_agent;
