//! MaxMind GeoLite2 country resolver.

use async_trait::async_trait;
use maxminddb::{geoip2, MaxMindDBError, Reader};
use std::net::IpAddr;
use std::path::Path;
use tracing::trace;

use super::{GeoResolveError, GeoResolver};

/// Country resolver backed by a local GeoLite2 database file.
///
/// Lookups are in-memory reads against the loaded database; the timeout the
/// redirect path wraps around [`GeoResolver::resolve_country`] is a contract
/// guard, not something this implementation is expected to hit.
pub struct MaxMindResolver {
    reader: Reader<Vec<u8>>,
}

impl MaxMindResolver {
    /// Loads a `GeoLite2-Country.mmdb` (or `-City`) database from disk.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, MaxMindDBError> {
        let reader = Reader::open_readfile(path)?;
        Ok(Self { reader })
    }
}

#[async_trait]
impl GeoResolver for MaxMindResolver {
    async fn resolve_country(&self, ip: IpAddr) -> Result<String, GeoResolveError> {
        let record: geoip2::Country = self.reader.lookup(ip).map_err(|e| match e {
            MaxMindDBError::AddressNotFoundError(_) => GeoResolveError::NotFound,
            other => GeoResolveError::Lookup(other.to_string()),
        })?;

        let country = record
            .country
            .ok_or(GeoResolveError::NotFound)?;

        let name = country
            .names
            .as_ref()
            .and_then(|names| names.get("en").copied())
            .or(country.iso_code)
            .ok_or(GeoResolveError::NotFound)?;

        trace!("resolved {ip} to {name}");
        Ok(name.to_string())
    }
}
