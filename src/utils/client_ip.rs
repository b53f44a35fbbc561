//! Client IP extraction for click recording.

use axum::http::HeaderMap;
use std::net::{IpAddr, SocketAddr};

/// Resolves the client IP for a request.
///
/// When `behind_proxy` is set, the first entry of `X-Forwarded-For` (falling
/// back to `X-Real-IP`) wins over the socket peer address. Headers are only
/// trusted behind a reverse proxy; otherwise any client could spoof its
/// location in the analytics.
pub fn client_ip(headers: &HeaderMap, peer: SocketAddr, behind_proxy: bool) -> IpAddr {
    if behind_proxy {
        if let Some(ip) = forwarded_ip(headers) {
            return ip;
        }
    }
    peer.ip()
}

fn forwarded_ip(headers: &HeaderMap) -> Option<IpAddr> {
    if let Some(value) = headers.get("x-forwarded-for") {
        let first = value.to_str().ok()?.split(',').next()?.trim();
        if let Ok(ip) = first.parse() {
            return Some(ip);
        }
    }
    headers
        .get("x-real-ip")?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()
}
