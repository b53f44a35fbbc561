//! Handler for short link redirect.

use axum::{
    extract::{ConnectInfo, Path, State},
    http::{header, HeaderMap},
    response::Redirect,
};
use std::net::SocketAddr;

use crate::error::AppError;
use crate::state::AppState;
use crate::utils::client_ip::client_ip;

/// Redirects a slug to its original URL, recording the click.
///
/// # Endpoint
///
/// `GET /{slug}`
///
/// # Request Flow
///
/// 1. Resolve the client IP (forwarding headers when behind a proxy)
/// 2. Look up the slug
/// 3. Record the click with its geo/user-agent dimensions
/// 4. Return 307 Temporary Redirect when the link is live
///
/// The click is recorded even when the link turns out to be expired or
/// deactivated; only then is the failure reported.
///
/// # Errors
///
/// Returns 404 `not_found` for an unknown slug and 404 `not_accessible` for
/// an inactive or expired link.
pub async fn redirect_handler(
    Path(slug): Path<String>,
    State(state): State<AppState>,
    headers: HeaderMap,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
) -> Result<Redirect, AppError> {
    let ip = client_ip(&headers, addr, state.behind_proxy);
    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok());

    let destination = state
        .redirect_service
        .resolve_and_record(&slug, ip, user_agent)
        .await?;

    Ok(Redirect::temporary(&destination))
}
