//! Handler for link creation.

use axum::{extract::State, http::StatusCode, Extension, Json};
use validator::Validate;

use crate::api::dto::links::LinkResponse;
use crate::api::dto::shorten::ShortenRequest;
use crate::api::middleware::CurrentIdentity;
use crate::error::AppError;
use crate::state::AppState;

/// Creates (or reuses) a short link for the authenticated caller.
///
/// # Endpoint
///
/// `POST /api/shorten`
///
/// # Request Body
///
/// ```json
/// {
///   "url": "https://example.com/some/page",
///   "custom_slug": "my-page",            // optional, registered accounts only
///   "expires_at": "2027-01-01T00:00:00Z" // optional
/// }
/// ```
///
/// # Response Codes
///
/// - **201 Created**: a new link was allocated
/// - **200 OK**: the caller already had a link for this destination
///
/// # Errors
///
/// Returns 400 for an invalid URL or slug, 403 when a guest requests a custom
/// slug, and 409 when a custom slug is taken.
pub async fn shorten_handler(
    State(state): State<AppState>,
    Extension(CurrentIdentity(identity)): Extension<CurrentIdentity>,
    Json(payload): Json<ShortenRequest>,
) -> Result<(StatusCode, Json<LinkResponse>), AppError> {
    payload.validate()?;

    let outcome = state
        .link_service
        .shorten(&identity, payload.url, payload.custom_slug, payload.expires_at)
        .await?;

    let status = if outcome.created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };

    Ok((
        status,
        Json(LinkResponse::from_link(outcome.link, &state.base_url)),
    ))
}
