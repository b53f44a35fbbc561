//! Bearer token authentication middleware.

use axum::{
    extract::{FromRequestParts, Request, State},
    middleware::Next,
    response::Response,
};
use axum_auth::AuthBearer;

use crate::{domain::entities::Identity, error::AppError, state::AppState};

/// The authenticated identity, inserted into request extensions for handlers
/// behind the auth middleware.
#[derive(Debug, Clone)]
pub struct CurrentIdentity(pub Identity);

/// Authenticates requests using a Bearer access token.
///
/// # Header Format
///
/// ```text
/// Authorization: Bearer <access token>
/// ```
///
/// The token is validated and resolved to a live identity; disabled or
/// deleted identities are rejected even with a formally valid token. The
/// identity is then exposed to handlers via [`CurrentIdentity`].
///
/// # Errors
///
/// Returns `401 Unauthorized` if:
/// - Authorization header is missing or malformed
/// - Token signature or expiry check fails
/// - The identity behind the token no longer exists or is disabled
pub async fn layer(
    State(st): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let (mut parts, body) = req.into_parts();

    let AuthBearer(token) = AuthBearer::from_request_parts(&mut parts, &())
        .await
        .map_err(|_| {
            AppError::unauthorized(
                "Unauthorized",
                serde_json::json!({"reason": "Authorization header is missing or invalid"}),
            )
        })?;

    let identity = st.auth_service.current_identity(&token).await?;

    let mut req = Request::from_parts(parts, body);
    req.extensions_mut().insert(CurrentIdentity(identity));

    Ok(next.run(req).await)
}
