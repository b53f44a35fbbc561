//! Handlers for guest provisioning, registration, login and token refresh.

use axum::{extract::State, http::StatusCode, Json};
use validator::Validate;

use crate::api::dto::auth::{
    LoginRequest, RefreshRequest, RegisterRequest, SessionResponse, TokenResponse,
};
use crate::error::AppError;
use crate::state::AppState;

/// Provisions an anonymous guest session.
///
/// # Endpoint
///
/// `POST /auth/guest`
///
/// Guests can shorten links and follow redirects but cannot use custom slugs
/// or read analytics. Registering (or logging in) later with the guest's
/// token migrates the guest's links into the account.
pub async fn guest_handler(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<SessionResponse>), AppError> {
    let session = state.auth_service.guest_session().await?;

    Ok((StatusCode::CREATED, Json(session.into())))
}

/// Registers a new account and signs it in.
///
/// # Endpoint
///
/// `POST /auth/register`
///
/// # Errors
///
/// Returns 400 for invalid input and 409 when the username or email is taken.
pub async fn register_handler(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<SessionResponse>), AppError> {
    payload.validate()?;

    let session = state
        .auth_service
        .register(
            payload.username,
            payload.email,
            &payload.password,
            payload.guest_token.as_deref(),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(session.into())))
}

/// Signs in with email and password.
///
/// # Endpoint
///
/// `POST /auth/login`
///
/// When the request carries a `guest_token`, that guest's links are folded
/// into the account and the response reports what moved.
///
/// # Errors
///
/// Returns 401 for bad credentials, without saying which part was wrong.
pub async fn login_handler(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<SessionResponse>, AppError> {
    payload.validate()?;

    let session = state
        .auth_service
        .login(
            &payload.email,
            &payload.password,
            payload.guest_token.as_deref(),
        )
        .await?;

    Ok(Json(session.into()))
}

/// Exchanges a refresh token for a new token pair.
///
/// # Endpoint
///
/// `POST /auth/refresh`
///
/// # Errors
///
/// Returns 401 for an invalid, expired, or wrong-type token.
pub async fn refresh_handler(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    payload.validate()?;

    let pair = state.auth_service.refresh(&payload.refresh).await?;

    Ok(Json(TokenResponse {
        access: pair.access,
        refresh: pair.refresh,
    }))
}
