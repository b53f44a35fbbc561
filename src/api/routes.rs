//! API route configuration.
//!
//! Link management endpoints require Bearer token authentication via
//! [`crate::api::middleware::auth`]; the auth endpoints themselves are
//! public but rate limited more aggressively.

use crate::api::handlers::{
    analytics_handler, delete_link_handler, get_link_handler, guest_handler, list_links_handler,
    login_handler, refresh_handler, register_handler, shorten_handler,
};
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};

/// Link management routes, protected by Bearer token authentication.
///
/// # Endpoints
///
/// - `POST   /shorten`             - Create (or reuse) a short link
/// - `GET    /urls`                - List the caller's links
/// - `GET    /urls/{id}`           - Fetch one link
/// - `DELETE /urls/{id}`           - Delete a link and its clicks
/// - `GET    /urls/{id}/analytics` - Click analytics (registered users only)
pub fn protected_routes() -> Router<AppState> {
    Router::new()
        .route("/shorten", post(shorten_handler))
        .route("/urls", get(list_links_handler))
        .route(
            "/urls/{id}",
            get(get_link_handler).delete(delete_link_handler),
        )
        .route("/urls/{id}/analytics", get(analytics_handler))
}

/// Session endpoints: guest provisioning, registration, login, refresh.
///
/// # Endpoints
///
/// - `POST /guest`    - Provision an anonymous guest session
/// - `POST /register` - Create an account (migrates guest links)
/// - `POST /login`    - Sign in (migrates guest links)
/// - `POST /refresh`  - Exchange a refresh token
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/guest", post(guest_handler))
        .route("/register", post(register_handler))
        .route("/login", post(login_handler))
        .route("/refresh", post(refresh_handler))
}
