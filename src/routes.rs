//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `GET  /{slug}`      - Short link redirect (public)
//! - `GET  /health`      - Health check: DB, geolocation (public)
//! - `/auth/*`           - Sessions: guest, register, login, refresh (public)
//! - `/api/*`            - Link management (Bearer token required)
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging
//! - **Rate limiting** - Per-IP token bucket, stricter on auth endpoints
//! - **Authentication** - Bearer access token on `/api/*`
//! - **Path normalization** - Trailing slash handling

use crate::api;
use crate::api::handlers::{health_handler, redirect_handler};
use crate::api::middleware::{auth, rate_limit, tracing};
use crate::state::AppState;
use axum::routing::get;
use axum::{middleware, Router};
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

/// Constructs the application router with all routes and middleware.
pub fn app_router(state: AppState) -> NormalizePath<Router> {
    let api_router = api::routes::protected_routes()
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::layer))
        .layer(rate_limit::layer());

    let auth_router = api::routes::auth_routes().layer(rate_limit::secure_layer());

    let router = Router::new()
        .route("/{slug}", get(redirect_handler))
        .route("/health", get(health_handler))
        .nest("/api", api_router)
        .nest("/auth", auth_router)
        .with_state(state)
        .layer(tracing::layer());

    NormalizePathLayer::trim_trailing_slash().layer(router)
}
