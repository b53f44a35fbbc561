//! HTTP server initialization and runtime setup.
//!
//! Handles database connections, migrations, service wiring, and Axum server
//! lifecycle.

use crate::application::services::{AnalyticsService, AuthService, LinkService, RedirectService};
use crate::config::Config;
use crate::infrastructure::geoip::{GeoResolver, MaxMindResolver, NullResolver};
use crate::infrastructure::jwt::JwtIssuer;
use crate::infrastructure::persistence::{
    PgClickRepository, PgIdentityRepository, PgLinkRepository,
};
use crate::routes::app_router;
use crate::state::AppState;

use anyhow::Result;
use axum::extract::Request;
use axum::ServiceExt;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - PostgreSQL connection pool
/// - Migrations
/// - MaxMind geolocation reader (or a null resolver when unconfigured)
/// - Service wiring and the Axum HTTP server
///
/// # Errors
///
/// Returns an error if:
/// - Database connection or migration fails
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
        .idle_timeout(Duration::from_secs(config.db_idle_timeout))
        .max_lifetime(Duration::from_secs(config.db_max_lifetime))
        .connect(&config.database_url)
        .await?;
    tracing::info!("Connected to database");

    sqlx::migrate!("./migrations").run(&pool).await?;
    tracing::info!("Migrations applied");

    let (geo_resolver, geo_enabled): (Arc<dyn GeoResolver>, bool) = match &config.geoip_db_path {
        Some(path) => match MaxMindResolver::open(path) {
            Ok(resolver) => {
                tracing::info!("Geolocation enabled ({path})");
                (Arc::new(resolver), true)
            }
            Err(e) => {
                tracing::warn!("Failed to load geolocation database: {e}. Disabling geolocation.");
                (Arc::new(NullResolver), false)
            }
        },
        None => {
            tracing::info!("Geolocation disabled");
            (Arc::new(NullResolver), false)
        }
    };

    let pool = Arc::new(pool);
    let link_repository = Arc::new(PgLinkRepository::new(pool.clone()));
    let click_repository = Arc::new(PgClickRepository::new(pool.clone()));
    let identity_repository = Arc::new(PgIdentityRepository::new(pool.clone()));

    let jwt = Arc::new(JwtIssuer::new(
        &config.jwt_secret,
        config.access_token_ttl,
        config.refresh_token_ttl,
    ));

    let state = AppState {
        db: pool,
        base_url: config.base_url.clone(),
        behind_proxy: config.behind_proxy,
        geo_enabled,
        link_service: Arc::new(LinkService::new(
            link_repository.clone(),
            config.slug_length,
        )),
        redirect_service: Arc::new(RedirectService::new(
            link_repository.clone(),
            click_repository.clone(),
            geo_resolver,
            Duration::from_millis(config.geoip_timeout_ms),
        )),
        auth_service: Arc::new(AuthService::new(identity_repository, jwt)),
        analytics_service: Arc::new(AnalyticsService::new(link_repository, click_repository)),
    };

    let app = app_router(state);

    let addr: SocketAddr = config.listen_addr.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
    )
    .await?;

    Ok(())
}
