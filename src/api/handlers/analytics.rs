//! Handler for per-link click analytics.

use axum::{
    extract::{Path, State},
    Extension, Json,
};

use crate::api::dto::analytics::AnalyticsResponse;
use crate::api::middleware::CurrentIdentity;
use crate::error::AppError;
use crate::state::AppState;

/// Returns click analytics for one of the caller's links.
///
/// # Endpoint
///
/// `GET /api/urls/{id}/analytics`
///
/// # Response
///
/// ```json
/// {
///   "total_clicks": 10,
///   "successful_redirects": 8,
///   "failed_redirects": 2,
///   "countries": ["Germany", "Unknown"],
///   "browsers": ["Chrome", "Firefox"],
///   "platforms": ["Mac OSX"],
///   "devices": ["PC", "Mobile"]
/// }
/// ```
///
/// # Errors
///
/// Returns 403 for guest callers and 404 for an unknown or foreign link.
pub async fn analytics_handler(
    State(state): State<AppState>,
    Extension(CurrentIdentity(identity)): Extension<CurrentIdentity>,
    Path(id): Path<i64>,
) -> Result<Json<AnalyticsResponse>, AppError> {
    let analytics = state.analytics_service.link_analytics(&identity, id).await?;

    Ok(Json(analytics.into()))
}
