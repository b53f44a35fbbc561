//! Handlers for link listing, retrieval and deletion.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};

use crate::api::dto::links::{LinkListResponse, LinkResponse};
use crate::api::middleware::CurrentIdentity;
use crate::error::AppError;
use crate::state::AppState;

/// Lists the caller's links, newest first.
///
/// # Endpoint
///
/// `GET /api/urls`
pub async fn list_links_handler(
    State(state): State<AppState>,
    Extension(CurrentIdentity(identity)): Extension<CurrentIdentity>,
) -> Result<Json<LinkListResponse>, AppError> {
    let links = state.link_service.list(identity.id).await?;

    let links: Vec<LinkResponse> = links
        .into_iter()
        .map(|link| LinkResponse::from_link(link, &state.base_url))
        .collect();

    Ok(Json(LinkListResponse {
        total: links.len(),
        links,
    }))
}

/// Returns one of the caller's links by id.
///
/// # Endpoint
///
/// `GET /api/urls/{id}`
///
/// # Errors
///
/// Returns 404 for an unknown id or a link owned by someone else.
pub async fn get_link_handler(
    State(state): State<AppState>,
    Extension(CurrentIdentity(identity)): Extension<CurrentIdentity>,
    Path(id): Path<i64>,
) -> Result<Json<LinkResponse>, AppError> {
    let link = state.link_service.get_owned(identity.id, id).await?;

    Ok(Json(LinkResponse::from_link(link, &state.base_url)))
}

/// Deletes one of the caller's links, along with its click history.
///
/// # Endpoint
///
/// `DELETE /api/urls/{id}`
///
/// # Errors
///
/// Returns 404 for an unknown id or a link owned by someone else.
pub async fn delete_link_handler(
    State(state): State<AppState>,
    Extension(CurrentIdentity(identity)): Extension<CurrentIdentity>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    state.link_service.delete(identity.id, id).await?;

    Ok(StatusCode::NO_CONTENT)
}
