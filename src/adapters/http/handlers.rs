//! HTTP endpoint handlers.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::HashMap;

use super::AppState;
use crate::domain::errors::DomainError;
use crate::domain::models::{ItemDraft, ListingQuery};

/// HTTP-facing error wrapper.
///
/// Only store-write failures and total catalog unavailability surface as
/// request errors; cache and invalidation failures were already swallowed
/// deeper in the stack.
pub struct ApiError(DomainError);

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            DomainError::ItemNotFound(_) => StatusCode::NOT_FOUND,
            DomainError::ValidationFailed(_) | DomainError::UnknownCounterField(_) => {
                StatusCode::BAD_REQUEST
            }
            DomainError::SnapshotUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            DomainError::Store(_)
            | DomainError::CacheBackend(_)
            | DomainError::SerializationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

type ApiResult<T> = Result<T, ApiError>;

/// `GET /items` — paginated, searchable, filterable listing.
///
/// Raw query parameters are coerced permissively; malformed numeric values
/// never produce a 4xx.
pub async fn list_items(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<Response> {
    let query = ListingQuery::from_params(&params);
    let response = state.listing.list(&query).await?;
    Ok(Json(response).into_response())
}

/// `GET /items/:id`
pub async fn get_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Response> {
    match state.listing.get_item(&id).await? {
        Some(item) => Ok(Json(item).into_response()),
        None => Err(DomainError::ItemNotFound(id).into()),
    }
}

/// `POST /items`
pub async fn create_item(
    State(state): State<AppState>,
    Json(draft): Json<ItemDraft>,
) -> ApiResult<Response> {
    let item = state.catalog.create(draft).await?;
    Ok((StatusCode::CREATED, Json(item)).into_response())
}

/// `PUT /items/:id`
pub async fn update_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(draft): Json<ItemDraft>,
) -> ApiResult<Response> {
    let item = state.catalog.update(&id, draft).await?;
    Ok(Json(item).into_response())
}

/// `DELETE /items/:id`
pub async fn delete_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.catalog.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Body for the like toggle.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeRequest {
    pub user_id: String,
}

/// Response for the like toggle.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeResponse {
    pub liked: bool,
}

/// `POST /items/:id/like`
pub async fn toggle_like(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<LikeRequest>,
) -> ApiResult<Json<LikeResponse>> {
    let liked = state.catalog.toggle_like(&id, &body.user_id).await?;
    Ok(Json(LikeResponse { liked }))
}

/// `POST /items/:id/view`
pub async fn record_view(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.catalog.record_view(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /items/:id/download`
pub async fn record_download(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.catalog.record_download(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /categories` — per-category item counts (cached aggregates).
pub async fn category_counts(State(state): State<AppState>) -> ApiResult<Response> {
    let counts = state.listing.category_counts().await?;
    let total = state.listing.total_count().await?;
    Ok(Json(json!({ "categories": counts, "totalCount": total })).into_response())
}

/// `POST /cache/refresh` — administrative "refresh now".
pub async fn refresh_cache(State(state): State<AppState>) -> ApiResult<Response> {
    let snapshot = state
        .snapshots
        .force_refresh()
        .await
        .map_err(|err| DomainError::SnapshotUnavailable(err.to_string()))?;
    Ok(Json(json!({ "itemCount": snapshot.item_count() })).into_response())
}

/// `GET /cache/stats`
pub async fn cache_stats(State(state): State<AppState>) -> Json<serde_json::Value> {
    let stats = state.snapshots.stats();
    let tracked = state.cache.tracked_keys().await;
    Json(json!({
        "snapshot": stats,
        "resultCache": { "trackedKeys": tracked },
    }))
}
