use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
};
use std::sync::Arc;

use super::validation::parse_facility_id;
use super::{ApiError, ApiResponse, AppState, AuthUser};
use crate::models::{KeywordSet, KeywordStats};
use crate::services::KeywordError;

impl From<KeywordError> for ApiError {
    fn from(err: KeywordError) -> Self {
        match err {
            KeywordError::FacilityNotFound(id) => Self::not_found("Facility", id),
            KeywordError::Validation(msg) => Self::ValidationError(msg),
            KeywordError::Database(msg) => Self::DatabaseError(msg),
            KeywordError::Generation { service, message } => Self::ExternalApiError {
                service: service.to_string(),
                message,
            },
        }
    }
}

/// GET /keywords/{facility_id}
pub async fn get_keywords(
    State(state): State<Arc<AppState>>,
    Path(facility_id): Path<String>,
) -> Result<Json<ApiResponse<KeywordSet>>, ApiError> {
    let id = parse_facility_id(&facility_id)?;
    let keywords = state.shared.keyword_service.get(id).await?;
    Ok(Json(ApiResponse::success(keywords)))
}

/// PUT /keywords/{facility_id}
pub async fn update_keywords(
    State(state): State<Arc<AppState>>,
    AuthUser(_user): AuthUser,
    Path(facility_id): Path<String>,
    payload: Result<Json<KeywordSet>, JsonRejection>,
) -> Result<Json<ApiResponse<KeywordSet>>, ApiError> {
    let id = parse_facility_id(&facility_id)?;
    let Json(keywords) = payload?;

    let saved = state.shared.keyword_service.update(id, keywords).await?;
    Ok(Json(ApiResponse::success(saved)))
}

/// POST /keywords/generate/{facility_id}
pub async fn generate_keywords(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(facility_id): Path<String>,
) -> Result<Json<ApiResponse<KeywordSet>>, ApiError> {
    let id = parse_facility_id(&facility_id)?;
    tracing::info!(facility_id = %id, user = %user.username, "Keyword generation requested");

    let keywords = state.shared.keyword_service.generate(id).await?;
    Ok(Json(ApiResponse::success(keywords)))
}

/// DELETE /keywords/{facility_id}
pub async fn delete_keywords(
    State(state): State<Arc<AppState>>,
    AuthUser(_user): AuthUser,
    Path(facility_id): Path<String>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let id = parse_facility_id(&facility_id)?;
    let removed = state.shared.keyword_service.delete(id).await?;
    Ok(Json(ApiResponse::message(format!(
        "Deleted {removed} keywords for facility {id}"
    ))))
}

/// GET /keywords/stats/summary
pub async fn get_stats(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<KeywordStats>>, ApiError> {
    let stats = state.shared.keyword_service.stats().await?;
    Ok(Json(ApiResponse::success(stats)))
}
