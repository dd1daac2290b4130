use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
};
use std::sync::Arc;

use super::validation::{normalize_filter, parse_facility_id, validate_limit, validate_offset};
use super::{ApiError, ApiResponse, AppState, AuthUser, FacilityListQuery, PageMeta};
use crate::models::{Facility, FacilityFilter, FacilityPatch, FacilityStats, NewFacility};
use crate::services::FacilityError;

impl From<FacilityError> for ApiError {
    fn from(err: FacilityError) -> Self {
        match err {
            FacilityError::NotFound(id) => Self::not_found("Facility", id),
            FacilityError::Validation(msg) => Self::ValidationError(msg),
            FacilityError::Database(msg) => Self::DatabaseError(msg),
        }
    }
}

/// GET /facilities
pub async fn list_facilities(
    State(state): State<Arc<AppState>>,
    query: Result<Query<FacilityListQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<Vec<Facility>>>, ApiError> {
    let Query(query) = query?;

    let filter = FacilityFilter {
        business_type: normalize_filter(query.business_type),
        search: normalize_filter(query.search),
        limit: validate_limit(query.limit)?,
        offset: validate_offset(query.offset)?,
    };

    let page = state.shared.facility_service.list(filter).await?;

    Ok(Json(ApiResponse::paged(
        page.items,
        PageMeta {
            total: page.total,
            limit: page.limit,
            offset: page.offset,
        },
    )))
}

/// GET /facilities/{id}
pub async fn get_facility(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Facility>>, ApiError> {
    let id = parse_facility_id(&id)?;
    let facility = state.shared.facility_service.get(id).await?;
    Ok(Json(ApiResponse::success(facility)))
}

/// POST /facilities
pub async fn create_facility(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    payload: Result<Json<NewFacility>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<Facility>>), ApiError> {
    let Json(input) = payload?;

    let facility = state
        .shared
        .facility_service
        .create(input, Some(user.id))
        .await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::success(facility))))
}

/// PUT /facilities/{id}
pub async fn update_facility(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
    payload: Result<Json<FacilityPatch>, JsonRejection>,
) -> Result<Json<ApiResponse<Facility>>, ApiError> {
    let id = parse_facility_id(&id)?;
    let Json(patch) = payload?;

    let facility = state
        .shared
        .facility_service
        .update(id, patch, Some(user.id))
        .await?;

    Ok(Json(ApiResponse::success(facility)))
}

/// DELETE /facilities/{id}
pub async fn delete_facility(
    State(state): State<Arc<AppState>>,
    AuthUser(_user): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let id = parse_facility_id(&id)?;
    state.shared.facility_service.delete(id).await?;
    Ok(Json(ApiResponse::message(format!("Facility {id} deleted"))))
}

/// GET /facilities/business-types/list
pub async fn list_business_types(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<String>>>, ApiError> {
    let types = state.shared.facility_service.business_types().await?;
    Ok(Json(ApiResponse::success(types)))
}

/// GET /facilities/stats/summary
pub async fn get_stats(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<FacilityStats>>, ApiError> {
    let stats = state.shared.facility_service.stats().await?;
    Ok(Json(ApiResponse::success(stats)))
}
