use axum::{
    Json,
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use super::validation::parse_facility_id;
use super::{ApiError, ApiResponse, AppState, AuthUser};
use crate::services::{ExportError, ExportFile, ExportFormat, ExportStats};

impl From<ExportError> for ApiError {
    fn from(err: ExportError) -> Self {
        match err {
            ExportError::FacilityNotFound(id) => Self::not_found("Facility", id),
            ExportError::Database(msg) => Self::DatabaseError(msg),
            ExportError::Serialize(msg) => Self::InternalError(msg),
        }
    }
}

fn attachment(file: ExportFile) -> Response {
    (
        [
            (header::CONTENT_TYPE, file.content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", file.file_name),
            ),
        ],
        file.body,
    )
        .into_response()
}

async fn export(
    state: &AppState,
    facility_id: &str,
    format: ExportFormat,
) -> Result<Response, ApiError> {
    let id = parse_facility_id(facility_id)?;
    let file = state.shared.export_service.export(id, format).await?;
    Ok(attachment(file))
}

/// GET /export/csv/{facility_id}
pub async fn export_csv(
    State(state): State<Arc<AppState>>,
    Path(facility_id): Path<String>,
) -> Result<Response, ApiError> {
    export(&state, &facility_id, ExportFormat::Csv).await
}

/// GET /export/json/{facility_id}
pub async fn export_json(
    State(state): State<Arc<AppState>>,
    Path(facility_id): Path<String>,
) -> Result<Response, ApiError> {
    export(&state, &facility_id, ExportFormat::Json).await
}

/// GET /export/stats
pub async fn get_stats(
    State(state): State<Arc<AppState>>,
    AuthUser(_user): AuthUser,
) -> Result<Json<ApiResponse<ExportStats>>, ApiError> {
    let stats = state.shared.export_service.stats().await?;
    Ok(Json(ApiResponse::success(stats)))
}
