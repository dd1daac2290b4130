use axum::{
    Json,
    extract::{FromRequestParts, Request, State, rejection::JsonRejection},
    http::{HeaderMap, request::Parts},
    middleware::Next,
    response::Response,
};
use serde::Serialize;
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState, LoginRequest};
use crate::services::{AuthError, LoginResult, UserInfo};

/// Caller identity resolved from an API key, stored in request extensions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CurrentUser {
    pub id: i32,
    pub username: String,
}

impl From<UserInfo> for CurrentUser {
    fn from(info: UserInfo) -> Self {
        Self {
            id: info.id,
            username: info.username,
        }
    }
}

/// Extractor for handlers that require an authenticated caller.
#[derive(Debug, Clone)]
pub struct AuthUser(pub CurrentUser);

impl<S: Send + Sync> FromRequestParts<S> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .map(Self)
            .ok_or_else(|| ApiError::unauthorized("Authentication required"))
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => Self::unauthorized("Invalid credentials"),
            AuthError::UserNotFound => Self::unauthorized("User not found"),
            AuthError::Database(msg) => Self::DatabaseError(msg),
        }
    }
}

/// Extract API key from `X-Api-Key` or `Authorization: Bearer`.
fn extract_api_key(headers: &HeaderMap) -> Option<String> {
    if let Some(api_key) = headers.get("X-Api-Key")
        && let Ok(key_str) = api_key.to_str()
        && !key_str.trim().is_empty()
    {
        return Some(key_str.trim().to_string());
    }

    if let Some(auth_header) = headers.get("Authorization")
        && let Ok(auth_str) = auth_header.to_str()
        && let Some(token) = auth_str.strip_prefix("Bearer ")
    {
        return Some(token.trim().to_string());
    }

    None
}

/// Resolves the caller for every request. Unknown or missing keys pass
/// through anonymously; [`AuthUser`] rejects them where identity is required.
pub async fn identify_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Response {
    if let Some(key) = extract_api_key(request.headers()) {
        match state.shared.auth_service.verify_api_key(&key).await {
            Ok(Some(user)) => {
                tracing::Span::current().record("user_id", user.id);
                request.extensions_mut().insert(CurrentUser::from(user));
            }
            Ok(None) => tracing::debug!("Request carried an unknown API key"),
            Err(e) => tracing::warn!(error = %e, "API key lookup failed"),
        }
    }

    next.run(request).await
}

/// POST /auth/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<LoginResult>>, ApiError> {
    let Json(payload) = payload?;

    if payload.username.trim().is_empty() {
        return Err(ApiError::validation("Username is required"));
    }
    if payload.password.is_empty() {
        return Err(ApiError::validation("Password is required"));
    }

    let result = state
        .shared
        .auth_service
        .login(payload.username.trim(), &payload.password)
        .await?;

    Ok(Json(ApiResponse::success(result)))
}

/// GET /auth/me
pub async fn get_current_user(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
) -> Result<Json<ApiResponse<CurrentUser>>, ApiError> {
    let info = state.shared.auth_service.get_user_info(user.id).await?;
    Ok(Json(ApiResponse::success(CurrentUser::from(info))))
}

/// POST /auth/api-key/regenerate
pub async fn regenerate_api_key(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
) -> Result<Json<ApiResponse<LoginResult>>, ApiError> {
    let result = state
        .shared
        .auth_service
        .regenerate_api_key(&user.username)
        .await?;

    Ok(Json(ApiResponse::success(result)))
}
