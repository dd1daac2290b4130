use axum::{
    Router,
    http::{HeaderValue, header},
    middleware,
    routing::{get, post},
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::clients::{Crawler, TextGenerator};
use crate::config::Config;
use crate::db::Store;
use crate::state::SharedState;

pub mod auth;
mod error;
mod export;
mod facilities;
mod keywords;
mod observability;
mod system;
mod types;
mod validation;

pub use auth::{AuthUser, CurrentUser};
pub use error::ApiError;
pub use types::*;

use metrics_exporter_prometheus::PrometheusHandle;

#[derive(Clone)]
pub struct AppState {
    pub shared: Arc<SharedState>,

    pub start_time: std::time::Instant,

    pub prometheus_handle: Option<PrometheusHandle>,
}

impl AppState {
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.shared.config
    }

    #[must_use]
    pub fn store(&self) -> &Store {
        &self.shared.store
    }
}

#[must_use]
pub fn create_app_state(
    shared: Arc<SharedState>,
    prometheus_handle: Option<PrometheusHandle>,
) -> Arc<AppState> {
    Arc::new(AppState {
        shared,
        start_time: std::time::Instant::now(),
        prometheus_handle,
    })
}

pub async fn create_app_state_from_config(
    config: Config,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    let shared = Arc::new(SharedState::new(config).await?);
    Ok(create_app_state(shared, prometheus_handle))
}

/// Builds state around caller-supplied upstream clients.
pub async fn create_app_state_with_clients(
    config: Config,
    crawler: Arc<dyn Crawler>,
    text: Arc<dyn TextGenerator>,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    let shared = Arc::new(SharedState::with_clients(config, crawler, text).await?);
    Ok(create_app_state(shared, prometheus_handle))
}

pub fn router(state: Arc<AppState>) -> Router {
    let cors_origins = state.config().server.cors_allowed_origins.clone();

    let api_router = Router::new()
        .route("/health", get(system::health))
        .route("/health/ready", get(system::readiness))
        .route("/metrics", get(observability::get_metrics))
        .route("/auth/login", post(auth::login))
        .route("/auth/me", get(auth::get_current_user))
        .route("/auth/api-key/regenerate", post(auth::regenerate_api_key))
        .route(
            "/facilities",
            get(facilities::list_facilities).post(facilities::create_facility),
        )
        .route(
            "/facilities/business-types/list",
            get(facilities::list_business_types),
        )
        .route("/facilities/stats/summary", get(facilities::get_stats))
        .route(
            "/facilities/{id}",
            get(facilities::get_facility)
                .put(facilities::update_facility)
                .delete(facilities::delete_facility),
        )
        .route("/keywords/stats/summary", get(keywords::get_stats))
        .route(
            "/keywords/generate/{facility_id}",
            post(keywords::generate_keywords),
        )
        .route(
            "/keywords/{facility_id}",
            get(keywords::get_keywords)
                .put(keywords::update_keywords)
                .delete(keywords::delete_keywords),
        )
        .route("/export/csv/{facility_id}", get(export::export_csv))
        .route("/export/json/{facility_id}", get(export::export_json))
        .route("/export/stats", get(export::get_stats))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::identify_middleware,
        ))
        .with_state(state);

    let cors_layer = if cors_origins.iter().any(|o| o == "*") {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins)
    };

    Router::new().nest("/api", api_router).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(middleware::from_fn(observability::trace_request))
            .layer(SetResponseHeaderLayer::overriding(
                header::X_CONTENT_TYPE_OPTIONS,
                HeaderValue::from_static("nosniff"),
            ))
            .layer(SetResponseHeaderLayer::overriding(
                header::X_FRAME_OPTIONS,
                HeaderValue::from_static("DENY"),
            ))
            .layer(SetResponseHeaderLayer::overriding(
                header::REFERRER_POLICY,
                HeaderValue::from_static("no-referrer"),
            ))
            .layer(cors_layer.allow_methods(Any).allow_headers(Any)),
    )
}
