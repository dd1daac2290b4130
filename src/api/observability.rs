//! Request tracing, HTTP metrics and the Prometheus scrape endpoint.

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use std::time::Instant;
use tracing::{Instrument, info_span};

use super::AppState;

/// Coarse grouping of `/api` paths used as a metrics label.
///
/// Facility and keyword ids never reach a label, so series stay bounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteFamily {
    Facilities,
    Keywords,
    Export,
    Auth,
    Health,
    Metrics,
    Other,
}

impl RouteFamily {
    #[must_use]
    pub fn of(path: &str) -> Self {
        let rest = path.strip_prefix("/api/").unwrap_or_default();
        match rest.split('/').next().unwrap_or_default() {
            "facilities" => Self::Facilities,
            "keywords" => Self::Keywords,
            "export" => Self::Export,
            "auth" => Self::Auth,
            "health" => Self::Health,
            "metrics" => Self::Metrics,
            _ => Self::Other,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Facilities => "facilities",
            Self::Keywords => "keywords",
            Self::Export => "export",
            Self::Auth => "auth",
            Self::Health => "health",
            Self::Metrics => "metrics",
            Self::Other => "other",
        }
    }
}

/// `GET /api/metrics`; 404 while the recorder is disabled.
pub async fn get_metrics(State(state): State<Arc<AppState>>) -> Response {
    match &state.prometheus_handle {
        Some(handle) => handle.render().into_response(),
        None => (StatusCode::NOT_FOUND, "Metrics are disabled").into_response(),
    }
}

/// Opens the `http_request` span for the whole request.
///
/// `user_id` starts empty; the identify middleware fills it once the API key
/// resolves to a user.
pub async fn trace_request(req: Request, next: Next) -> Response {
    let started = Instant::now();
    let family = RouteFamily::of(req.uri().path());
    let method = req.method().clone();

    let span = info_span!(
        "http_request",
        request_id = %uuid::Uuid::new_v4(),
        method = %method,
        path = %req.uri().path(),
        family = family.as_str(),
        user_id = tracing::field::Empty,
    );

    async move {
        let response = next.run(req).await;
        let status = response.status();
        let elapsed = started.elapsed();

        let labels = [
            ("family", family.as_str().to_string()),
            ("method", method.to_string()),
            ("status", status.as_u16().to_string()),
        ];
        metrics::counter!("http_requests_total", &labels).increment(1);
        metrics::histogram!("http_request_duration_seconds", &labels)
            .record(elapsed.as_secs_f64());

        let latency_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
        if status.is_server_error() {
            tracing::warn!(status = status.as_u16(), latency_ms, "Request failed");
        } else {
            tracing::info!(status = status.as_u16(), latency_ms, "Request completed");
        }

        response
    }
    .instrument(span)
    .await
}
