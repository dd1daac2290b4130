//! Outbound API clients.
//!
//! The keyword workflow only sees the [`Crawler`] and [`TextGenerator`] traits,
//! so tests can swap in canned implementations without network access.

pub mod firecrawl;
pub mod openrouter;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

pub use firecrawl::FirecrawlClient;
pub use openrouter::OpenRouterClient;

/// Failure talking to an upstream API.
///
/// Messages use the phrases the error classifier keys on, so a
/// `ClientError` classifies correctly from its `Display` output alone.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("{service}: API key is not configured")]
    MissingApiKey { service: &'static str },

    #[error("{service}: unauthorized (HTTP {status})")]
    Unauthorized { service: &'static str, status: u16 },

    #[error("{service}: rate limit exceeded (HTTP 429)")]
    RateLimited { service: &'static str },

    #[error("{service}: request timed out")]
    Timeout { service: &'static str },

    #[error("{service}: connection failed: {message}")]
    Connection {
        service: &'static str,
        message: String,
    },

    #[error("{service}: invalid response (HTTP {status}): {message}")]
    InvalidResponse {
        service: &'static str,
        status: u16,
        message: String,
    },

    #[error("{service}: request failed (HTTP {status}): {message}")]
    Status {
        service: &'static str,
        status: u16,
        message: String,
    },
}

impl ClientError {
    #[must_use]
    pub const fn service(&self) -> &'static str {
        match self {
            Self::MissingApiKey { service }
            | Self::Unauthorized { service, .. }
            | Self::RateLimited { service }
            | Self::Timeout { service }
            | Self::Connection { service, .. }
            | Self::InvalidResponse { service, .. }
            | Self::Status { service, .. } => *service,
        }
    }

    /// Maps a transport error from reqwest.
    pub(crate) fn from_reqwest(service: &'static str, err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout { service }
        } else if err.is_decode() {
            Self::InvalidResponse {
                service,
                status: err.status().map_or(0, |s| s.as_u16()),
                message: err.to_string(),
            }
        } else {
            Self::Connection {
                service,
                message: err.to_string(),
            }
        }
    }

    /// Maps a non-success HTTP status.
    pub(crate) fn from_status(service: &'static str, status: reqwest::StatusCode, body: &str) -> Self {
        let message: String = body.chars().take(300).collect();
        match status.as_u16() {
            401 | 403 => Self::Unauthorized {
                service,
                status: status.as_u16(),
            },
            429 => Self::RateLimited { service },
            code @ (502 | 503) => Self::InvalidResponse {
                service,
                status: code,
                message,
            },
            code => Self::Status {
                service,
                status: code,
                message,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrawlTarget {
    /// Google Business Profile page
    BusinessProfile(String),
    /// Official website
    Website(String),
}

impl CrawlTarget {
    #[must_use]
    pub fn url(&self) -> &str {
        match self {
            Self::BusinessProfile(url) | Self::Website(url) => url,
        }
    }
}

impl fmt::Display for CrawlTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BusinessProfile(url) => write!(f, "business profile {url}"),
            Self::Website(url) => write!(f, "website {url}"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlResult {
    pub title: String,
    pub description: String,
    pub content: String,
}

#[async_trait]
pub trait Crawler: Send + Sync {
    async fn crawl(&self, target: &CrawlTarget) -> Result<CrawlResult, ClientError>;
}

#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Returns the raw model output for a system/user prompt pair.
    async fn generate_text(&self, system: &str, prompt: &str) -> Result<String, ClientError>;
}

/// Build a shared HTTP client with reasonable defaults for API calls.
/// Reused across clients so connections are pooled.
pub fn build_shared_http_client(timeout: Duration) -> anyhow::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("keyword-suggest/", env!("CARGO_PKG_VERSION")))
        .pool_max_idle_per_host(10)
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to build shared HTTP client: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::error_classifier::{ErrorCategory, classify};

    #[test]
    fn test_client_errors_classify() {
        let cases = [
            (
                ClientError::MissingApiKey { service: "OpenRouter" },
                ErrorCategory::Credentials,
            ),
            (
                ClientError::Unauthorized {
                    service: "Firecrawl",
                    status: 401,
                },
                ErrorCategory::Credentials,
            ),
            (
                ClientError::RateLimited { service: "OpenRouter" },
                ErrorCategory::RateLimit,
            ),
            (
                ClientError::Timeout { service: "Firecrawl" },
                ErrorCategory::Timeout,
            ),
            (
                ClientError::Connection {
                    service: "Firecrawl",
                    message: "dns error".into(),
                },
                ErrorCategory::Connection,
            ),
            (
                ClientError::InvalidResponse {
                    service: "OpenRouter",
                    status: 200,
                    message: "missing choices".into(),
                },
                ErrorCategory::MalformedResponse,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(classify(&err).category, expected, "{err}");
        }
    }

    #[test]
    fn test_from_status() {
        let err = ClientError::from_status("X", reqwest::StatusCode::TOO_MANY_REQUESTS, "");
        assert!(matches!(err, ClientError::RateLimited { .. }));

        let err = ClientError::from_status("X", reqwest::StatusCode::BAD_GATEWAY, "upstream");
        assert!(classify(&err).retryable);

        let err = ClientError::from_status("X", reqwest::StatusCode::BAD_REQUEST, "nope");
        assert_eq!(classify(&err).category, ErrorCategory::Unknown);
    }
}
