//! Coarse classification of upstream failures and a capped exponential retry.
//!
//! Errors from the crawl and text-generation APIs arrive with free-form
//! messages. [`classify`] maps a message onto an [`ErrorCategory`] by ordered,
//! case-insensitive substring matching; the first category whose phrase list
//! matches wins. [`with_retry`] uses that classification to decide whether a
//! failed call is worth repeating.

use serde::Serialize;
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    Credentials,
    Connection,
    RateLimit,
    MalformedResponse,
    Parse,
    Timeout,
    Unknown,
}

impl ErrorCategory {
    #[must_use]
    pub const fn is_retryable(self) -> bool {
        matches!(
            self,
            Self::Connection | Self::RateLimit | Self::MalformedResponse | Self::Timeout
        )
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Credentials => "credentials",
            Self::Connection => "connection",
            Self::RateLimit => "rate_limit",
            Self::MalformedResponse => "malformed_response",
            Self::Parse => "parse",
            Self::Timeout => "timeout",
            Self::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ErrorClass {
    pub category: ErrorCategory,
    pub retryable: bool,
}

/// Checked in order; overlapping phrases resolve to the earlier category.
const RULES: &[(ErrorCategory, &[&str])] = &[
    (
        ErrorCategory::Credentials,
        &[
            "api key",
            "apikey",
            "api_key",
            "unauthorized",
            "authentication",
            "401",
            "forbidden",
            "403",
            "apiキー",
            "認証",
        ],
    ),
    (
        ErrorCategory::Connection,
        &[
            "connection",
            "network",
            "econnrefused",
            "enotfound",
            "dns",
            "socket",
            "接続",
        ],
    ),
    (
        ErrorCategory::RateLimit,
        &["rate limit", "too many requests", "429", "quota", "レート制限"],
    ),
    (
        ErrorCategory::MalformedResponse,
        &[
            "invalid response",
            "malformed",
            "unexpected response",
            "502",
            "503",
            "bad gateway",
            "service unavailable",
            "形式が不正",
        ],
    ),
    (
        ErrorCategory::Parse,
        &["json", "parse", "syntax", "解析"],
    ),
    (
        ErrorCategory::Timeout,
        &["timeout", "timed out", "deadline", "タイムアウト"],
    ),
];

/// Classifies an error by its message text.
pub fn classify(error: &impl Display) -> ErrorClass {
    classify_message(&error.to_string())
}

#[must_use]
pub fn classify_message(message: &str) -> ErrorClass {
    let lowered = message.to_lowercase();

    let category = RULES
        .iter()
        .find(|(_, phrases)| phrases.iter().any(|p| lowered.contains(p)))
        .map_or(ErrorCategory::Unknown, |(category, _)| *category);

    ErrorClass {
        category,
        retryable: category.is_retryable(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub backoff_factor: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(10),
            backoff_factor: 2.0,
        }
    }
}

impl RetryPolicy {
    /// Delay before the retry that follows failed attempt `attempt` (1-based):
    /// `min(initial_delay * backoff_factor^(attempt-1), max_delay)`.
    #[must_use]
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = i32::try_from(attempt.saturating_sub(1)).unwrap_or(i32::MAX);
        let scaled = self.initial_delay.as_secs_f64() * self.backoff_factor.powi(exponent);

        if !scaled.is_finite() || scaled >= self.max_delay.as_secs_f64() {
            self.max_delay
        } else {
            Duration::from_secs_f64(scaled.max(0.0))
        }
    }
}

/// Runs `operation` until it succeeds, fails with a non-retryable error, or
/// `max_attempts` is exhausted. The last error is returned unchanged.
pub async fn with_retry<T, E, F, Fut>(policy: &RetryPolicy, mut operation: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                let class = classify(&err);

                if !class.retryable || attempt >= max_attempts {
                    debug!(
                        attempt,
                        category = class.category.as_str(),
                        "Giving up: {err}"
                    );
                    return Err(err);
                }

                let delay = policy.delay_for(attempt);
                warn!(
                    attempt,
                    max_attempts,
                    category = class.category.as_str(),
                    delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                    "Retryable failure: {err}"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn test_classify_examples() {
        let rate = classify_message("OpenRouter: rate limit exceeded");
        assert_eq!(rate.category, ErrorCategory::RateLimit);
        assert!(rate.retryable);

        let key = classify_message("Invalid API key provided");
        assert_eq!(key.category, ErrorCategory::Credentials);
        assert!(!key.retryable);

        let unknown = classify_message("something odd happened");
        assert_eq!(unknown.category, ErrorCategory::Unknown);
        assert!(!unknown.retryable);
    }

    #[test]
    fn test_classify_order_and_case() {
        // Credentials are checked before timeouts.
        assert_eq!(
            classify_message("UNAUTHORIZED after timeout").category,
            ErrorCategory::Credentials
        );
        // Connection is checked before parse ("json" appears too).
        assert_eq!(
            classify_message("network error while fetching json").category,
            ErrorCategory::Connection
        );
        assert_eq!(
            classify_message("Request Timed Out").category,
            ErrorCategory::Timeout
        );
        assert_eq!(
            classify_message("HTTP 503 Service Unavailable").category,
            ErrorCategory::MalformedResponse
        );
        assert_eq!(
            classify_message("JSONの解析に失敗しました").category,
            ErrorCategory::Parse
        );
        assert!(!classify_message("expected value at line 1 column 1 (parse)").retryable);
        assert_eq!(
            classify_message("APIキーが設定されていません").category,
            ErrorCategory::Credentials
        );
    }

    #[test]
    fn test_delay_is_capped_exponential() {
        let policy = RetryPolicy {
            max_attempts: 5,
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_millis(500),
            backoff_factor: 2.0,
        };
        assert_eq!(policy.delay_for(1), Duration::from_millis(100));
        assert_eq!(policy.delay_for(2), Duration::from_millis(200));
        assert_eq!(policy.delay_for(3), Duration::from_millis(400));
        assert_eq!(policy.delay_for(4), Duration::from_millis(500));
        assert_eq!(policy.delay_for(60), Duration::from_millis(500));
    }

    fn counting_op(
        calls: &Arc<AtomicU32>,
        fail_times: u32,
        message: &'static str,
    ) -> impl FnMut() -> std::future::Ready<Result<u32, String>> {
        let calls = calls.clone();
        move || {
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            std::future::ready(if n <= fail_times {
                Err(message.to_string())
            } else {
                Ok(n)
            })
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_until_success() {
        let calls = Arc::new(AtomicU32::new(0));
        let started = tokio::time::Instant::now();

        let result = with_retry(
            &RetryPolicy::default(),
            counting_op(&calls, 2, "connection reset"),
        )
        .await;

        assert_eq!(result, Ok(3));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        // 1s after the first failure, 2s after the second.
        assert_eq!(started.elapsed(), Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_stops_on_non_retryable() {
        let calls = Arc::new(AtomicU32::new(0));
        let result = with_retry(
            &RetryPolicy::default(),
            counting_op(&calls, 10, "invalid api key"),
        )
        .await;

        assert_eq!(result, Err("invalid api key".to_string()));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_exhausts_attempts() {
        let calls = Arc::new(AtomicU32::new(0));
        let policy = RetryPolicy {
            max_attempts: 4,
            ..RetryPolicy::default()
        };
        let result = with_retry(&policy, counting_op(&calls, 10, "429 too many requests")).await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }
}
