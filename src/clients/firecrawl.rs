use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{ClientError, CrawlResult, CrawlTarget, Crawler};
use crate::config::CrawlerConfig;

const SERVICE: &str = "Firecrawl";

#[derive(Debug, Serialize)]
struct CrawlRequest<'a> {
    url: &'a str,
    selector: &'static str,
    extract_metadata: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    wait_for: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    follow_links: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_pages: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    same_domain: Option<bool>,
}

impl<'a> CrawlRequest<'a> {
    fn for_target(target: &'a CrawlTarget) -> Self {
        match target {
            CrawlTarget::BusinessProfile(url) => Self {
                url: url.as_str(),
                selector: "body",
                extract_metadata: true,
                wait_for: Some(".gm2-subtitle-alt-1"),
                follow_links: None,
                max_pages: None,
                same_domain: None,
            },
            CrawlTarget::Website(url) => Self {
                url: url.as_str(),
                selector: "body",
                extract_metadata: true,
                wait_for: None,
                follow_links: Some(true),
                max_pages: Some(5),
                same_domain: Some(true),
            },
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct CrawlResponse {
    #[serde(default)]
    metadata: Option<CrawlMetadata>,
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct CrawlMetadata {
    title: Option<String>,
    description: Option<String>,
}

impl From<CrawlResponse> for CrawlResult {
    fn from(response: CrawlResponse) -> Self {
        let metadata = response.metadata.unwrap_or_default();
        Self {
            title: metadata.title.unwrap_or_default(),
            description: metadata.description.unwrap_or_default(),
            content: response.content.unwrap_or_default(),
        }
    }
}

/// Client for the Firecrawl page-crawling API.
#[derive(Clone)]
pub struct FirecrawlClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
    timeout: Duration,
}

impl FirecrawlClient {
    #[must_use]
    pub fn with_shared_client(client: Client, config: &CrawlerConfig) -> Self {
        Self {
            client,
            api_key: config.api_key.clone().filter(|k| !k.trim().is_empty()),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(config.timeout_seconds),
        }
    }

    #[must_use]
    pub const fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}

#[async_trait]
impl Crawler for FirecrawlClient {
    async fn crawl(&self, target: &CrawlTarget) -> Result<CrawlResult, ClientError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(ClientError::MissingApiKey { service: SERVICE })?;

        let response = self
            .client
            .post(format!("{}/crawl", self.base_url))
            .bearer_auth(api_key)
            .timeout(self.timeout)
            .json(&CrawlRequest::for_target(target))
            .send()
            .await
            .map_err(|e| ClientError::from_reqwest(SERVICE, &e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::from_status(SERVICE, status, &body));
        }

        let body: CrawlResponse = response
            .json()
            .await
            .map_err(|e| ClientError::from_reqwest(SERVICE, &e))?;

        info!("Crawled {target}");
        Ok(CrawlResult::from(body))
    }
}
