//! Keyword generation workflow: crawl, prompt, generate, parse, fall back.

use std::sync::Arc;

use tracing::{info, warn};

use crate::clients::{ClientError, CrawlResult, CrawlTarget, Crawler, TextGenerator};
use crate::config::KeywordsConfig;
use crate::constants::limits;
use crate::models::{Facility, KeywordSet};
use crate::services::error_classifier::classify;
use crate::services::fallback::fallback_keywords;
use crate::services::keyword_parse::{ParseError, parse_keyword_response};
use crate::services::prompt::{CrawlContext, SYSTEM_PROMPT, build_keyword_prompt};

#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error(transparent)]
    Generation(#[from] ClientError),

    #[error("Failed to parse generated keywords: {0}")]
    Parse(#[from] ParseError),
}

impl GenerationError {
    /// Upstream service name for error reporting.
    #[must_use]
    pub const fn service(&self) -> &'static str {
        match self {
            Self::Generation(err) => err.service(),
            Self::Parse(_) => "OpenRouter",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerationSettings {
    pub min_per_category: usize,
    pub max_per_category: usize,
    pub max_keyword_length: usize,
    pub max_crawl_chars: usize,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self::from(&KeywordsConfig::default())
    }
}

impl From<&KeywordsConfig> for GenerationSettings {
    fn from(config: &KeywordsConfig) -> Self {
        Self {
            min_per_category: config.min_per_category,
            max_per_category: config.max_per_category,
            max_keyword_length: config.max_keyword_length,
            max_crawl_chars: limits::MAX_CRAWL_TEXT_CHARS,
        }
    }
}

#[derive(Clone)]
pub struct KeywordGenerator {
    crawler: Arc<dyn Crawler>,
    generator: Arc<dyn TextGenerator>,
    settings: GenerationSettings,
}

impl KeywordGenerator {
    #[must_use]
    pub fn new(
        crawler: Arc<dyn Crawler>,
        generator: Arc<dyn TextGenerator>,
        settings: GenerationSettings,
    ) -> Self {
        Self {
            crawler,
            generator,
            settings,
        }
    }

    async fn crawl_optional(&self, target: Option<CrawlTarget>) -> Option<CrawlResult> {
        let target = target?;
        info!(%target, "Crawling for keyword enrichment");

        match self.crawler.crawl(&target).await {
            Ok(result) => Some(result),
            Err(e) => {
                let class = classify(&e);
                warn!(
                    %target,
                    error = %e,
                    category = class.category.as_str(),
                    "Crawl failed, continuing without it"
                );
                None
            }
        }
    }

    async fn crawl_context(&self, facility: &Facility) -> CrawlContext {
        let gbp = present(facility.gbp_url.as_deref()).map(CrawlTarget::BusinessProfile);
        let site = present(facility.official_site_url.as_deref()).map(CrawlTarget::Website);

        CrawlContext {
            business_profile: self.crawl_optional(gbp).await,
            website: self.crawl_optional(site).await,
        }
    }

    /// Runs the workflow without a fallback. Crawl failures never surface;
    /// generation and parse failures do.
    pub async fn try_generate(&self, facility: &Facility) -> Result<KeywordSet, GenerationError> {
        let crawl = self.crawl_context(facility).await;

        let prompt = build_keyword_prompt(
            facility,
            &crawl,
            (
                self.settings.min_per_category,
                self.settings.max_per_category,
            ),
            self.settings.max_crawl_chars,
        );

        let raw = self.generator.generate_text(SYSTEM_PROMPT, &prompt).await?;
        let keywords = parse_keyword_response(&raw, self.settings.max_keyword_length)?;

        info!(
            facility_id = %facility.id,
            count = keywords.len(),
            "Generated keywords"
        );
        Ok(keywords)
    }

    /// Runs the workflow and substitutes the static table on any failure.
    pub async fn generate(&self, facility: &Facility) -> KeywordSet {
        match self.try_generate(facility).await {
            Ok(keywords) => {
                record_outcome("ai");
                keywords
            }
            Err(e) => {
                let class = classify(&e);
                warn!(
                    facility_id = %facility.id,
                    error = %e,
                    category = class.category.as_str(),
                    "Keyword generation failed, using fallback keywords"
                );
                self.fallback(facility)
            }
        }
    }

    #[must_use]
    pub fn fallback(&self, facility: &Facility) -> KeywordSet {
        record_outcome("fallback");
        fallback_keywords(facility)
    }
}

fn present(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn record_outcome(outcome: &'static str) {
    metrics::counter!("keyword_generation_total", "outcome" => outcome).increment(1);
}
