//! `SeaORM` implementation of the `KeywordService` trait.

use async_trait::async_trait;
use tracing::{error, info, warn};

use crate::config::KeywordsConfig;
use crate::db::Store;
use crate::domain::FacilityId;
use crate::models::{Facility, KeywordSet, KeywordStats};
use crate::services::error_classifier::{RetryPolicy, with_retry};
use crate::services::keyword_generator::KeywordGenerator;
use crate::services::keyword_service::{KeywordError, KeywordService};

pub struct SeaOrmKeywordService {
    store: Store,
    generator: KeywordGenerator,
    max_keyword_length: usize,
    fallback_on_error: bool,
    retry: RetryPolicy,
}

impl SeaOrmKeywordService {
    #[must_use]
    pub fn new(store: Store, generator: KeywordGenerator, config: &KeywordsConfig) -> Self {
        Self {
            store,
            generator,
            max_keyword_length: config.max_keyword_length,
            fallback_on_error: config.fallback_on_error,
            retry: config.retry.policy(),
        }
    }

    async fn facility(&self, id: FacilityId) -> Result<Facility, KeywordError> {
        self.store
            .get_facility(id.value())
            .await
            .map_err(|e| db_error("Failed to fetch facility", &e))?
            .ok_or(KeywordError::FacilityNotFound(id))
    }

    async fn run_workflow(&self, facility: &Facility) -> Result<KeywordSet, KeywordError> {
        if self.fallback_on_error {
            return Ok(self.generator.generate(facility).await);
        }

        with_retry(&self.retry, || self.generator.try_generate(facility))
            .await
            .map_err(|e| {
                warn!(facility_id = %facility.id, error = %e, "Keyword generation failed");
                KeywordError::Generation {
                    service: e.service(),
                    message: e.to_string(),
                }
            })
    }
}

fn db_error(context: &str, err: &anyhow::Error) -> KeywordError {
    error!(error = %err, "{context}");
    KeywordError::Database(format!("{err:#}"))
}

#[async_trait]
impl KeywordService for SeaOrmKeywordService {
    async fn get(&self, facility_id: FacilityId) -> Result<KeywordSet, KeywordError> {
        self.facility(facility_id).await?;

        self.store
            .get_keywords(facility_id.value())
            .await
            .map_err(|e| db_error("Failed to fetch keywords", &e))
    }

    async fn update(
        &self,
        facility_id: FacilityId,
        keywords: KeywordSet,
    ) -> Result<KeywordSet, KeywordError> {
        let keywords = keywords
            .sanitized(self.max_keyword_length)
            .map_err(|e| KeywordError::Validation(e.to_string()))?;

        self.facility(facility_id).await?;

        self.store
            .replace_keywords(facility_id.value(), &keywords)
            .await
            .map_err(|e| db_error("Failed to save keywords", &e))?;

        info!(facility_id = %facility_id, count = keywords.len(), "Keywords updated");
        Ok(keywords)
    }

    async fn generate(&self, facility_id: FacilityId) -> Result<KeywordSet, KeywordError> {
        let facility = self.facility(facility_id).await?;
        let keywords = self.run_workflow(&facility).await?;

        self.store
            .replace_keywords(facility_id.value(), &keywords)
            .await
            .map_err(|e| db_error("Failed to save generated keywords", &e))?;

        info!(facility_id = %facility_id, count = keywords.len(), "Generated keywords saved");
        Ok(keywords)
    }

    async fn delete(&self, facility_id: FacilityId) -> Result<u64, KeywordError> {
        self.facility(facility_id).await?;

        let removed = self
            .store
            .delete_keywords(facility_id.value())
            .await
            .map_err(|e| db_error("Failed to delete keywords", &e))?;

        info!(facility_id = %facility_id, removed, "Keywords deleted");
        Ok(removed)
    }

    async fn stats(&self) -> Result<KeywordStats, KeywordError> {
        self.store
            .keyword_stats()
            .await
            .map_err(|e| db_error("Failed to compute keyword stats", &e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::{ClientError, CrawlResult, CrawlTarget, Crawler, TextGenerator};
    use crate::models::NewFacility;
    use crate::services::keyword_generator::GenerationSettings;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct NoCrawl;

    #[async_trait]
    impl Crawler for NoCrawl {
        async fn crawl(&self, _target: &CrawlTarget) -> Result<CrawlResult, ClientError> {
            Ok(CrawlResult::default())
        }
    }

    struct RateLimitedGenerator {
        calls: AtomicU32,
    }

    #[async_trait]
    impl TextGenerator for RateLimitedGenerator {
        async fn generate_text(&self, _system: &str, _prompt: &str) -> Result<String, ClientError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(ClientError::RateLimited {
                service: "OpenRouter",
            })
        }
    }

    async fn setup(fallback_on_error: bool) -> (SeaOrmKeywordService, Arc<RateLimitedGenerator>, FacilityId) {
        let store = Store::new("sqlite::memory:").await.unwrap();
        let facility = store
            .create_facility(
                &NewFacility {
                    facility_name: "Sample Diner".into(),
                    business_type: Some("restaurant".into()),
                    ..Default::default()
                },
                Some(1),
            )
            .await
            .unwrap();

        let text = Arc::new(RateLimitedGenerator {
            calls: AtomicU32::new(0),
        });
        let generator =
            KeywordGenerator::new(Arc::new(NoCrawl), text.clone(), GenerationSettings::default());

        let mut config = KeywordsConfig {
            fallback_on_error,
            ..Default::default()
        };
        config.retry.initial_delay_ms = 1;
        config.retry.max_delay_ms = 2;

        (
            SeaOrmKeywordService::new(store, generator, &config),
            text,
            facility.id,
        )
    }

    #[tokio::test]
    async fn test_update_rejects_overlong_keyword() {
        let (service, _, id) = setup(true).await;
        let err = service
            .update(
                id,
                KeywordSet {
                    menu_service: vec!["x".repeat(150)],
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, KeywordError::Validation(_)));
        assert!(service.get(id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_generate_falls_back_and_persists() {
        let (service, text, id) = setup(true).await;

        let generated = service.generate(id).await.unwrap();
        assert_eq!(text.calls.load(Ordering::SeqCst), 1);
        assert!(generated.iter().any(|(_, k)| k.contains("Sample Diner")));
        assert_eq!(service.get(id).await.unwrap(), generated);
    }

    #[tokio::test]
    async fn test_generate_without_fallback_retries_then_fails() {
        let (service, text, id) = setup(false).await;

        let err = service.generate(id).await.unwrap_err();
        assert!(matches!(err, KeywordError::Generation { service: "OpenRouter", .. }));
        assert_eq!(text.calls.load(Ordering::SeqCst), 3);
        assert!(service.get(id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_facility() {
        let (service, _, _) = setup(true).await;
        let missing = FacilityId::new(404);

        assert!(matches!(
            service.get(missing).await,
            Err(KeywordError::FacilityNotFound(_))
        ));
        assert!(matches!(
            service.generate(missing).await,
            Err(KeywordError::FacilityNotFound(_))
        ));
        assert!(matches!(
            service.delete(missing).await,
            Err(KeywordError::FacilityNotFound(_))
        ));
    }
}
