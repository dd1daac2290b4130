use std::sync::Arc;
use std::time::Duration;

use crate::clients::{Crawler, FirecrawlClient, OpenRouterClient, TextGenerator, build_shared_http_client};
use crate::config::Config;
use crate::db::Store;
use crate::services::{
    AuthService, ExportService, FacilityService, GenerationSettings, KeywordGenerator,
    KeywordService, SeaOrmAuthService, SeaOrmFacilityService, SeaOrmKeywordService,
};

/// Services and configuration shared by every request and CLI command.
///
/// Configuration is read-only after startup.
#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<Config>,

    pub store: Store,

    pub generator: KeywordGenerator,

    pub facility_service: Arc<dyn FacilityService>,

    pub keyword_service: Arc<dyn KeywordService>,

    pub auth_service: Arc<dyn AuthService>,

    pub export_service: Arc<ExportService>,
}

impl SharedState {
    /// Connects to the database and wires the real HTTP clients.
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let timeout = config.ai.timeout_seconds.max(config.crawler.timeout_seconds);
        let http_client = build_shared_http_client(Duration::from_secs(timeout))?;

        let crawler = FirecrawlClient::with_shared_client(http_client.clone(), &config.crawler);
        let text = OpenRouterClient::with_shared_client(http_client, &config.ai);

        if !text.is_configured() {
            tracing::warn!("OpenRouter API key not configured, generation will use fallback keywords");
        }
        if !crawler.is_configured() {
            tracing::warn!("Firecrawl API key not configured, crawling is disabled");
        }

        Self::with_clients(config, Arc::new(crawler), Arc::new(text)).await
    }

    /// Same as [`SharedState::new`] with caller-supplied upstream clients.
    pub async fn with_clients(
        config: Config,
        crawler: Arc<dyn Crawler>,
        text: Arc<dyn TextGenerator>,
    ) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_url,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        let generator = KeywordGenerator::new(
            crawler,
            text,
            GenerationSettings::from(&config.keywords),
        );

        let facility_service =
            Arc::new(SeaOrmFacilityService::new(store.clone())) as Arc<dyn FacilityService>;

        let keyword_service = Arc::new(SeaOrmKeywordService::new(
            store.clone(),
            generator.clone(),
            &config.keywords,
        )) as Arc<dyn KeywordService>;

        let auth_service = Arc::new(SeaOrmAuthService::new(store.clone())) as Arc<dyn AuthService>;

        let export_service = Arc::new(ExportService::new(
            facility_service.clone(),
            keyword_service.clone(),
        ));

        Ok(Self {
            config: Arc::new(config),
            store,
            generator,
            facility_service,
            keyword_service,
            auth_service,
            export_service,
        })
    }
}
