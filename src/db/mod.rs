use anyhow::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::models::{
    Facility, FacilityFilter, FacilityPatch, FacilityStats, KeywordSet, KeywordStats, NewFacility,
};

pub mod migrator;
pub mod repositories;

pub use repositories::user::User;

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

fn is_memory_url(db_url: &str) -> bool {
    db_url.contains(":memory:") || db_url.contains("mode=memory")
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        // Every pooled connection to an in-memory database sees its own empty schema.
        let (max_connections, min_connections) = if is_memory_url(db_url) {
            (1, 1)
        } else {
            let path_str = db_url
                .trim_start_matches("sqlite://")
                .trim_start_matches("sqlite:");
            let path_str = path_str.split('?').next().unwrap_or(path_str);
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
            (max_connections, min_connections)
        };

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .sqlx_logging(false);

        if !is_memory_url(db_url) {
            opt.max_lifetime(Duration::from_secs(600));
        }

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn facility_repo(&self) -> repositories::facility::FacilityRepository {
        repositories::facility::FacilityRepository::new(self.conn.clone())
    }

    fn keyword_repo(&self) -> repositories::keyword::KeywordRepository {
        repositories::keyword::KeywordRepository::new(self.conn.clone())
    }

    fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    pub async fn create_facility(
        &self,
        input: &NewFacility,
        user_id: Option<i32>,
    ) -> Result<Facility> {
        self.facility_repo().create(input, user_id).await
    }

    pub async fn get_facility(&self, id: i32) -> Result<Option<Facility>> {
        self.facility_repo().get(id).await
    }

    pub async fn update_facility(
        &self,
        id: i32,
        patch: &FacilityPatch,
        user_id: Option<i32>,
    ) -> Result<Option<Facility>> {
        self.facility_repo().update(id, patch, user_id).await
    }

    pub async fn delete_facility(&self, id: i32) -> Result<bool> {
        self.facility_repo().delete(id).await
    }

    pub async fn list_facilities(&self, filter: &FacilityFilter) -> Result<(Vec<Facility>, u64)> {
        self.facility_repo().list(filter).await
    }

    pub async fn list_business_types(&self) -> Result<Vec<String>> {
        self.facility_repo().distinct_business_types().await
    }

    /// Total count plus a per-type breakdown, tallied in memory.
    pub async fn facility_stats(&self) -> Result<FacilityStats> {
        let repo = self.facility_repo();
        let total_count = repo.count().await?;
        let values = repo.business_type_values().await?;

        let mut stats = FacilityStats {
            total_count,
            ..FacilityStats::default()
        };
        for value in values {
            *stats.business_type_counts.entry(value).or_insert(0) += 1;
        }
        Ok(stats)
    }

    pub async fn get_keywords(&self, facility_id: i32) -> Result<KeywordSet> {
        self.keyword_repo().get_for_facility(facility_id).await
    }

    pub async fn replace_keywords(&self, facility_id: i32, set: &KeywordSet) -> Result<()> {
        self.keyword_repo().replace(facility_id, set).await
    }

    pub async fn delete_keywords(&self, facility_id: i32) -> Result<u64> {
        self.keyword_repo().delete_for_facility(facility_id).await
    }

    pub async fn count_keywords(&self, facility_id: i32) -> Result<u64> {
        self.keyword_repo().count_for_facility(facility_id).await
    }

    pub async fn keyword_stats(&self) -> Result<KeywordStats> {
        self.keyword_repo().stats().await
    }

    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        self.user_repo().get_by_username(username).await
    }

    pub async fn get_user_by_id(&self, id: i32) -> Result<Option<User>> {
        self.user_repo().get_by_id(id).await
    }

    pub async fn verify_user_password(&self, username: &str, password: &str) -> Result<Option<User>> {
        self.user_repo().verify_password(username, password).await
    }

    pub async fn verify_api_key(&self, api_key: &str) -> Result<Option<User>> {
        self.user_repo().verify_api_key(api_key).await
    }

    pub async fn regenerate_api_key(&self, username: &str) -> Result<String> {
        self.user_repo().regenerate_api_key(username).await
    }
}
