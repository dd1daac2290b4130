//! Domain service for per-facility keyword sets.

use thiserror::Error;

use crate::domain::FacilityId;
use crate::models::{KeywordSet, KeywordStats};

#[derive(Debug, Error)]
pub enum KeywordError {
    #[error("Facility not found: {0}")]
    FacilityNotFound(FacilityId),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("{service} error: {message}")]
    Generation {
        service: &'static str,
        message: String,
    },
}

#[async_trait::async_trait]
pub trait KeywordService: Send + Sync {
    /// Returns the stored set; all three categories are present even when empty.
    async fn get(&self, facility_id: FacilityId) -> Result<KeywordSet, KeywordError>;

    /// Replaces the whole set after trimming and length checks.
    ///
    /// # Errors
    ///
    /// Returns [`KeywordError::Validation`] if any entry is over the length bound.
    async fn update(
        &self,
        facility_id: FacilityId,
        keywords: KeywordSet,
    ) -> Result<KeywordSet, KeywordError>;

    /// Runs the generation workflow and persists its result.
    async fn generate(&self, facility_id: FacilityId) -> Result<KeywordSet, KeywordError>;

    /// Removes every keyword of the facility and returns how many were deleted.
    async fn delete(&self, facility_id: FacilityId) -> Result<u64, KeywordError>;

    async fn stats(&self) -> Result<KeywordStats, KeywordError>;
}
