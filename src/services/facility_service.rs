//! Domain service for facility records.

use thiserror::Error;

use crate::domain::FacilityId;
use crate::models::{Facility, FacilityFilter, FacilityPatch, FacilityStats, NewFacility};

#[derive(Debug, Error)]
pub enum FacilityError {
    #[error("Facility not found: {0}")]
    NotFound(FacilityId),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),
}

/// One page of facilities plus the unpaginated match count.
#[derive(Debug, Clone)]
pub struct FacilityPage {
    pub items: Vec<Facility>,
    pub total: u64,
    pub limit: u64,
    pub offset: u64,
}

#[async_trait::async_trait]
pub trait FacilityService: Send + Sync {
    /// Validates and inserts a facility, recording `user_id` as creator.
    ///
    /// # Errors
    ///
    /// Returns [`FacilityError::Validation`] without writing anything if a
    /// field is missing, too long or malformed.
    async fn create(
        &self,
        input: NewFacility,
        user_id: Option<i32>,
    ) -> Result<Facility, FacilityError>;

    async fn get(&self, id: FacilityId) -> Result<Facility, FacilityError>;

    /// Overwrites only the supplied fields.
    async fn update(
        &self,
        id: FacilityId,
        patch: FacilityPatch,
        user_id: Option<i32>,
    ) -> Result<Facility, FacilityError>;

    /// Deletes the facility and all of its keywords.
    async fn delete(&self, id: FacilityId) -> Result<(), FacilityError>;

    async fn list(&self, filter: FacilityFilter) -> Result<FacilityPage, FacilityError>;

    async fn business_types(&self) -> Result<Vec<String>, FacilityError>;

    async fn stats(&self) -> Result<FacilityStats, FacilityError>;
}
