//! `SeaORM` implementation of the `FacilityService` trait.

use async_trait::async_trait;
use tracing::{error, info};

use crate::db::Store;
use crate::domain::FacilityId;
use crate::models::{Facility, FacilityFilter, FacilityPatch, FacilityStats, NewFacility};
use crate::services::facility_service::{FacilityError, FacilityPage, FacilityService};

pub struct SeaOrmFacilityService {
    store: Store,
}

impl SeaOrmFacilityService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }
}

fn db_error(context: &str, err: &anyhow::Error) -> FacilityError {
    error!(error = %err, "{context}");
    FacilityError::Database(format!("{err:#}"))
}

#[async_trait]
impl FacilityService for SeaOrmFacilityService {
    async fn create(
        &self,
        input: NewFacility,
        user_id: Option<i32>,
    ) -> Result<Facility, FacilityError> {
        input
            .validate()
            .map_err(|e| FacilityError::Validation(e.to_string()))?;

        let facility = self
            .store
            .create_facility(&input, user_id)
            .await
            .map_err(|e| db_error("Failed to create facility", &e))?;

        info!(facility_id = %facility.id, name = %facility.facility_name, "Facility created");
        Ok(facility)
    }

    async fn get(&self, id: FacilityId) -> Result<Facility, FacilityError> {
        self.store
            .get_facility(id.value())
            .await
            .map_err(|e| db_error("Failed to fetch facility", &e))?
            .ok_or(FacilityError::NotFound(id))
    }

    async fn update(
        &self,
        id: FacilityId,
        patch: FacilityPatch,
        user_id: Option<i32>,
    ) -> Result<Facility, FacilityError> {
        patch
            .validate()
            .map_err(|e| FacilityError::Validation(e.to_string()))?;

        let facility = self
            .store
            .update_facility(id.value(), &patch, user_id)
            .await
            .map_err(|e| db_error("Failed to update facility", &e))?
            .ok_or(FacilityError::NotFound(id))?;

        info!(facility_id = %id, "Facility updated");
        Ok(facility)
    }

    async fn delete(&self, id: FacilityId) -> Result<(), FacilityError> {
        let deleted = self
            .store
            .delete_facility(id.value())
            .await
            .map_err(|e| db_error("Failed to delete facility", &e))?;

        if !deleted {
            return Err(FacilityError::NotFound(id));
        }

        info!(facility_id = %id, "Facility deleted");
        Ok(())
    }

    async fn list(&self, filter: FacilityFilter) -> Result<FacilityPage, FacilityError> {
        let (items, total) = self
            .store
            .list_facilities(&filter)
            .await
            .map_err(|e| db_error("Failed to list facilities", &e))?;

        Ok(FacilityPage {
            items,
            total,
            limit: filter.limit,
            offset: filter.offset,
        })
    }

    async fn business_types(&self) -> Result<Vec<String>, FacilityError> {
        self.store
            .list_business_types()
            .await
            .map_err(|e| db_error("Failed to list business types", &e))
    }

    async fn stats(&self) -> Result<FacilityStats, FacilityError> {
        self.store
            .facility_stats()
            .await
            .map_err(|e| db_error("Failed to compute facility stats", &e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn service() -> SeaOrmFacilityService {
        let store = Store::new("sqlite::memory:").await.unwrap();
        SeaOrmFacilityService::new(store)
    }

    #[tokio::test]
    async fn test_create_without_name_persists_nothing() {
        let service = service().await;

        let err = service
            .create(
                NewFacility {
                    facility_name: "   ".into(),
                    business_type: Some("restaurant".into()),
                    ..Default::default()
                },
                Some(1),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, FacilityError::Validation(_)));
        let page = service
            .list(FacilityFilter {
                limit: 100,
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(page.total, 0);
    }

    #[tokio::test]
    async fn test_missing_ids_are_not_found() {
        let service = service().await;
        let id = FacilityId::new(999);

        assert!(matches!(service.get(id).await, Err(FacilityError::NotFound(_))));
        assert!(matches!(service.delete(id).await, Err(FacilityError::NotFound(_))));
        assert!(matches!(
            service
                .update(
                    id,
                    FacilityPatch {
                        address: Some("大阪府".into()),
                        ..Default::default()
                    },
                    None
                )
                .await,
            Err(FacilityError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_update_rejects_bad_url() {
        let service = service().await;
        let created = service
            .create(
                NewFacility {
                    facility_name: "Cafe Mori".into(),
                    ..Default::default()
                },
                Some(1),
            )
            .await
            .unwrap();

        let err = service
            .update(
                created.id,
                FacilityPatch {
                    official_site_url: Some("not a url".into()),
                    ..Default::default()
                },
                Some(1),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, FacilityError::Validation(msg) if msg.contains("official_site_url")));
    }
}
