use crate::entities::{facilities, keywords, prelude::*};
use crate::models::facility::{normalize_optional, search_key};
use crate::models::{Facility, FacilityFilter, FacilityPatch, NewFacility};
use anyhow::{Context, Result};
use sea_orm::sea_query::LikeExpr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tracing::info;

pub struct FacilityRepository {
    conn: DatabaseConnection,
}

impl FacilityRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn create(&self, input: &NewFacility, user_id: Option<i32>) -> Result<Facility> {
        let now = chrono::Utc::now().to_rfc3339();
        let name = input.facility_name.trim().to_string();
        let address = normalize_optional(input.address.as_deref());

        let active_model = facilities::ActiveModel {
            search_key: Set(search_key(&name, address.as_deref())),
            facility_name: Set(name),
            business_type: Set(normalize_optional(input.business_type.as_deref())),
            address: Set(address),
            phone: Set(normalize_optional(input.phone.as_deref())),
            business_hours: Set(normalize_optional(input.business_hours.as_deref())),
            closed_days: Set(normalize_optional(input.closed_days.as_deref())),
            official_site_url: Set(normalize_optional(input.official_site_url.as_deref())),
            gbp_url: Set(normalize_optional(input.gbp_url.as_deref())),
            additional_info: Set(normalize_optional(input.additional_info.as_deref())),
            created_by: Set(user_id),
            updated_by: Set(user_id),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        let model = active_model
            .insert(&self.conn)
            .await
            .context("Failed to insert facility")?;

        info!(facility_id = model.id, "Created facility: {}", model.facility_name);
        Ok(Facility::from(model))
    }

    pub async fn get(&self, id: i32) -> Result<Option<Facility>> {
        let model = Facilities::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query facility by ID")?;

        Ok(model.map(Facility::from))
    }

    /// Applies the supplied fields. Returns `None` when the facility does not exist.
    pub async fn update(
        &self,
        id: i32,
        patch: &FacilityPatch,
        user_id: Option<i32>,
    ) -> Result<Option<Facility>> {
        let Some(model) = Facilities::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query facility for update")?
        else {
            return Ok(None);
        };

        let name = patch
            .facility_name
            .as_deref()
            .map_or_else(|| model.facility_name.clone(), |n| n.trim().to_string());
        let address = match &patch.address {
            Some(address) => normalize_optional(Some(address.as_str())),
            None => model.address.clone(),
        };

        let mut active: facilities::ActiveModel = model.into();
        active.search_key = Set(search_key(&name, address.as_deref()));

        if let Some(name) = &patch.facility_name {
            active.facility_name = Set(name.trim().to_string());
        }

        let optional = [
            (&patch.business_type, &mut active.business_type),
            (&patch.address, &mut active.address),
            (&patch.phone, &mut active.phone),
            (&patch.business_hours, &mut active.business_hours),
            (&patch.closed_days, &mut active.closed_days),
            (&patch.official_site_url, &mut active.official_site_url),
            (&patch.gbp_url, &mut active.gbp_url),
            (&patch.additional_info, &mut active.additional_info),
        ];

        for (supplied, column) in optional {
            if let Some(value) = supplied {
                *column = Set(normalize_optional(Some(value)));
            }
        }

        active.updated_by = Set(user_id);
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());

        let model = active
            .update(&self.conn)
            .await
            .context("Failed to update facility")?;

        info!(facility_id = id, "Updated facility");
        Ok(Some(Facility::from(model)))
    }

    /// Deletes a facility and its keywords in one transaction.
    pub async fn delete(&self, id: i32) -> Result<bool> {
        let txn = self.conn.begin().await?;

        let removed_keywords = Keywords::delete_many()
            .filter(keywords::Column::FacilityId.eq(id))
            .exec(&txn)
            .await
            .context("Failed to delete facility keywords")?;

        let result = Facilities::delete_by_id(id)
            .exec(&txn)
            .await
            .context("Failed to delete facility")?;

        txn.commit().await?;

        let removed = result.rows_affected > 0;
        if removed {
            info!(
                facility_id = id,
                keywords = removed_keywords.rows_affected,
                "Deleted facility"
            );
        }
        Ok(removed)
    }

    /// Returns one page of facilities plus the number of rows matching the filter.
    pub async fn list(&self, filter: &FacilityFilter) -> Result<(Vec<Facility>, u64)> {
        let mut query = Facilities::find();

        if let Some(business_type) = filter.business_type.as_deref().map(str::trim) {
            if !business_type.is_empty() {
                query = query.filter(facilities::Column::BusinessType.eq(business_type));
            }
        }

        if let Some(search) = filter.search.as_deref().map(str::trim) {
            if !search.is_empty() {
                // Folded in Rust on both sides; SQLite's LOWER() is ASCII-only.
                let pattern = format!("%{}%", escape_like(&search.to_lowercase()));
                query = query.filter(
                    facilities::Column::SearchKey.like(LikeExpr::new(pattern).escape('\\')),
                );
            }
        }

        let total = query
            .clone()
            .count(&self.conn)
            .await
            .context("Failed to count facilities")?;

        let rows = query
            .order_by_desc(facilities::Column::CreatedAt)
            .order_by_desc(facilities::Column::Id)
            .offset(filter.offset)
            .limit(filter.limit)
            .all(&self.conn)
            .await
            .context("Failed to list facilities")?;

        Ok((rows.into_iter().map(Facility::from).collect(), total))
    }

    pub async fn count(&self) -> Result<u64> {
        Facilities::find()
            .count(&self.conn)
            .await
            .context("Failed to count facilities")
    }

    /// Every non-null business type value, one entry per facility.
    pub async fn business_type_values(&self) -> Result<Vec<String>> {
        Facilities::find()
            .select_only()
            .column(facilities::Column::BusinessType)
            .filter(facilities::Column::BusinessType.is_not_null())
            .into_tuple::<String>()
            .all(&self.conn)
            .await
            .context("Failed to query business types")
    }

    pub async fn distinct_business_types(&self) -> Result<Vec<String>> {
        Facilities::find()
            .select_only()
            .column(facilities::Column::BusinessType)
            .distinct()
            .filter(facilities::Column::BusinessType.is_not_null())
            .filter(facilities::Column::BusinessType.ne(""))
            .order_by_asc(facilities::Column::BusinessType)
            .into_tuple::<String>()
            .all(&self.conn)
            .await
            .context("Failed to query distinct business types")
    }
}

/// Escapes `LIKE` metacharacters so user input matches literally.
fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
