use crate::entities::{keywords, prelude::*};
use crate::models::{CategoryCounts, KeywordCategory, KeywordSet, KeywordStats};
use anyhow::{Context, Result};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};
use tracing::{info, warn};

pub struct KeywordRepository {
    conn: DatabaseConnection,
}

impl KeywordRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn get_for_facility(&self, facility_id: i32) -> Result<KeywordSet> {
        let rows = Keywords::find()
            .filter(keywords::Column::FacilityId.eq(facility_id))
            .order_by_asc(keywords::Column::Position)
            .order_by_asc(keywords::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to query keywords")?;

        let mut set = KeywordSet::default();
        for row in rows {
            match row.category.parse::<KeywordCategory>() {
                Ok(category) => set.get_mut(category).push(row.keyword),
                Err(e) => warn!(facility_id, keyword_id = row.id, "Skipping keyword row: {e}"),
            }
        }
        Ok(set)
    }

    /// Replaces every keyword of the facility with `set` atomically.
    pub async fn replace(&self, facility_id: i32, set: &KeywordSet) -> Result<()> {
        let now = chrono::Utc::now().to_rfc3339();
        let txn = self.conn.begin().await?;

        Keywords::delete_many()
            .filter(keywords::Column::FacilityId.eq(facility_id))
            .exec(&txn)
            .await
            .context("Failed to clear keywords")?;

        let mut models = Vec::with_capacity(set.len());
        for category in KeywordCategory::ALL {
            for (position, keyword) in (0_i32..).zip(set.get(category)) {
                models.push(keywords::ActiveModel {
                    facility_id: Set(facility_id),
                    category: Set(category.as_str().to_string()),
                    keyword: Set(keyword.clone()),
                    position: Set(position),
                    created_at: Set(now.clone()),
                    ..Default::default()
                });
            }
        }

        if !models.is_empty() {
            Keywords::insert_many(models)
                .exec(&txn)
                .await
                .context("Failed to insert keywords")?;
        }

        txn.commit().await?;

        info!(facility_id, count = set.len(), "Saved keywords");
        Ok(())
    }

    pub async fn delete_for_facility(&self, facility_id: i32) -> Result<u64> {
        let result = Keywords::delete_many()
            .filter(keywords::Column::FacilityId.eq(facility_id))
            .exec(&self.conn)
            .await
            .context("Failed to delete keywords")?;

        info!(facility_id, count = result.rows_affected, "Deleted keywords");
        Ok(result.rows_affected)
    }

    pub async fn count_for_facility(&self, facility_id: i32) -> Result<u64> {
        Keywords::find()
            .filter(keywords::Column::FacilityId.eq(facility_id))
            .count(&self.conn)
            .await
            .context("Failed to count keywords")
    }

    pub async fn stats(&self) -> Result<KeywordStats> {
        let rows: Vec<(i32, String)> = Keywords::find()
            .select_only()
            .column(keywords::Column::FacilityId)
            .column(keywords::Column::Category)
            .into_tuple()
            .all(&self.conn)
            .await
            .context("Failed to query keyword stats")?;

        let mut counts = CategoryCounts::default();
        let mut facilities = std::collections::HashSet::new();

        for (facility_id, category) in &rows {
            facilities.insert(*facility_id);
            if let Ok(category) = category.parse::<KeywordCategory>() {
                counts.add(category, 1);
            }
        }

        Ok(KeywordStats {
            total_keywords: rows.len() as u64,
            facilities_with_keywords: facilities.len() as u64,
            category_counts: counts,
        })
    }
}
