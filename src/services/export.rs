//! CSV and JSON export of a facility's keywords.

use serde::Serialize;
use std::borrow::Cow;
use std::fmt::Write;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;

use crate::constants::export::CSV_HEADER;
use crate::domain::FacilityId;
use crate::models::{Facility, KeywordSet};
use crate::services::facility_service::{FacilityError, FacilityService};
use crate::services::keyword_service::{KeywordError, KeywordService};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Facility not found: {0}")]
    FacilityNotFound(FacilityId),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Failed to serialize export: {0}")]
    Serialize(String),
}

impl From<FacilityError> for ExportError {
    fn from(err: FacilityError) -> Self {
        match err {
            FacilityError::NotFound(id) => Self::FacilityNotFound(id),
            FacilityError::Validation(msg) | FacilityError::Database(msg) => Self::Database(msg),
        }
    }
}

impl From<KeywordError> for ExportError {
    fn from(err: KeywordError) -> Self {
        match err {
            KeywordError::FacilityNotFound(id) => Self::FacilityNotFound(id),
            other => Self::Database(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExportFormat {
    #[default]
    Csv,
    Json,
}

impl ExportFormat {
    #[must_use]
    pub const fn content_type(self) -> &'static str {
        match self {
            Self::Csv => "text/csv; charset=utf-8",
            Self::Json => "application/json",
        }
    }

    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            other => Err(format!("Unknown export format: {other} (expected csv or json)")),
        }
    }
}

/// Facility fields included in a JSON export.
#[derive(Debug, Clone, Serialize)]
pub struct FacilitySummary {
    pub id: FacilityId,
    pub facility_name: String,
    pub business_type: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub official_site_url: Option<String>,
    pub gbp_url: Option<String>,
}

impl From<&Facility> for FacilitySummary {
    fn from(f: &Facility) -> Self {
        Self {
            id: f.id,
            facility_name: f.facility_name.clone(),
            business_type: f.business_type.clone(),
            address: f.address.clone(),
            phone: f.phone.clone(),
            official_site_url: f.official_site_url.clone(),
            gbp_url: f.gbp_url.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct KeywordExport {
    pub facility: FacilitySummary,
    pub keywords: KeywordSet,
    pub exported_at: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportStats {
    pub total_facilities: u64,
    pub total_keywords: u64,
    pub exportable_facilities: u64,
}

/// A rendered export ready to be written or served.
#[derive(Debug, Clone)]
pub struct ExportFile {
    pub file_name: String,
    pub content_type: &'static str,
    pub body: String,
}

/// Quotes a field if it contains a delimiter, quote or line break.
#[must_use]
pub fn csv_escape(field: &str) -> Cow<'_, str> {
    if field.contains([',', '"', '\r', '\n']) {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}

/// One row per keyword, categories in fixed order, facility columns repeated.
#[must_use]
pub fn keywords_to_csv(facility: &Facility, keywords: &KeywordSet) -> String {
    let mut csv = CSV_HEADER.join(",");
    csv.push('\n');

    let name = csv_escape(&facility.facility_name);
    let business_type = csv_escape(facility.business_type.as_deref().unwrap_or_default());
    let address = csv_escape(facility.address.as_deref().unwrap_or_default());

    for (category, keyword) in keywords.iter() {
        let _ = writeln!(
            csv,
            "{name},{business_type},{address},{},{}",
            category.label(),
            csv_escape(keyword)
        );
    }

    csv
}

pub fn keywords_to_json(facility: &Facility, keywords: &KeywordSet) -> Result<String, ExportError> {
    let export = KeywordExport {
        facility: FacilitySummary::from(facility),
        keywords: keywords.clone(),
        exported_at: chrono::Utc::now().to_rfc3339(),
    };

    serde_json::to_string_pretty(&export).map_err(|e| ExportError::Serialize(e.to_string()))
}

pub struct ExportService {
    facilities: Arc<dyn FacilityService>,
    keywords: Arc<dyn KeywordService>,
}

impl ExportService {
    #[must_use]
    pub fn new(facilities: Arc<dyn FacilityService>, keywords: Arc<dyn KeywordService>) -> Self {
        Self {
            facilities,
            keywords,
        }
    }

    /// Renders the facility's keywords. The whole file is built before
    /// anything is returned.
    pub async fn export(
        &self,
        facility_id: FacilityId,
        format: ExportFormat,
    ) -> Result<ExportFile, ExportError> {
        let facility = self.facilities.get(facility_id).await?;
        let keywords = self.keywords.get(facility_id).await?;

        let body = match format {
            ExportFormat::Csv => keywords_to_csv(&facility, &keywords),
            ExportFormat::Json => keywords_to_json(&facility, &keywords)?,
        };

        Ok(ExportFile {
            file_name: format!("keywords_{facility_id}.{}", format.extension()),
            content_type: format.content_type(),
            body,
        })
    }

    pub async fn stats(&self) -> Result<ExportStats, ExportError> {
        let facilities = self.facilities.stats().await?;
        let keywords = self.keywords.stats().await?;

        Ok(ExportStats {
            total_facilities: facilities.total_count,
            total_keywords: keywords.total_keywords,
            exportable_facilities: keywords.facilities_with_keywords,
        })
    }
}
