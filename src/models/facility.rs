use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::constants::facility as limits;
use crate::domain::FacilityId;
use crate::entities::facilities;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Facility {
    pub id: FacilityId,
    pub facility_name: String,
    pub business_type: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub business_hours: Option<String>,
    pub closed_days: Option<String>,
    pub official_site_url: Option<String>,
    pub gbp_url: Option<String>,
    pub additional_info: Option<String>,
    pub created_by: Option<i32>,
    pub updated_by: Option<i32>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<facilities::Model> for Facility {
    fn from(model: facilities::Model) -> Self {
        Self {
            id: FacilityId::new(model.id),
            facility_name: model.facility_name,
            business_type: model.business_type,
            address: model.address,
            phone: model.phone,
            business_hours: model.business_hours,
            closed_days: model.closed_days,
            official_site_url: model.official_site_url,
            gbp_url: model.gbp_url,
            additional_info: model.additional_info,
            created_by: model.created_by,
            updated_by: model.updated_by,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// Request body for creating a facility.
///
/// Every field defaults so that a missing name is reported as a validation
/// failure instead of a deserialization rejection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct NewFacility {
    pub facility_name: String,
    pub business_type: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub business_hours: Option<String>,
    pub closed_days: Option<String>,
    pub official_site_url: Option<String>,
    pub gbp_url: Option<String>,
    pub additional_info: Option<String>,
}

/// Partial update. `None` leaves a column untouched, `Some("")` clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FacilityPatch {
    pub facility_name: Option<String>,
    pub business_type: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub business_hours: Option<String>,
    pub closed_days: Option<String>,
    pub official_site_url: Option<String>,
    pub gbp_url: Option<String>,
    pub additional_info: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FacilityFilter {
    pub business_type: Option<String>,
    pub search: Option<String>,
    pub limit: u64,
    pub offset: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FacilityStats {
    pub total_count: u64,
    pub business_type_counts: BTreeMap<String, u64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationFailure {
    pub field: &'static str,
    pub message: String,
}

impl ValidationFailure {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl NewFacility {
    pub fn validate(&self) -> Result<(), ValidationFailure> {
        validate_name(&self.facility_name)?;
        validate_optional_fields(&OptionalFields {
            business_type: self.business_type.as_deref(),
            address: self.address.as_deref(),
            phone: self.phone.as_deref(),
            business_hours: self.business_hours.as_deref(),
            closed_days: self.closed_days.as_deref(),
            official_site_url: self.official_site_url.as_deref(),
            gbp_url: self.gbp_url.as_deref(),
            additional_info: self.additional_info.as_deref(),
        })
    }
}

impl FacilityPatch {
    pub fn validate(&self) -> Result<(), ValidationFailure> {
        if self.is_empty() {
            return Err(ValidationFailure::new(
                "facility",
                "更新する項目がありません (no fields to update)",
            ));
        }
        if let Some(name) = &self.facility_name {
            validate_name(name)?;
        }
        validate_optional_fields(&OptionalFields {
            business_type: self.business_type.as_deref(),
            address: self.address.as_deref(),
            phone: self.phone.as_deref(),
            business_hours: self.business_hours.as_deref(),
            closed_days: self.closed_days.as_deref(),
            official_site_url: self.official_site_url.as_deref(),
            gbp_url: self.gbp_url.as_deref(),
            additional_info: self.additional_info.as_deref(),
        })
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.facility_name.is_none()
            && self.business_type.is_none()
            && self.address.is_none()
            && self.phone.is_none()
            && self.business_hours.is_none()
            && self.closed_days.is_none()
            && self.official_site_url.is_none()
            && self.gbp_url.is_none()
            && self.additional_info.is_none()
    }
}

struct OptionalFields<'a> {
    business_type: Option<&'a str>,
    address: Option<&'a str>,
    phone: Option<&'a str>,
    business_hours: Option<&'a str>,
    closed_days: Option<&'a str>,
    official_site_url: Option<&'a str>,
    gbp_url: Option<&'a str>,
    additional_info: Option<&'a str>,
}

fn validate_name(name: &str) -> Result<(), ValidationFailure> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ValidationFailure::new(
            "facility_name",
            "施設名は必須です (facility_name is required)",
        ));
    }
    check_length("facility_name", name, limits::MAX_NAME)
}

fn validate_optional_fields(fields: &OptionalFields<'_>) -> Result<(), ValidationFailure> {
    let bounded = [
        ("business_type", fields.business_type, limits::MAX_BUSINESS_TYPE),
        ("address", fields.address, limits::MAX_ADDRESS),
        ("business_hours", fields.business_hours, limits::MAX_BUSINESS_HOURS),
        ("closed_days", fields.closed_days, limits::MAX_CLOSED_DAYS),
        ("additional_info", fields.additional_info, limits::MAX_ADDITIONAL_INFO),
    ];

    for (field, value, max) in bounded {
        if let Some(value) = value {
            check_length(field, value.trim(), max)?;
        }
    }

    if let Some(phone) = fields.phone.map(str::trim).filter(|p| !p.is_empty()) {
        check_length("phone", phone, limits::MAX_PHONE)?;
        let allowed = |c: char| c.is_ascii_digit() || matches!(c, '-' | '+' | ' ' | '(' | ')');
        if !phone.chars().all(allowed) {
            return Err(ValidationFailure::new(
                "phone",
                format!("Invalid phone number: {phone}"),
            ));
        }
    }

    for (field, value) in [
        ("official_site_url", fields.official_site_url),
        ("gbp_url", fields.gbp_url),
    ] {
        if let Some(url) = value.map(str::trim).filter(|u| !u.is_empty()) {
            check_length(field, url, limits::MAX_URL)?;
            validate_url(field, url)?;
        }
    }

    Ok(())
}

fn check_length(field: &'static str, value: &str, max: usize) -> Result<(), ValidationFailure> {
    let len = value.chars().count();
    if len > max {
        return Err(ValidationFailure::new(
            field,
            format!("{field} must be at most {max} characters (got {len})"),
        ));
    }
    Ok(())
}

fn validate_url(field: &'static str, value: &str) -> Result<(), ValidationFailure> {
    match url::Url::parse(value) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => Ok(()),
        _ => Err(ValidationFailure::new(
            field,
            format!("{field} must be a valid http(s) URL: {value}"),
        )),
    }
}

/// Trims a user supplied optional string, mapping blanks to `None`.
#[must_use]
pub fn normalize_optional(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(ToString::to_string)
}

/// Unicode-lowercased name and address, separated by a unit separator so a
/// search term never matches across the two fields.
#[must_use]
pub fn search_key(facility_name: &str, address: Option<&str>) -> String {
    let mut key = facility_name.trim().to_lowercase();
    if let Some(address) = address {
        key.push('\u{1f}');
        key.push_str(&address.trim().to_lowercase());
    }
    key
}
