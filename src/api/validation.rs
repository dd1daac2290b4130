use super::ApiError;
use crate::constants::limits::{DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT};
use crate::domain::FacilityId;

pub fn parse_facility_id(raw: &str) -> Result<FacilityId, ApiError> {
    raw.parse::<FacilityId>()
        .map_err(|e| ApiError::validation(format!("Invalid facility ID: {raw}. {e}")))
}

pub fn validate_limit(limit: Option<i64>) -> Result<u64, ApiError> {
    const MIN_LIMIT: u64 = 1;

    let Some(limit) = limit else {
        return Ok(DEFAULT_PAGE_LIMIT);
    };

    match u64::try_from(limit) {
        Ok(limit) if (MIN_LIMIT..=MAX_PAGE_LIMIT).contains(&limit) => Ok(limit),
        _ => Err(ApiError::validation(format!(
            "Invalid limit: {limit}. Limit must be between {MIN_LIMIT} and {MAX_PAGE_LIMIT}"
        ))),
    }
}

pub fn validate_offset(offset: Option<i64>) -> Result<u64, ApiError> {
    let offset = offset.unwrap_or(0);
    u64::try_from(offset).map_err(|_| {
        ApiError::validation(format!(
            "Invalid offset: {offset}. Offset must be zero or greater"
        ))
    })
}

/// Trims a free-text filter; blank means "no filter".
pub fn normalize_filter(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_facility_id() {
        assert_eq!(parse_facility_id("12").unwrap(), FacilityId::new(12));
        assert!(parse_facility_id("0").is_err());
        assert!(parse_facility_id("-3").is_err());
        assert!(parse_facility_id("abc").is_err());
    }

    #[test]
    fn test_validate_limit() {
        assert_eq!(validate_limit(None).unwrap(), 100);
        assert!(validate_limit(Some(1)).is_ok());
        assert!(validate_limit(Some(1000)).is_ok());
        assert!(validate_limit(Some(0)).is_err());
        assert!(validate_limit(Some(1001)).is_err());
        assert!(validate_limit(Some(-5)).is_err());
    }

    #[test]
    fn test_validate_offset() {
        assert_eq!(validate_offset(None).unwrap(), 0);
        assert_eq!(validate_offset(Some(40)).unwrap(), 40);
        assert!(validate_offset(Some(-1)).is_err());
    }

    #[test]
    fn test_normalize_filter() {
        assert_eq!(normalize_filter(Some("  cafe ".into())), Some("cafe".into()));
        assert_eq!(normalize_filter(Some("   ".into())), None);
        assert_eq!(normalize_filter(None), None);
    }
}
