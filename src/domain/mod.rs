//! Domain primitives shared by the store, services and HTTP layer.
//!
//! Identifiers are wrapped in newtypes so a facility id cannot be confused
//! with a user id or a keyword row id.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Unique identifier for a Facility in the system.
///
/// # Examples
///
/// ```rust
/// use keyword_suggest::domain::FacilityId;
///
/// let id = FacilityId::new(42);
/// assert_eq!(id.value(), 42);
/// assert_eq!(id.to_string(), "42");
/// assert_eq!("42".parse::<FacilityId>(), Ok(id));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct FacilityId(i32);

impl FacilityId {
    /// Creates a new `FacilityId` from a raw i32 value.
    ///
    /// # Panics
    ///
    /// Panics in debug mode if `id` is negative. Production code should validate
    /// before construction.
    #[must_use]
    pub const fn new(id: i32) -> Self {
        debug_assert!(id >= 0, "FacilityId should be non-negative");
        Self(id)
    }

    /// Returns the underlying i32 value.
    #[must_use]
    pub const fn value(&self) -> i32 {
        self.0
    }
}

impl fmt::Display for FacilityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<FacilityId> for i32 {
    fn from(id: FacilityId) -> Self {
        id.0
    }
}

impl From<i32> for FacilityId {
    fn from(id: i32) -> Self {
        Self::new(id)
    }
}

/// Error returned when a path segment is not a valid facility id.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid facility id: {0}")]
pub struct ParseFacilityIdError(pub String);

impl FromStr for FacilityId {
    type Err = ParseFacilityIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().parse::<i32>() {
            Ok(id) if id > 0 => Ok(Self(id)),
            _ => Err(ParseFacilityIdError(s.to_string())),
        }
    }
}

impl Serialize for FacilityId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_i32(self.0)
    }
}

impl<'de> Deserialize<'de> for FacilityId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let id = i32::deserialize(deserializer)?;
        Ok(Self::new(id))
    }
}
