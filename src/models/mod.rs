pub mod facility;
pub mod keyword;

pub use facility::{Facility, FacilityFilter, FacilityPatch, FacilityStats, NewFacility};
pub use keyword::{CategoryCounts, KeywordCategory, KeywordSet, KeywordStats};
