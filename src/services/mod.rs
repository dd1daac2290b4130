pub mod error_classifier;
pub use error_classifier::{ErrorCategory, ErrorClass, RetryPolicy, classify, with_retry};

pub mod fallback;
pub use fallback::{BusinessKind, fallback_keywords};

pub mod prompt;
pub mod keyword_parse;

pub mod keyword_generator;
pub use keyword_generator::{GenerationError, GenerationSettings, KeywordGenerator};

pub mod facility_service;
pub mod facility_service_impl;
pub use facility_service::{FacilityError, FacilityPage, FacilityService};
pub use facility_service_impl::SeaOrmFacilityService;

pub mod keyword_service;
pub mod keyword_service_impl;
pub use keyword_service::{KeywordError, KeywordService};
pub use keyword_service_impl::SeaOrmKeywordService;

pub mod auth_service;
pub mod auth_service_impl;
pub use auth_service::{AuthError, AuthService, LoginResult, UserInfo};
pub use auth_service_impl::SeaOrmAuthService;

pub mod export;
pub use export::{ExportError, ExportFile, ExportFormat, ExportService, ExportStats};
