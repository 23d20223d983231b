//! Application-wide constants
//!
//! This module contains all constant values used throughout the application.
//! Constants are grouped by their purpose for better organization.

// =============================================================================
// SERVER DEFAULTS
// =============================================================================

/// Default server host address
pub const DEFAULT_SERVER_HOST: &str = "0.0.0.0";

/// Default server port
pub const DEFAULT_SERVER_PORT: u16 = 8080;

/// Default public URL used to build gateway callback links
pub const DEFAULT_PUBLIC_BASE_URL: &str = "http://localhost:8080";

// =============================================================================
// DATABASE DEFAULTS
// =============================================================================

/// Default maximum database connections in the pool
pub const DEFAULT_DATABASE_MAX_CONNECTIONS: u32 = 20;

// =============================================================================
// AUTHENTICATION DEFAULTS
// =============================================================================

/// Default JWT token expiry in hours
pub const DEFAULT_JWT_EXPIRY_HOURS: i64 = 24;

/// Default refresh token expiry in days
pub const DEFAULT_REFRESH_TOKEN_EXPIRY_DAYS: i64 = 7;

/// Minimum password length
pub const MIN_PASSWORD_LENGTH: u64 = 8;

/// Maximum password length
pub const MAX_PASSWORD_LENGTH: u64 = 128;

// =============================================================================
// PAYU
// =============================================================================

/// PayU sandbox host
pub const DEFAULT_PAYU_BASE_URL: &str = "https://secure.snd.payu.com";

/// OAuth endpoint of the PayU REST API
pub const PAYU_OAUTH_ENDPOINT: &str = "/pl/standard/user/oauth/authorize";

/// Order endpoint of the PayU REST API
pub const PAYU_ORDER_ENDPOINT: &str = "/api/v2_1/orders";

/// Order description shown on the PayU page
pub const PAYU_ORDER_DESCRIPTION: &str = "Konkurs";

// =============================================================================
// ENTRIES
// =============================================================================

/// First code handed out when a competition database has no entries yet
pub const FIRST_ENTRY_CODE: i32 = 1000;

/// Maximum entry name length
pub const MAX_ENTRY_NAME_LENGTH: u64 = 50;

/// Maximum length of the extra information attached to an entry
pub const MAX_ENTRY_EXTRA_INFO_LENGTH: u64 = 1000;

/// Alcohol content bounds in hundredths of a percent
pub const MIN_ALCOHOL_CONTENT_HUNDREDTHS: i64 = 0;
pub const MAX_ALCOHOL_CONTENT_HUNDREDTHS: i64 = 9999;

/// Places awarded in a category final
pub const MEDAL_PLACES: i64 = 3;

/// Rebate code length
pub const REBATE_CODE_LENGTH: usize = 10;

/// Currency of a contest unless staff choose another
pub const DEFAULT_CURRENCY: &str = "PLN";

/// Upper bound of rebate codes generated in one request
pub const MAX_REBATE_CODES_PER_REQUEST: u64 = 500;

// =============================================================================
// SCORE SHEET LIMITS
// =============================================================================

pub mod score_limits {
    pub const APPEARANCE: i32 = 12;
    pub const AROMA: i32 = 30;
    pub const FLAVOR: i32 = 32;
    pub const FINISH: i32 = 14;
    pub const OVERALL: i32 = 12;
}

// =============================================================================
// USER ROLES
// =============================================================================

/// User role identifiers
pub mod roles {
    pub const STAFF: &str = "staff";
    pub const PARTICIPANT: &str = "participant";

    /// All user roles
    pub const ALL: &[&str] = &[STAFF, PARTICIPANT];
}

/// Languages a participant can get feedback in
pub mod languages {
    pub const POLISH: &str = "pl";
    pub const ENGLISH: &str = "en";

    pub const ALL: &[&str] = &[POLISH, ENGLISH];
}

/// Payment method codes (seeded by the initial migration)
pub mod payment_methods {
    pub const FAKE: &str = "fake";
    pub const TRANSFER: &str = "transfer";
    pub const PAYU: &str = "payu";
    pub const PAYPAL: &str = "paypal";

    pub const ALL: &[&str] = &[FAKE, TRANSFER, PAYU, PAYPAL];
}

// =============================================================================
// API VERSIONING
// =============================================================================

/// API base path
pub const API_BASE_PATH: &str = "/api/v1";

// =============================================================================
// PAGINATION
// =============================================================================

/// Default page size for paginated results
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Maximum page size for paginated results
pub const MAX_PAGE_SIZE: u32 = 100;

// =============================================================================
// VALIDATION
// =============================================================================

/// Maximum contest title length
pub const MAX_CONTEST_TITLE_LENGTH: u64 = 255;

/// Maximum contest description length
pub const MAX_CONTEST_DESCRIPTION_LENGTH: u64 = 65535;

/// Maximum style name length
pub const MAX_STYLE_NAME_LENGTH: u64 = 50;
