//! Utility functions

pub mod crypto;
pub mod time;
pub mod validation;

pub use crypto::{generate_rebate_code, generate_secure_token, hash_string};
pub use time::now_utc;
pub use validation::{sanitize_string, slugify, validate_currency, validate_language};
