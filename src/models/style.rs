//! Style model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Beverage style that contests pick categories from
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Style {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    /// Whether the style can be used in competitions
    pub show: bool,
    pub extra_info_is_required: bool,
    pub extra_info_hint: String,
    pub description: String,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Requiring extra information without telling brewers what to provide is refused
pub fn validate_extra_info(required: bool, hint: &str) -> Result<(), &'static str> {
    if required && hint.trim().is_empty() {
        return Err("If you require extra information from participants, provide them with a hint!");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_extra_info_needs_hint() {
        assert!(validate_extra_info(true, "").is_err());
        assert!(validate_extra_info(true, "Fruit used").is_ok());
        assert!(validate_extra_info(false, "").is_ok());
    }
}
