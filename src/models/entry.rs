//! Entry model

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::UnknownVariant;

/// Entry database model
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Entry {
    pub id: Uuid,
    /// Anonymous code printed on labels and shown to judges
    pub code: i32,
    pub category_id: Uuid,
    pub brewer_id: Uuid,
    pub name: String,
    #[sqlx(try_from = "String")]
    pub sweetness: Sweetness,
    #[sqlx(try_from = "String")]
    pub carbonation: Carbonation,
    pub extra_info: String,
    pub alcohol_content: Option<Decimal>,
    /// Final-round ranking, 0 when not placed
    pub place: i32,
    pub is_paid: bool,
    pub is_received: bool,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sweetness {
    Dry,
    Medium,
    Sweet,
}

impl Sweetness {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dry => "dry",
            Self::Medium => "medium",
            Self::Sweet => "sweet",
        }
    }
}

impl fmt::Display for Sweetness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Sweetness {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dry" => Ok(Self::Dry),
            "medium" => Ok(Self::Medium),
            "sweet" => Ok(Self::Sweet),
            other => Err(UnknownVariant {
                kind: "sweetness",
                value: other.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for Sweetness {
    type Error = UnknownVariant;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Carbonation {
    Still,
    Petillant,
    Sparkling,
}

impl Carbonation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Still => "still",
            Self::Petillant => "petillant",
            Self::Sparkling => "sparkling",
        }
    }
}

impl fmt::Display for Carbonation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Carbonation {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "still" => Ok(Self::Still),
            "petillant" => Ok(Self::Petillant),
            "sparkling" => Ok(Self::Sparkling),
            other => Err(UnknownVariant {
                kind: "carbonation",
                value: other.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for Carbonation {
    type Error = UnknownVariant;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Entries grouped for a single payment or delivery
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct EntriesPackage {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub contest_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Entry together with the contest it belongs to, used for ownership checks
#[derive(Debug, Clone, FromRow)]
pub struct EntryScope {
    pub id: Uuid,
    pub brewer_id: Uuid,
    pub contest_id: Uuid,
    pub is_paid: bool,
}

/// Per-user counters shown on the participant list
#[derive(Debug, Clone, Default, FromRow, Serialize)]
pub struct EntryStats {
    pub total: i64,
    pub paid: i64,
    pub received: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sweetness_parse() {
        assert_eq!("dry".parse::<Sweetness>().unwrap(), Sweetness::Dry);
        let err = "bone-dry".parse::<Sweetness>().unwrap_err();
        assert_eq!(err.kind, "sweetness");
    }

    #[test]
    fn test_carbonation_serde_matches_storage() {
        let json = serde_json::to_string(&Carbonation::Petillant).unwrap();
        assert_eq!(json, format!("\"{}\"", Carbonation::Petillant.as_str()));
    }
}
