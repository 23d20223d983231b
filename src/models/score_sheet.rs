//! Score sheet model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Judges' assessment of a single entry
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ScoreSheet {
    pub id: Uuid,
    pub entry_id: Uuid,
    pub judge_id: Option<Uuid>,
    /// Entry advances to the category final
    pub final_round: bool,
    pub appearance: String,
    pub appearance_score: i32,
    pub aroma: String,
    pub aroma_score: i32,
    pub flavor: String,
    pub flavor_score: i32,
    pub finish: String,
    pub finish_score: i32,
    pub overall: String,
    pub overall_score: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ScoreSheet {
    pub fn total_points(&self) -> i32 {
        self.appearance_score
            + self.aroma_score
            + self.flavor_score
            + self.finish_score
            + self.overall_score
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_points() {
        let sheet = ScoreSheet {
            id: Uuid::new_v4(),
            entry_id: Uuid::new_v4(),
            judge_id: None,
            final_round: true,
            appearance: String::new(),
            appearance_score: 10,
            aroma: String::new(),
            aroma_score: 25,
            flavor: String::new(),
            flavor_score: 28,
            finish: String::new(),
            finish_score: 12,
            overall: String::new(),
            overall_score: 11,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert_eq!(sheet.total_points(), 86);
    }
}
