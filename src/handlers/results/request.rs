//! Scoring request DTOs

use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

const MAX_NOTE_LENGTH: u64 = 2000;

/// Judge's sheet for one entry
#[derive(Debug, Deserialize, Validate)]
pub struct ScoreSheetRequest {
    #[serde(default)]
    pub final_round: bool,
    #[serde(default)]
    #[validate(length(max = MAX_NOTE_LENGTH))]
    pub appearance: String,
    pub appearance_score: i32,
    #[serde(default)]
    #[validate(length(max = MAX_NOTE_LENGTH))]
    pub aroma: String,
    pub aroma_score: i32,
    #[serde(default)]
    #[validate(length(max = MAX_NOTE_LENGTH))]
    pub flavor: String,
    pub flavor_score: i32,
    #[serde(default)]
    #[validate(length(max = MAX_NOTE_LENGTH))]
    pub finish: String,
    pub finish_score: i32,
    #[serde(default)]
    #[validate(length(max = MAX_NOTE_LENGTH))]
    pub overall: String,
    pub overall_score: i32,
}

/// Best of Show pick; `null` clears it
#[derive(Debug, Deserialize)]
pub struct BestOfShowRequest {
    pub entry_id: Option<Uuid>,
}
