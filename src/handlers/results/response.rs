//! Results response DTOs

use serde::Serialize;
use uuid::Uuid;

use crate::db::repositories::entry_repo::PlacedEntry;

#[derive(Debug, Serialize)]
pub struct CategoryResults {
    pub category_id: Uuid,
    pub style_name: String,
    pub entries: Vec<PlacedEntry>,
}

#[derive(Debug, Serialize)]
pub struct ResultsResponse {
    pub contest_id: Uuid,
    pub categories: Vec<CategoryResults>,
    pub best_of_show: Option<PlacedEntry>,
}
