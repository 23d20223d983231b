//! Entry response DTOs

use serde::Serialize;

use crate::models::{Entry, EntryStats};

/// A brewer's entries in one contest
#[derive(Debug, Serialize)]
pub struct EntryListResponse {
    pub entries: Vec<Entry>,
    pub stats: EntryStats,
    /// Entries the brewer may still add, `None` when unlimited
    pub user_limit_left: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct DeleteEntryResponse {
    pub message: String,
}
