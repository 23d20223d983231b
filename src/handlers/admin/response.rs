//! Staff response DTOs

use serde::Serialize;

/// Result of a bulk update
#[derive(Debug, Serialize)]
pub struct BulkUpdateResponse {
    pub requested: usize,
    pub updated: u64,
}
