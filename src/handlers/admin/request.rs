//! Staff request DTOs

use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::constants::MAX_REBATE_CODES_PER_REQUEST;

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateUserRoleRequest {
    #[validate(length(min = 1))]
    pub role: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct RebateCodesRequest {
    #[validate(range(min = 1, max = MAX_REBATE_CODES_PER_REQUEST))]
    pub count: u64,
}

/// Entries picked on a bulk form
#[derive(Debug, Deserialize, Validate)]
pub struct EntryIdsRequest {
    #[validate(length(min = 1))]
    pub entry_ids: Vec<Uuid>,
}
