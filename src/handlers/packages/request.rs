//! Package request DTOs

use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct CreatePackageRequest {
    #[validate(length(min = 1))]
    pub entry_ids: Vec<Uuid>,
}
