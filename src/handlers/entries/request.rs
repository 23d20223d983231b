//! Entry request DTOs

use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::{
    constants::{MAX_ENTRY_EXTRA_INFO_LENGTH, MAX_ENTRY_NAME_LENGTH},
    models::{Carbonation, Sweetness},
};

/// Entry as submitted by its brewer
#[derive(Debug, Deserialize, Validate)]
pub struct EntryRequest {
    pub category_id: Uuid,

    #[validate(length(min = 1, max = MAX_ENTRY_NAME_LENGTH))]
    pub name: String,

    pub sweetness: Sweetness,
    pub carbonation: Carbonation,

    #[serde(default)]
    #[validate(length(max = MAX_ENTRY_EXTRA_INFO_LENGTH))]
    pub extra_info: String,

    pub alcohol_content: Option<Decimal>,
}

/// Final-round ranking set by staff; 0 removes the place
#[derive(Debug, Deserialize, Validate)]
pub struct PlaceRequest {
    #[validate(range(min = 0))]
    pub place: i32,
}
