//! Contest request DTOs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::constants::{DEFAULT_CURRENCY, MAX_CONTEST_DESCRIPTION_LENGTH, MAX_CONTEST_TITLE_LENGTH};

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

/// Full contest settings, used for both create and replace
#[derive(Debug, Deserialize, Validate)]
pub struct ContestRequest {
    #[validate(length(min = 1, max = MAX_CONTEST_TITLE_LENGTH))]
    pub title: String,

    /// Derived from the title when omitted
    pub slug: Option<String>,

    #[serde(default)]
    #[validate(length(max = MAX_CONTEST_DESCRIPTION_LENGTH))]
    pub description: String,

    #[serde(default)]
    #[validate(length(max = MAX_CONTEST_DESCRIPTION_LENGTH))]
    pub rules: String,

    #[serde(default)]
    pub entry_fee_amount: Decimal,

    #[serde(default = "default_currency")]
    pub entry_fee_currency: String,

    #[serde(default)]
    pub payment_transfer_info: String,

    /// Percent off for rebate code holders
    #[serde(default)]
    pub discount_rate: Decimal,

    #[validate(range(min = 1))]
    pub entry_global_limit: Option<i32>,

    #[validate(range(min = 1))]
    pub entry_user_limit: Option<i32>,

    #[serde(default)]
    pub delivery_address: String,

    pub judge_registration_date_from: Option<NaiveDate>,
    pub judge_registration_date_to: Option<NaiveDate>,
    pub registration_date_from: Option<NaiveDate>,
    pub registration_date_to: Option<NaiveDate>,
    pub delivery_date_from: Option<NaiveDate>,
    pub delivery_date_to: Option<NaiveDate>,
    pub judging_date_from: Option<NaiveDate>,
    pub judging_date_to: Option<NaiveDate>,

    #[serde(default)]
    pub competition_is_published: bool,
    pub competition_autopublish_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub result_is_published: bool,
    pub result_autopublish_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub is_judging_eliminations: bool,
    #[serde(default)]
    pub is_judging_finals: bool,
    #[serde(default)]
    pub is_judging_bos: bool,

    /// Codes of the accepted payment methods
    #[serde(default)]
    pub payment_methods: Vec<String>,
}

/// List contests query parameters
#[derive(Debug, Deserialize)]
pub struct ListContestsQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

/// Add a style to a contest
#[derive(Debug, Deserialize, Validate)]
pub struct CategoryRequest {
    pub style_id: Uuid,

    #[validate(range(min = 1))]
    pub entries_limit: Option<i32>,
}

/// Change the per-user cap of a category
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateCategoryRequest {
    #[validate(range(min = 1))]
    pub entries_limit: i32,
}
