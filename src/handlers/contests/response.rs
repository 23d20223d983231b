//! Contest response DTOs

use chrono::NaiveDate;
use serde::Serialize;
use uuid::Uuid;

use crate::models::{CategoryOverview, Contest, PaymentMethod};

/// Contest with the flags derived for the current moment and caller
#[derive(Debug, Serialize)]
pub struct ContestResponse {
    #[serde(flatten)]
    pub contest: Contest,
    pub payment_methods: Vec<PaymentMethod>,
    pub is_published: bool,
    pub is_registrable: bool,
    pub can_judges_register: bool,
    pub show_results: bool,
    pub entries_editable: bool,
    /// `None` when the contest has no global cap
    pub global_limit_left: Option<i64>,
    /// Present for authenticated callers when the contest caps entries per user
    pub user_limit_left: Option<i64>,
}

/// Contest in list views
#[derive(Debug, Serialize)]
pub struct ContestSummary {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub registration_date_from: Option<NaiveDate>,
    pub registration_date_to: Option<NaiveDate>,
    pub judging_date_from: Option<NaiveDate>,
    pub judging_date_to: Option<NaiveDate>,
    pub show_results: bool,
}

/// Paginated contest list
#[derive(Debug, Serialize)]
pub struct ContestListResponse {
    pub contests: Vec<ContestSummary>,
    pub total: i64,
    pub page: u32,
    pub per_page: u32,
}

/// Category with the caller's occupancy
#[derive(Debug, Serialize)]
pub struct CategoryResponse {
    #[serde(flatten)]
    pub category: CategoryOverview,
    pub is_full: bool,
}

impl From<CategoryOverview> for CategoryResponse {
    fn from(category: CategoryOverview) -> Self {
        Self {
            is_full: category.is_full(),
            category,
        }
    }
}

/// Progress of a category final
#[derive(Debug, Serialize)]
pub struct FinalRoundResponse {
    pub category_id: Uuid,
    pub finalists: i64,
    pub placed: i64,
    pub done: bool,
}
