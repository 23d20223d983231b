//! User request DTOs

use serde::Deserialize;
use validator::Validate;

/// Profile edit; omitted fields keep their value
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(max = 150))]
    pub first_name: Option<String>,

    #[validate(length(max = 150))]
    pub last_name: Option<String>,

    #[validate(length(max = 100))]
    pub country: Option<String>,

    #[validate(length(max = 50))]
    pub phone: Option<String>,

    #[validate(length(max = 500))]
    pub address: Option<String>,

    /// Feedback language, `pl` or `en`
    pub language: Option<String>,

    #[validate(length(max = 20))]
    pub rebate_code_text: Option<String>,
}
