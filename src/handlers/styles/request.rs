//! Style request DTOs

use serde::Deserialize;
use validator::Validate;

use crate::{constants::MAX_STYLE_NAME_LENGTH, services::style_service::StyleInput};

fn default_show() -> bool {
    true
}

#[derive(Debug, Deserialize, Validate)]
pub struct StyleRequest {
    #[validate(length(min = 1, max = MAX_STYLE_NAME_LENGTH))]
    pub name: String,

    /// Derived from the name when missing
    #[validate(length(max = 60))]
    pub slug: Option<String>,

    #[serde(default = "default_show")]
    pub show: bool,

    #[serde(default)]
    pub extra_info_is_required: bool,

    #[serde(default)]
    #[validate(length(max = 255))]
    pub extra_info_hint: String,

    #[serde(default)]
    pub description: String,
}

impl StyleRequest {
    pub fn as_input(&self) -> StyleInput<'_> {
        StyleInput {
            name: self.name.trim(),
            slug: self.slug.as_deref(),
            show: self.show,
            extra_info_is_required: self.extra_info_is_required,
            extra_info_hint: self.extra_info_hint.trim(),
            description: &self.description,
        }
    }
}
