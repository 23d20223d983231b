//! Judge request DTOs

use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::models::JudgeStatus;

/// Certification form; submitting it with nothing checked removes the record
#[derive(Debug, Default, Deserialize)]
pub struct CertificationRequest {
    #[serde(default)]
    pub is_mead_bjcp: bool,
    #[serde(default)]
    pub is_mjp: bool,
    pub mjp_level: Option<i32>,
    #[serde(default)]
    pub is_other: bool,
    #[serde(default)]
    pub other_description: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct DecideApplicationsRequest {
    #[validate(length(min = 1))]
    pub ids: Vec<Uuid>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ApplicationsQuery {
    pub status: Option<JudgeStatus>,
}
