//! Judge response DTOs

use serde::Serialize;

use crate::models::JudgeStatus;

/// The caller's standing as a judge of a contest
#[derive(Debug, Serialize)]
pub struct ApplicationStatusResponse {
    pub status: Option<JudgeStatus>,
    pub registration_open: bool,
    pub has_certification: bool,
    pub can_apply: bool,
    pub can_withdraw: bool,
    /// Why applying is not possible, when it is not
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<&'static str>,
}

#[derive(Debug, Serialize)]
pub struct DecisionResponse {
    pub status: JudgeStatus,
    pub updated: u64,
}
