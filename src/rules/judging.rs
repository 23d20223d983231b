//! Judge application policy
//!
//! Decisions carry a reason so callers can tell the applicant why an action
//! is unavailable. The judge registration window is checked separately, at
//! the route boundary.

use serde::Serialize;

use crate::models::JudgeStatus;

/// Why an applicant action was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DenialReason {
    MissingCertification,
    AlreadyApplied,
    NotApplied,
    Rejected,
}

impl DenialReason {
    pub fn message(&self) -> &'static str {
        match self {
            Self::MissingCertification => {
                "You must provide information about your judge certificates first."
            }
            Self::AlreadyApplied => "You already applied for judging.",
            Self::NotApplied => "You have not applied for judging.",
            Self::Rejected => "You cannot withdraw a rejected application.",
        }
    }
}

/// Outcome of a policy check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyDecision {
    Allowed,
    Denied(DenialReason),
}

impl PolicyDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed)
    }

    pub fn reason(&self) -> Option<&'static str> {
        match self {
            Self::Allowed => None,
            Self::Denied(reason) => Some(reason.message()),
        }
    }
}

/// A user may apply once, and only after declaring a certification.
pub fn can_apply(has_certification: bool, application: Option<JudgeStatus>) -> PolicyDecision {
    if !has_certification {
        return PolicyDecision::Denied(DenialReason::MissingCertification);
    }
    if application.is_some() {
        return PolicyDecision::Denied(DenialReason::AlreadyApplied);
    }
    PolicyDecision::Allowed
}

/// Pending and approved applications can be withdrawn; rejected ones are final.
pub fn can_withdraw(application: Option<JudgeStatus>) -> PolicyDecision {
    match application {
        Some(JudgeStatus::Rejected) => PolicyDecision::Denied(DenialReason::Rejected),
        None => PolicyDecision::Denied(DenialReason::NotApplied),
        Some(JudgeStatus::Application | JudgeStatus::Approved) => PolicyDecision::Allowed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_requires_certification() {
        let decision = can_apply(false, None);
        assert_eq!(decision, PolicyDecision::Denied(DenialReason::MissingCertification));
        assert!(decision.reason().unwrap().contains("certificates"));
    }

    #[test]
    fn test_apply_twice_is_denied() {
        for status in [JudgeStatus::Application, JudgeStatus::Approved, JudgeStatus::Rejected] {
            assert_eq!(
                can_apply(true, Some(status)),
                PolicyDecision::Denied(DenialReason::AlreadyApplied)
            );
        }
    }

    #[test]
    fn test_apply_allowed() {
        assert!(can_apply(true, None).is_allowed());
        assert_eq!(can_apply(true, None).reason(), None);
    }

    #[test]
    fn test_withdraw_without_application() {
        assert_eq!(can_withdraw(None), PolicyDecision::Denied(DenialReason::NotApplied));
    }

    #[test]
    fn test_withdraw_rejected_mentions_rejected() {
        let decision = can_withdraw(Some(JudgeStatus::Rejected));
        assert!(!decision.is_allowed());
        assert!(decision.reason().unwrap().contains("rejected"));
    }

    #[test]
    fn test_withdraw_pending_or_approved() {
        assert!(can_withdraw(Some(JudgeStatus::Application)).is_allowed());
        assert!(can_withdraw(Some(JudgeStatus::Approved)).is_allowed());
    }
}
