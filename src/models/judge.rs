//! Judge certification and per-contest applications

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::UnknownVariant;
use crate::error::AppError;

/// Certificates a judge declares; one record per user
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct JudgeCertification {
    pub user_id: Uuid,
    pub is_mead_bjcp: bool,
    pub is_mjp: bool,
    pub is_other: bool,
    pub mjp_level: Option<i32>,
    pub other_description: String,
    pub updated_at: DateTime<Utc>,
}

/// Field-level certification problem
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct CertificationError {
    pub field: &'static str,
    pub message: &'static str,
}

impl From<CertificationError> for AppError {
    fn from(err: CertificationError) -> Self {
        AppError::InvalidField {
            field: err.field.to_string(),
            message: err.message.to_string(),
        }
    }
}

impl JudgeCertification {
    pub fn has_any(&self) -> bool {
        self.is_mead_bjcp || self.is_mjp || self.is_other
    }

    /// Validate dependent fields and drop the ones whose checkbox is off
    pub fn clean(&mut self) -> Result<(), CertificationError> {
        if self.is_mjp {
            match self.mjp_level {
                None => {
                    return Err(CertificationError {
                        field: "mjp_level",
                        message: "MJP level is required when MJP certification is selected.",
                    });
                }
                Some(level) if !(1..=5).contains(&level) => {
                    return Err(CertificationError {
                        field: "mjp_level",
                        message: "MJP level must be between 1 and 5.",
                    });
                }
                Some(_) => {}
            }
        }

        if self.is_other && self.other_description.trim().is_empty() {
            return Err(CertificationError {
                field: "other_description",
                message: "Description is required when Other certification is selected.",
            });
        }

        if !self.is_mjp {
            self.mjp_level = None;
        }
        if !self.is_other {
            self.other_description.clear();
        }
        Ok(())
    }

    /// Persisting a certification without any type is a caller bug
    pub fn ensure_persistable(&self) -> Result<(), AppError> {
        if !self.has_any() {
            return Err(AppError::Internal(anyhow::anyhow!(
                "At least one certification type must be selected."
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JudgeStatus {
    Application,
    Approved,
    Rejected,
}

impl JudgeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Application => "application",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    /// Only pending applications are decided by staff
    pub fn can_transition_to(&self, next: JudgeStatus) -> bool {
        matches!(
            (self, next),
            (Self::Application, Self::Approved) | (Self::Application, Self::Rejected)
        )
    }
}

impl fmt::Display for JudgeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JudgeStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "application" => Ok(Self::Application),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            other => Err(UnknownVariant {
                kind: "judge status",
                value: other.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for JudgeStatus {
    type Error = UnknownVariant;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// A judge's application for a specific contest
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct JudgeInCompetition {
    pub id: Uuid,
    pub user_id: Uuid,
    pub contest_id: Uuid,
    #[sqlx(try_from = "String")]
    pub status: JudgeStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cert() -> JudgeCertification {
        JudgeCertification {
            user_id: Uuid::new_v4(),
            is_mead_bjcp: false,
            is_mjp: false,
            is_other: false,
            mjp_level: None,
            other_description: String::new(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_bjcp_only_is_valid() {
        let mut c = cert();
        c.is_mead_bjcp = true;
        assert!(c.clean().is_ok());
        assert_eq!(c.mjp_level, None);
        assert_eq!(c.other_description, "");
    }

    #[test]
    fn test_mjp_without_level_fails_on_level() {
        let mut c = cert();
        c.is_mjp = true;
        let err = c.clean().unwrap_err();
        assert_eq!(err.field, "mjp_level");
    }

    #[test]
    fn test_mjp_level_out_of_range() {
        let mut c = cert();
        c.is_mjp = true;
        c.mjp_level = Some(6);
        assert_eq!(c.clean().unwrap_err().field, "mjp_level");
    }

    #[test]
    fn test_other_blank_description_fails() {
        let mut c = cert();
        c.is_other = true;
        c.other_description = "   ".to_string();
        assert_eq!(c.clean().unwrap_err().field, "other_description");
    }

    #[test]
    fn test_unchecked_types_are_cleared() {
        let mut c = cert();
        c.is_mead_bjcp = true;
        c.mjp_level = Some(4);
        c.other_description = "Test".to_string();
        c.clean().unwrap();
        assert_eq!(c.mjp_level, None);
        assert_eq!(c.other_description, "");
    }

    #[test]
    fn test_multiple_certifications() {
        let mut c = cert();
        c.is_mead_bjcp = true;
        c.is_mjp = true;
        c.mjp_level = Some(2);
        c.is_other = true;
        c.other_description = "Desc".to_string();
        assert!(c.clean().is_ok());
        assert_eq!(c.mjp_level, Some(2));
    }

    #[test]
    fn test_empty_certification_is_not_persistable() {
        let err = cert().ensure_persistable().unwrap_err();
        assert!(matches!(err, AppError::Internal(_)));
    }

    #[test]
    fn test_staff_transitions() {
        assert!(JudgeStatus::Application.can_transition_to(JudgeStatus::Approved));
        assert!(JudgeStatus::Application.can_transition_to(JudgeStatus::Rejected));
        assert!(!JudgeStatus::Rejected.can_transition_to(JudgeStatus::Approved));
        assert!(!JudgeStatus::Approved.can_transition_to(JudgeStatus::Rejected));
    }
}
