//! User model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::constants::roles;

/// User database model
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub country: String,
    pub phone: String,
    pub address: String,
    /// Language the brewer wants feedback in
    pub language: String,
    pub role: String,
    pub gdpr_consent: bool,
    pub gdpr_consent_at: DateTime<Utc>,
    pub rebate_code_text: String,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Check if user belongs to contest staff
    pub fn is_staff(&self) -> bool {
        self.role == roles::STAFF
    }

    /// Every field needed for shipping labels and judging feedback is filled in
    pub fn profile_complete(&self) -> bool {
        [
            &self.first_name,
            &self.last_name,
            &self.country,
            &self.phone,
            &self.address,
            &self.language,
        ]
        .iter()
        .all(|value| !value.trim().is_empty())
    }

    /// "Last First" when both are known, the e-mail otherwise
    pub fn display_name(&self) -> String {
        if !self.last_name.is_empty() && !self.first_name.is_empty() {
            format!("{} {}", self.last_name, self.first_name)
        } else {
            self.email.clone()
        }
    }
}

/// One-time code granting the contest discount
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct RebateCode {
    pub id: Uuid,
    pub code: String,
    pub is_used: bool,
    pub user_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl RebateCode {
    /// A code is usable when it is fresh or already bound to the same user
    pub fn usable_by(&self, user_id: &Uuid) -> bool {
        !self.is_used || self.user_id.as_ref() == Some(user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        let now = Utc::now();
        User {
            id: Uuid::new_v4(),
            email: "brewer@example.com".to_string(),
            password_hash: String::new(),
            first_name: "Jan".to_string(),
            last_name: "Kowalski".to_string(),
            country: "PL".to_string(),
            phone: "+48123456789".to_string(),
            address: "ul. Miodowa 1, Kraków".to_string(),
            language: "pl".to_string(),
            role: roles::PARTICIPANT.to_string(),
            gdpr_consent: true,
            gdpr_consent_at: now,
            rebate_code_text: String::new(),
            last_login_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_profile_complete() {
        let mut u = user();
        assert!(u.profile_complete());
        u.phone = "  ".to_string();
        assert!(!u.profile_complete());
    }

    #[test]
    fn test_display_name_falls_back_to_email() {
        let mut u = user();
        assert_eq!(u.display_name(), "Kowalski Jan");
        u.first_name.clear();
        assert_eq!(u.display_name(), "brewer@example.com");
    }

    #[test]
    fn test_rebate_code_reuse() {
        let owner = Uuid::new_v4();
        let code = RebateCode {
            id: Uuid::new_v4(),
            code: "ABCDEFGH12".to_string(),
            is_used: true,
            user_id: Some(owner),
            created_at: Utc::now(),
        };
        assert!(code.usable_by(&owner));
        assert!(!code.usable_by(&Uuid::new_v4()));
    }
}
