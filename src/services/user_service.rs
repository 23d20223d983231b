//! User service

use sqlx::{PgConnection, PgPool};
use tracing::info;
use uuid::Uuid;

use crate::{
    db::repositories::{user_repo::{ParticipantRow, ProfileUpdate}, UserRepository},
    error::{AppError, AppResult},
    models::{RebateCode, User},
    utils::generate_rebate_code,
};

/// Attempts at drawing a code that is not stored yet
const REBATE_CODE_ATTEMPTS: usize = 5;

/// User service for business logic
pub struct UserService;

impl UserService {
    /// Get user by ID
    pub async fn get_user_by_id(pool: &PgPool, id: &Uuid) -> AppResult<User> {
        UserRepository::find_by_id(pool, id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    /// Load the user and refuse when shipping or feedback data is missing
    pub async fn require_complete_profile(pool: &PgPool, id: &Uuid) -> AppResult<User> {
        let user = Self::get_user_by_id(pool, id).await?;
        if !user.profile_complete() {
            return Err(AppError::Forbidden(
                "Complete your profile before registering".to_string(),
            ));
        }
        Ok(user)
    }

    /// Update the profile; a non-empty rebate code is redeemed in the same transaction
    pub async fn update_profile(pool: &PgPool, id: &Uuid, update: ProfileUpdate<'_>) -> AppResult<User> {
        let mut tx = pool.begin().await?;

        let code = update
            .rebate_code_text
            .map(|c| c.trim().to_uppercase())
            .filter(|c| !c.is_empty());

        if let Some(code) = &code {
            Self::redeem_rebate_code(&mut tx, id, code).await?;
        }

        let update = ProfileUpdate {
            rebate_code_text: code.as_deref(),
            ..update
        };
        let user = UserRepository::update_profile(&mut *tx, id, &update).await?;

        tx.commit().await?;
        Ok(user)
    }

    async fn redeem_rebate_code(conn: &mut PgConnection, user_id: &Uuid, code: &str) -> AppResult<()> {
        let rebate = UserRepository::find_rebate_code_for_update(&mut *conn, code)
            .await?
            .ok_or_else(|| AppError::InvalidField {
                field: "rebate_code_text".to_string(),
                message: "Wrong code".to_string(),
            })?;

        if !rebate.usable_by(user_id) {
            return Err(AppError::InvalidField {
                field: "rebate_code_text".to_string(),
                message: "This code has already been used".to_string(),
            });
        }

        if !rebate.is_used {
            UserRepository::use_rebate_code(&mut *conn, &rebate.id, user_id).await?;
            info!(user_id = %user_id, rebate_code_id = %rebate.id, "Rebate code redeemed");
        }
        Ok(())
    }

    /// Generate `count` fresh rebate codes
    pub async fn create_rebate_codes(pool: &PgPool, count: usize) -> AppResult<Vec<RebateCode>> {
        let mut codes = Vec::with_capacity(count);

        for _ in 0..count {
            let mut attempt = 0;
            let code = loop {
                attempt += 1;
                match UserRepository::create_rebate_code(pool, &generate_rebate_code()).await {
                    Ok(code) => break code,
                    Err(AppError::AlreadyExists(_)) if attempt < REBATE_CODE_ATTEMPTS => continue,
                    Err(e) => return Err(e),
                }
            };
            codes.push(code);
        }

        info!(count = codes.len(), "Rebate codes generated");
        Ok(codes)
    }

    pub async fn list_rebate_codes(pool: &PgPool) -> AppResult<Vec<RebateCode>> {
        UserRepository::list_rebate_codes(pool).await
    }

    /// Participants of a contest with their entry counters
    pub async fn list_participants(pool: &PgPool, contest_id: &Uuid) -> AppResult<Vec<ParticipantRow>> {
        UserRepository::list_participants(pool, contest_id).await
    }

    /// Promote or demote a user
    pub async fn set_role(pool: &PgPool, id: &Uuid, role: &str) -> AppResult<User> {
        Self::get_user_by_id(pool, id).await?;
        let user = UserRepository::update_role(pool, id, role).await?;
        info!(user_id = %id, role = %role, "User role changed");
        Ok(user)
    }
}
