//! User repository

use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{RebateCode, User},
};

/// Profile fields a user can change
pub struct ProfileUpdate<'a> {
    pub first_name: Option<&'a str>,
    pub last_name: Option<&'a str>,
    pub country: Option<&'a str>,
    pub phone: Option<&'a str>,
    pub address: Option<&'a str>,
    pub language: Option<&'a str>,
    pub rebate_code_text: Option<&'a str>,
}

/// Participant row in the staff overview
#[derive(Debug, Clone, sqlx::FromRow, serde::Serialize)]
pub struct ParticipantRow {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub total: i64,
    pub paid: i64,
    pub received: i64,
}

/// Repository for user database operations
pub struct UserRepository;

impl UserRepository {
    /// Create a new user
    pub async fn create(
        pool: &PgPool,
        email: &str,
        password_hash: &str,
        first_name: &str,
        last_name: &str,
        gdpr_consent: bool,
        role: &str,
    ) -> AppResult<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, password_hash, first_name, last_name, gdpr_consent, role)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(email)
        .bind(password_hash)
        .bind(first_name)
        .bind(last_name)
        .bind(gdpr_consent)
        .bind(role)
        .fetch_one(pool)
        .await?;

        Ok(user)
    }

    /// Find user by ID
    pub async fn find_by_id<'e>(executor: impl PgExecutor<'e>, id: &Uuid) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(r#"SELECT * FROM users WHERE id = $1"#)
            .bind(id)
            .fetch_optional(executor)
            .await?;

        Ok(user)
    }

    /// Find user by email (case-insensitive, e-mail is the login)
    pub async fn find_by_email(pool: &PgPool, email: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(r#"SELECT * FROM users WHERE lower(email) = lower($1)"#)
            .bind(email)
            .fetch_optional(pool)
            .await?;

        Ok(user)
    }

    /// Update last login timestamp
    pub async fn update_last_login(pool: &PgPool, id: &Uuid) -> AppResult<()> {
        sqlx::query(r#"UPDATE users SET last_login_at = NOW() WHERE id = $1"#)
            .bind(id)
            .execute(pool)
            .await?;

        Ok(())
    }

    /// Update profile fields, leaving absent ones untouched
    pub async fn update_profile<'e>(
        executor: impl PgExecutor<'e>,
        id: &Uuid,
        update: &ProfileUpdate<'_>,
    ) -> AppResult<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET
                first_name = COALESCE($2, first_name),
                last_name = COALESCE($3, last_name),
                country = COALESCE($4, country),
                phone = COALESCE($5, phone),
                address = COALESCE($6, address),
                language = COALESCE($7, language),
                rebate_code_text = COALESCE($8, rebate_code_text),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(update.first_name)
        .bind(update.last_name)
        .bind(update.country)
        .bind(update.phone)
        .bind(update.address)
        .bind(update.language)
        .bind(update.rebate_code_text)
        .fetch_one(executor)
        .await?;

        Ok(user)
    }

    /// Change a user's role
    pub async fn update_role(pool: &PgPool, id: &Uuid, role: &str) -> AppResult<User> {
        let user = sqlx::query_as::<_, User>(
            r#"UPDATE users SET role = $2, updated_at = NOW() WHERE id = $1 RETURNING *"#,
        )
        .bind(id)
        .bind(role)
        .fetch_one(pool)
        .await?;

        Ok(user)
    }

    /// Participants of a contest with their entry counters
    pub async fn list_participants(pool: &PgPool, contest_id: &Uuid) -> AppResult<Vec<ParticipantRow>> {
        let rows = sqlx::query_as::<_, ParticipantRow>(
            r#"
            SELECT
                u.id, u.email, u.first_name, u.last_name,
                COUNT(e.id) AS total,
                COUNT(e.id) FILTER (WHERE e.is_paid) AS paid,
                COUNT(e.id) FILTER (WHERE e.is_received) AS received
            FROM users u
            JOIN entries e ON e.brewer_id = u.id
            JOIN categories c ON c.id = e.category_id
            WHERE c.contest_id = $1
            GROUP BY u.id
            ORDER BY u.last_name, u.first_name, u.email
            "#,
        )
        .bind(contest_id)
        .fetch_all(pool)
        .await?;

        Ok(rows)
    }

    /// Store a freshly generated rebate code
    pub async fn create_rebate_code(pool: &PgPool, code: &str) -> AppResult<RebateCode> {
        let rebate = sqlx::query_as::<_, RebateCode>(
            r#"INSERT INTO rebate_codes (code) VALUES ($1) RETURNING *"#,
        )
        .bind(code)
        .fetch_one(pool)
        .await?;

        Ok(rebate)
    }

    /// Lock a rebate code row for the rest of the transaction
    pub async fn find_rebate_code_for_update<'e>(
        executor: impl PgExecutor<'e>,
        code: &str,
    ) -> AppResult<Option<RebateCode>> {
        let rebate = sqlx::query_as::<_, RebateCode>(
            r#"SELECT * FROM rebate_codes WHERE code = $1 FOR UPDATE"#,
        )
        .bind(code)
        .fetch_optional(executor)
        .await?;

        Ok(rebate)
    }

    /// Bind the code to a user and mark it used
    pub async fn use_rebate_code<'e>(
        executor: impl PgExecutor<'e>,
        id: &Uuid,
        user_id: &Uuid,
    ) -> AppResult<()> {
        sqlx::query(r#"UPDATE rebate_codes SET is_used = TRUE, user_id = $2 WHERE id = $1"#)
            .bind(id)
            .bind(user_id)
            .execute(executor)
            .await?;

        Ok(())
    }

    /// Whether the user redeemed any rebate code
    pub async fn has_rebate<'e>(executor: impl PgExecutor<'e>, user_id: &Uuid) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"SELECT EXISTS(SELECT 1 FROM rebate_codes WHERE user_id = $1 AND is_used)"#,
        )
        .bind(user_id)
        .fetch_one(executor)
        .await?;

        Ok(exists)
    }

    /// All rebate codes, newest first
    pub async fn list_rebate_codes(pool: &PgPool) -> AppResult<Vec<RebateCode>> {
        let codes = sqlx::query_as::<_, RebateCode>(
            r#"SELECT * FROM rebate_codes ORDER BY created_at DESC"#,
        )
        .fetch_all(pool)
        .await?;

        Ok(codes)
    }
}
