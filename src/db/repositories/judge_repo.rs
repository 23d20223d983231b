//! Judge certification and application repository

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, PgExecutor, PgPool};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{JudgeCertification, JudgeInCompetition, JudgeStatus},
};

/// Application joined with the applicant and their certification
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ApplicationRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub status: String,
    pub is_mead_bjcp: Option<bool>,
    pub is_mjp: Option<bool>,
    pub mjp_level: Option<i32>,
    pub is_other: Option<bool>,
    pub other_description: Option<String>,
    pub created_at: DateTime<Utc>,
}

pub struct JudgeRepository;

impl JudgeRepository {
    pub async fn find_certification<'e>(
        executor: impl PgExecutor<'e>,
        user_id: &Uuid,
    ) -> AppResult<Option<JudgeCertification>> {
        let cert = sqlx::query_as::<_, JudgeCertification>(
            r#"SELECT * FROM judge_certifications WHERE user_id = $1"#,
        )
        .bind(user_id)
        .fetch_optional(executor)
        .await?;

        Ok(cert)
    }

    /// Insert or replace the user's certification
    pub async fn upsert_certification(pool: &PgPool, cert: &JudgeCertification) -> AppResult<JudgeCertification> {
        cert.ensure_persistable()?;

        let saved = sqlx::query_as::<_, JudgeCertification>(
            r#"
            INSERT INTO judge_certifications (
                user_id, is_mead_bjcp, is_mjp, is_other, mjp_level, other_description
            )
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (user_id) DO UPDATE SET
                is_mead_bjcp = EXCLUDED.is_mead_bjcp,
                is_mjp = EXCLUDED.is_mjp,
                is_other = EXCLUDED.is_other,
                mjp_level = EXCLUDED.mjp_level,
                other_description = EXCLUDED.other_description,
                updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(cert.user_id)
        .bind(cert.is_mead_bjcp)
        .bind(cert.is_mjp)
        .bind(cert.is_other)
        .bind(cert.mjp_level)
        .bind(&cert.other_description)
        .fetch_one(pool)
        .await?;

        Ok(saved)
    }

    pub async fn delete_certification(pool: &PgPool, user_id: &Uuid) -> AppResult<bool> {
        let result = sqlx::query(r#"DELETE FROM judge_certifications WHERE user_id = $1"#)
            .bind(user_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn find_application<'e>(
        executor: impl PgExecutor<'e>,
        user_id: &Uuid,
        contest_id: &Uuid,
    ) -> AppResult<Option<JudgeInCompetition>> {
        let application = sqlx::query_as::<_, JudgeInCompetition>(
            r#"SELECT * FROM judges_in_competition WHERE user_id = $1 AND contest_id = $2"#,
        )
        .bind(user_id)
        .bind(contest_id)
        .fetch_optional(executor)
        .await?;

        Ok(application)
    }

    pub async fn create_application<'e>(
        executor: impl PgExecutor<'e>,
        user_id: &Uuid,
        contest_id: &Uuid,
    ) -> AppResult<JudgeInCompetition> {
        let application = sqlx::query_as::<_, JudgeInCompetition>(
            r#"
            INSERT INTO judges_in_competition (user_id, contest_id)
            VALUES ($1, $2)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(contest_id)
        .fetch_one(executor)
        .await?;

        Ok(application)
    }

    pub async fn delete_application<'e>(executor: impl PgExecutor<'e>, id: &Uuid) -> AppResult<()> {
        sqlx::query(r#"DELETE FROM judges_in_competition WHERE id = $1"#)
            .bind(id)
            .execute(executor)
            .await?;

        Ok(())
    }

    /// Applications for a contest, optionally filtered by status
    pub async fn list_applications(
        pool: &PgPool,
        contest_id: &Uuid,
        status: Option<JudgeStatus>,
    ) -> AppResult<Vec<ApplicationRow>> {
        let rows = sqlx::query_as::<_, ApplicationRow>(
            r#"
            SELECT
                j.id, j.user_id, u.email, u.first_name, u.last_name, j.status,
                c.is_mead_bjcp, c.is_mjp, c.mjp_level, c.is_other, c.other_description,
                j.created_at
            FROM judges_in_competition j
            JOIN users u ON u.id = j.user_id
            LEFT JOIN judge_certifications c ON c.user_id = j.user_id
            WHERE j.contest_id = $1 AND ($2::text IS NULL OR j.status = $2)
            ORDER BY j.created_at
            "#,
        )
        .bind(contest_id)
        .bind(status.map(|s| s.as_str()))
        .fetch_all(pool)
        .await?;

        Ok(rows)
    }

    /// Move pending applications to `status`; decided rows are left alone
    pub async fn decide_applications(
        pool: &PgPool,
        contest_id: &Uuid,
        ids: &[Uuid],
        status: JudgeStatus,
    ) -> AppResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE judges_in_competition
            SET status = $3, updated_at = NOW()
            WHERE contest_id = $1 AND id = ANY($2) AND status = 'application'
            "#,
        )
        .bind(contest_id)
        .bind(ids)
        .bind(status.as_str())
        .execute(pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Whether the user is an approved judge of the contest
    pub async fn is_approved_judge(pool: &PgPool, user_id: &Uuid, contest_id: &Uuid) -> AppResult<bool> {
        let approved: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM judges_in_competition
                WHERE user_id = $1 AND contest_id = $2 AND status = 'approved'
            )
            "#,
        )
        .bind(user_id)
        .bind(contest_id)
        .fetch_one(pool)
        .await?;

        Ok(approved)
    }
}
