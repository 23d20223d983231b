//! Style repository

use sqlx::PgPool;
use uuid::Uuid;

use crate::{error::AppResult, models::Style};

/// Writable style columns
pub struct StyleFields<'a> {
    pub name: &'a str,
    pub slug: &'a str,
    pub show: bool,
    pub extra_info_is_required: bool,
    pub extra_info_hint: &'a str,
    pub description: &'a str,
}

/// Repository for style database operations
pub struct StyleRepository;

impl StyleRepository {
    pub async fn create(pool: &PgPool, fields: &StyleFields<'_>, created_by: &Uuid) -> AppResult<Style> {
        let style = sqlx::query_as::<_, Style>(
            r#"
            INSERT INTO styles (name, slug, show, extra_info_is_required, extra_info_hint, description, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(fields.name)
        .bind(fields.slug)
        .bind(fields.show)
        .bind(fields.extra_info_is_required)
        .bind(fields.extra_info_hint)
        .bind(fields.description)
        .bind(created_by)
        .fetch_one(pool)
        .await?;

        Ok(style)
    }

    pub async fn find_by_id(pool: &PgPool, id: &Uuid) -> AppResult<Option<Style>> {
        let style = sqlx::query_as::<_, Style>(r#"SELECT * FROM styles WHERE id = $1"#)
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(style)
    }

    pub async fn update(pool: &PgPool, id: &Uuid, fields: &StyleFields<'_>) -> AppResult<Style> {
        let style = sqlx::query_as::<_, Style>(
            r#"
            UPDATE styles
            SET
                name = $2,
                slug = $3,
                show = $4,
                extra_info_is_required = $5,
                extra_info_hint = $6,
                description = $7,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(fields.name)
        .bind(fields.slug)
        .bind(fields.show)
        .bind(fields.extra_info_is_required)
        .bind(fields.extra_info_hint)
        .bind(fields.description)
        .fetch_one(pool)
        .await?;

        Ok(style)
    }

    pub async fn delete(pool: &PgPool, id: &Uuid) -> AppResult<bool> {
        let result = sqlx::query(r#"DELETE FROM styles WHERE id = $1"#)
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// List styles; `visible_only` hides the ones not offered to contests
    pub async fn list(pool: &PgPool, visible_only: bool) -> AppResult<Vec<Style>> {
        let styles = sqlx::query_as::<_, Style>(
            r#"SELECT * FROM styles WHERE (NOT $1 OR show) ORDER BY name"#,
        )
        .bind(visible_only)
        .fetch_all(pool)
        .await?;

        Ok(styles)
    }

    /// Whether another style already uses the slug
    pub async fn slug_taken(pool: &PgPool, slug: &str, except: Option<&Uuid>) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"SELECT EXISTS(SELECT 1 FROM styles WHERE slug = $1 AND ($2::uuid IS NULL OR id <> $2))"#,
        )
        .bind(slug)
        .bind(except)
        .fetch_one(pool)
        .await?;

        Ok(exists)
    }

    /// Number of styles, used to suffix clashing slugs
    pub async fn count(pool: &PgPool) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(r#"SELECT COUNT(*) FROM styles"#)
            .fetch_one(pool)
            .await?;

        Ok(count)
    }
}
