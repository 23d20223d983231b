//! Entries package repository

use serde::Serialize;
use sqlx::{FromRow, PgConnection, PgPool};
use uuid::Uuid;

use crate::{error::AppResult, models::EntriesPackage};

/// Data printed on a bottle label
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct LabelRow {
    pub code: i32,
    pub category: String,
    pub name: String,
    pub sweetness: String,
    pub carbonation: String,
    pub extra_info: String,
    pub contest_title: String,
}

pub struct PackageRepository;

impl PackageRepository {
    /// Create a package holding the given entries
    pub async fn create(
        conn: &mut PgConnection,
        owner_id: &Uuid,
        contest_id: &Uuid,
        entry_ids: &[Uuid],
    ) -> AppResult<EntriesPackage> {
        let package = sqlx::query_as::<_, EntriesPackage>(
            r#"
            INSERT INTO entries_packages (owner_id, contest_id)
            VALUES ($1, $2)
            RETURNING *
            "#,
        )
        .bind(owner_id)
        .bind(contest_id)
        .fetch_one(&mut *conn)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO package_entries (package_id, entry_id)
            SELECT $1, UNNEST($2::uuid[])
            "#,
        )
        .bind(package.id)
        .bind(entry_ids)
        .execute(&mut *conn)
        .await?;

        Ok(package)
    }

    pub async fn find_by_id(pool: &PgPool, id: &Uuid) -> AppResult<Option<EntriesPackage>> {
        let package =
            sqlx::query_as::<_, EntriesPackage>(r#"SELECT * FROM entries_packages WHERE id = $1"#)
                .bind(id)
                .fetch_optional(pool)
                .await?;

        Ok(package)
    }

    pub async fn entry_ids(pool: &PgPool, id: &Uuid) -> AppResult<Vec<Uuid>> {
        let ids: Vec<Uuid> = sqlx::query_scalar(
            r#"SELECT entry_id FROM package_entries WHERE package_id = $1"#,
        )
        .bind(id)
        .fetch_all(pool)
        .await?;

        Ok(ids)
    }

    /// Label rows ordered by entry code
    pub async fn labels(pool: &PgPool, id: &Uuid) -> AppResult<Vec<LabelRow>> {
        let rows = sqlx::query_as::<_, LabelRow>(
            r#"
            SELECT
                e.code, s.name AS category, e.name, e.sweetness, e.carbonation,
                e.extra_info, ct.title AS contest_title
            FROM package_entries pe
            JOIN entries e ON e.id = pe.entry_id
            JOIN categories c ON c.id = e.category_id
            JOIN styles s ON s.id = c.style_id
            JOIN contests ct ON ct.id = c.contest_id
            WHERE pe.package_id = $1
            ORDER BY e.code
            "#,
        )
        .bind(id)
        .fetch_all(pool)
        .await?;

        Ok(rows)
    }
}
