//! Entry repository

use serde::Serialize;
use sqlx::{FromRow, PgConnection, PgExecutor, PgPool};
use uuid::Uuid;

use crate::{
    constants::FIRST_ENTRY_CODE,
    error::AppResult,
    models::{Entry, EntryScope, EntryStats},
    rules::EntryFields,
};

/// Counters the capacity rules are evaluated against
#[derive(Debug, Clone, Copy, FromRow)]
pub struct OccupancyCounts {
    pub user_in_category: i64,
    pub contest_total: i64,
    pub user_in_contest: i64,
}

/// Placed entry as published in the results
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PlacedEntry {
    pub id: Uuid,
    pub code: i32,
    pub category_id: Uuid,
    pub style_name: String,
    pub name: String,
    pub place: i32,
    pub brewer_first_name: String,
    pub brewer_last_name: String,
    pub total_points: Option<i32>,
}

/// Repository for entry database operations
pub struct EntryRepository;

impl EntryRepository {
    /// Next free entry code. Codes are global, so concurrent writers in
    /// different contests are serialized on an advisory lock.
    pub async fn next_code(conn: &mut PgConnection) -> AppResult<i32> {
        sqlx::query(r#"SELECT pg_advisory_xact_lock(hashtext('entries.code'))"#)
            .execute(&mut *conn)
            .await?;

        let code: i32 = sqlx::query_scalar(r#"SELECT COALESCE(MAX(code) + 1, $1) FROM entries"#)
            .bind(FIRST_ENTRY_CODE)
            .fetch_one(&mut *conn)
            .await?;

        Ok(code)
    }

    /// Current occupancy for a brewer in a category and its contest
    pub async fn occupancy<'e>(
        executor: impl PgExecutor<'e>,
        contest_id: &Uuid,
        category_id: &Uuid,
        brewer_id: &Uuid,
    ) -> AppResult<OccupancyCounts> {
        let counts = sqlx::query_as::<_, OccupancyCounts>(
            r#"
            SELECT
                COUNT(*) FILTER (WHERE e.category_id = $2 AND e.brewer_id = $3) AS user_in_category,
                COUNT(*) AS contest_total,
                COUNT(*) FILTER (WHERE e.brewer_id = $3) AS user_in_contest
            FROM entries e
            JOIN categories c ON c.id = e.category_id
            WHERE c.contest_id = $1
            "#,
        )
        .bind(contest_id)
        .bind(category_id)
        .bind(brewer_id)
        .fetch_one(executor)
        .await?;

        Ok(counts)
    }

    pub async fn create<'e>(
        executor: impl PgExecutor<'e>,
        code: i32,
        brewer_id: &Uuid,
        fields: &EntryFields,
    ) -> AppResult<Entry> {
        let entry = sqlx::query_as::<_, Entry>(
            r#"
            INSERT INTO entries (
                code, category_id, brewer_id, name, sweetness, carbonation,
                extra_info, alcohol_content, place
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(code)
        .bind(fields.category_id)
        .bind(brewer_id)
        .bind(&fields.name)
        .bind(fields.sweetness.as_str())
        .bind(fields.carbonation.as_str())
        .bind(&fields.extra_info)
        .bind(fields.alcohol_content)
        .bind(fields.place)
        .fetch_one(executor)
        .await?;

        Ok(entry)
    }

    pub async fn find_by_id<'e>(executor: impl PgExecutor<'e>, id: &Uuid) -> AppResult<Option<Entry>> {
        let entry = sqlx::query_as::<_, Entry>(r#"SELECT * FROM entries WHERE id = $1"#)
            .bind(id)
            .fetch_optional(executor)
            .await?;

        Ok(entry)
    }

    /// Lock the entry row for a read-modify-write
    pub async fn find_for_update<'e>(executor: impl PgExecutor<'e>, id: &Uuid) -> AppResult<Option<Entry>> {
        let entry = sqlx::query_as::<_, Entry>(r#"SELECT * FROM entries WHERE id = $1 FOR UPDATE"#)
            .bind(id)
            .fetch_optional(executor)
            .await?;

        Ok(entry)
    }

    /// Contest an entry belongs to
    pub async fn contest_id_of<'e>(executor: impl PgExecutor<'e>, id: &Uuid) -> AppResult<Option<Uuid>> {
        let contest_id: Option<Uuid> = sqlx::query_scalar(
            r#"
            SELECT c.contest_id FROM entries e
            JOIN categories c ON c.id = e.category_id
            WHERE e.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(executor)
        .await?;

        Ok(contest_id)
    }

    /// Ownership and contest of each requested entry
    pub async fn scopes<'e>(executor: impl PgExecutor<'e>, ids: &[Uuid]) -> AppResult<Vec<EntryScope>> {
        let scopes = sqlx::query_as::<_, EntryScope>(
            r#"
            SELECT e.id, e.brewer_id, c.contest_id, e.is_paid
            FROM entries e
            JOIN categories c ON c.id = e.category_id
            WHERE e.id = ANY($1)
            "#,
        )
        .bind(ids)
        .fetch_all(executor)
        .await?;

        Ok(scopes)
    }

    pub async fn update<'e>(executor: impl PgExecutor<'e>, id: &Uuid, fields: &EntryFields) -> AppResult<Entry> {
        let entry = sqlx::query_as::<_, Entry>(
            r#"
            UPDATE entries
            SET
                category_id = $2,
                name = $3,
                sweetness = $4,
                carbonation = $5,
                extra_info = $6,
                alcohol_content = $7,
                place = $8,
                modified_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(fields.category_id)
        .bind(&fields.name)
        .bind(fields.sweetness.as_str())
        .bind(fields.carbonation.as_str())
        .bind(&fields.extra_info)
        .bind(fields.alcohol_content)
        .bind(fields.place)
        .fetch_one(executor)
        .await?;

        Ok(entry)
    }

    pub async fn delete<'e>(executor: impl PgExecutor<'e>, id: &Uuid) -> AppResult<()> {
        sqlx::query(r#"DELETE FROM entries WHERE id = $1"#)
            .bind(id)
            .execute(executor)
            .await?;

        Ok(())
    }

    /// Entries of a category that are paid, received or part of an open payment
    pub async fn count_frozen_in_category<'e>(executor: impl PgExecutor<'e>, category_id: &Uuid) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM entries e
            WHERE e.category_id = $1
              AND (e.is_paid OR e.is_received OR EXISTS (
                  SELECT 1 FROM payment_entries pe
                  JOIN payments p ON p.id = pe.payment_id
                  WHERE pe.entry_id = e.id AND p.status IN ('created', 'awaiting')
              ))
            "#,
        )
        .bind(category_id)
        .fetch_one(executor)
        .await?;

        Ok(count)
    }

    /// A brewer's entries in a contest ordered by code
    pub async fn list_by_brewer(pool: &PgPool, contest_id: &Uuid, brewer_id: &Uuid) -> AppResult<Vec<Entry>> {
        let entries = sqlx::query_as::<_, Entry>(
            r#"
            SELECT e.* FROM entries e
            JOIN categories c ON c.id = e.category_id
            WHERE c.contest_id = $1 AND e.brewer_id = $2
            ORDER BY e.code
            "#,
        )
        .bind(contest_id)
        .bind(brewer_id)
        .fetch_all(pool)
        .await?;

        Ok(entries)
    }

    /// Totals for a contest, optionally narrowed to one brewer
    pub async fn stats(pool: &PgPool, contest_id: &Uuid, brewer_id: Option<&Uuid>) -> AppResult<EntryStats> {
        let stats = sqlx::query_as::<_, EntryStats>(
            r#"
            SELECT
                COUNT(*) AS total,
                COUNT(*) FILTER (WHERE e.is_paid) AS paid,
                COUNT(*) FILTER (WHERE e.is_received) AS received
            FROM entries e
            JOIN categories c ON c.id = e.category_id
            WHERE c.contest_id = $1 AND ($2::uuid IS NULL OR e.brewer_id = $2)
            "#,
        )
        .bind(contest_id)
        .bind(brewer_id)
        .fetch_one(pool)
        .await?;

        Ok(stats)
    }

    /// Mark delivered bottles; entries outside the contest are left alone
    pub async fn mark_received(pool: &PgPool, contest_id: &Uuid, ids: &[Uuid]) -> AppResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE entries e
            SET is_received = TRUE, modified_at = NOW()
            FROM categories c
            WHERE c.id = e.category_id AND c.contest_id = $1 AND e.id = ANY($2)
            "#,
        )
        .bind(contest_id)
        .bind(ids)
        .execute(pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Mark every entry of a payment paid, returning their codes
    pub async fn mark_paid_by_payment<'e>(executor: impl PgExecutor<'e>, payment_id: &Uuid) -> AppResult<Vec<i32>> {
        let mut codes: Vec<i32> = sqlx::query_scalar(
            r#"
            UPDATE entries e
            SET is_paid = TRUE, modified_at = NOW()
            FROM payment_entries pe
            WHERE pe.entry_id = e.id AND pe.payment_id = $1
            RETURNING e.code
            "#,
        )
        .bind(payment_id)
        .fetch_all(executor)
        .await?;

        codes.sort_unstable();
        Ok(codes)
    }

    /// Placed entries of a contest, by category and place
    pub async fn list_placed(pool: &PgPool, contest_id: &Uuid) -> AppResult<Vec<PlacedEntry>> {
        let entries = sqlx::query_as::<_, PlacedEntry>(
            r#"
            SELECT
                e.id, e.code, e.category_id, s.name AS style_name, e.name, e.place,
                u.first_name AS brewer_first_name, u.last_name AS brewer_last_name,
                (ss.appearance_score + ss.aroma_score + ss.flavor_score
                    + ss.finish_score + ss.overall_score) AS total_points
            FROM entries e
            JOIN categories c ON c.id = e.category_id
            JOIN styles s ON s.id = c.style_id
            JOIN users u ON u.id = e.brewer_id
            LEFT JOIN score_sheets ss ON ss.entry_id = e.id
            WHERE c.contest_id = $1 AND e.place > 0
            ORDER BY s.name, e.place
            "#,
        )
        .bind(contest_id)
        .fetch_all(pool)
        .await?;

        Ok(entries)
    }
}
