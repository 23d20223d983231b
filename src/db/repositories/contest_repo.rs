//! Contest repository

use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{Category, CategoryOverview, Contest, PaymentMethod},
};

/// Repository for contest database operations
pub struct ContestRepository;

impl ContestRepository {
    /// Insert a bare contest; settings are written with [`Self::update`]
    pub async fn create<'e>(
        executor: impl PgExecutor<'e>,
        title: &str,
        slug: &str,
        created_by: &Uuid,
    ) -> AppResult<Contest> {
        let contest = sqlx::query_as::<_, Contest>(
            r#"
            INSERT INTO contests (title, slug, created_by)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(title)
        .bind(slug)
        .bind(created_by)
        .fetch_one(executor)
        .await?;

        Ok(contest)
    }

    /// Find contest by ID
    pub async fn find_by_id<'e>(executor: impl PgExecutor<'e>, id: &Uuid) -> AppResult<Option<Contest>> {
        let contest = sqlx::query_as::<_, Contest>(r#"SELECT * FROM contests WHERE id = $1"#)
            .bind(id)
            .fetch_optional(executor)
            .await?;

        Ok(contest)
    }

    /// Find contest by slug
    pub async fn find_by_slug(pool: &PgPool, slug: &str) -> AppResult<Option<Contest>> {
        let contest = sqlx::query_as::<_, Contest>(r#"SELECT * FROM contests WHERE slug = $1"#)
            .bind(slug)
            .fetch_optional(pool)
            .await?;

        Ok(contest)
    }

    /// Lock the contest row; every entry write for the contest serializes here
    pub async fn lock<'e>(executor: impl PgExecutor<'e>, id: &Uuid) -> AppResult<Option<Contest>> {
        let contest =
            sqlx::query_as::<_, Contest>(r#"SELECT * FROM contests WHERE id = $1 FOR UPDATE"#)
                .bind(id)
                .fetch_optional(executor)
                .await?;

        Ok(contest)
    }

    /// Write every editable column of the contest
    pub async fn update<'e>(executor: impl PgExecutor<'e>, contest: &Contest) -> AppResult<Contest> {
        let contest = sqlx::query_as::<_, Contest>(
            r#"
            UPDATE contests
            SET
                title = $2,
                slug = $3,
                description = $4,
                rules = $5,
                entry_fee_amount = $6,
                entry_fee_currency = $7,
                payment_transfer_info = $8,
                discount_rate = $9,
                entry_global_limit = $10,
                entry_user_limit = $11,
                delivery_address = $12,
                judge_registration_date_from = $13,
                judge_registration_date_to = $14,
                registration_date_from = $15,
                registration_date_to = $16,
                delivery_date_from = $17,
                delivery_date_to = $18,
                judging_date_from = $19,
                judging_date_to = $20,
                competition_is_published = $21,
                competition_autopublish_at = $22,
                result_is_published = $23,
                result_autopublish_at = $24,
                is_judging_eliminations = $25,
                is_judging_finals = $26,
                is_judging_bos = $27,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(contest.id)
        .bind(&contest.title)
        .bind(&contest.slug)
        .bind(&contest.description)
        .bind(&contest.rules)
        .bind(contest.entry_fee_amount)
        .bind(&contest.entry_fee_currency)
        .bind(&contest.payment_transfer_info)
        .bind(contest.discount_rate)
        .bind(contest.entry_global_limit)
        .bind(contest.entry_user_limit)
        .bind(&contest.delivery_address)
        .bind(contest.judge_registration_date_from)
        .bind(contest.judge_registration_date_to)
        .bind(contest.registration_date_from)
        .bind(contest.registration_date_to)
        .bind(contest.delivery_date_from)
        .bind(contest.delivery_date_to)
        .bind(contest.judging_date_from)
        .bind(contest.judging_date_to)
        .bind(contest.competition_is_published)
        .bind(contest.competition_autopublish_at)
        .bind(contest.result_is_published)
        .bind(contest.result_autopublish_at)
        .bind(contest.is_judging_eliminations)
        .bind(contest.is_judging_finals)
        .bind(contest.is_judging_bos)
        .fetch_one(executor)
        .await?;

        Ok(contest)
    }

    /// Record the Best of Show entry
    pub async fn set_bos_entry(pool: &PgPool, id: &Uuid, entry_id: Option<Uuid>) -> AppResult<Contest> {
        let contest = sqlx::query_as::<_, Contest>(
            r#"UPDATE contests SET bos_entry_id = $2, updated_at = NOW() WHERE id = $1 RETURNING *"#,
        )
        .bind(id)
        .bind(entry_id)
        .fetch_one(pool)
        .await?;

        Ok(contest)
    }

    /// Contests visible to the public: flagged or past their autopublish time
    pub async fn list_published(pool: &PgPool, offset: i64, limit: i64) -> AppResult<(Vec<Contest>, i64)> {
        let contests = sqlx::query_as::<_, Contest>(
            r#"
            SELECT * FROM contests
            WHERE competition_is_published
               OR (competition_autopublish_at IS NOT NULL AND competition_autopublish_at <= NOW())
            ORDER BY registration_date_from DESC NULLS LAST, created_at DESC
            OFFSET $1 LIMIT $2
            "#,
        )
        .bind(offset)
        .bind(limit)
        .fetch_all(pool)
        .await?;

        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM contests
            WHERE competition_is_published
               OR (competition_autopublish_at IS NOT NULL AND competition_autopublish_at <= NOW())
            "#,
        )
        .fetch_one(pool)
        .await?;

        Ok((contests, count))
    }

    /// Every contest, for staff
    pub async fn list_all(pool: &PgPool, offset: i64, limit: i64) -> AppResult<(Vec<Contest>, i64)> {
        let contests = sqlx::query_as::<_, Contest>(
            r#"SELECT * FROM contests ORDER BY created_at DESC OFFSET $1 LIMIT $2"#,
        )
        .bind(offset)
        .bind(limit)
        .fetch_all(pool)
        .await?;

        let count: i64 = sqlx::query_scalar(r#"SELECT COUNT(*) FROM contests"#)
            .fetch_one(pool)
            .await?;

        Ok((contests, count))
    }

    /// Check whether a slug is taken
    pub async fn slug_exists(pool: &PgPool, slug: &str) -> AppResult<bool> {
        let exists: bool =
            sqlx::query_scalar(r#"SELECT EXISTS(SELECT 1 FROM contests WHERE slug = $1)"#)
                .bind(slug)
                .fetch_one(pool)
                .await?;

        Ok(exists)
    }

    /// Number of entries registered in the contest
    pub async fn count_entries<'e>(executor: impl PgExecutor<'e>, contest_id: &Uuid) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM entries e
            JOIN categories c ON c.id = e.category_id
            WHERE c.contest_id = $1
            "#,
        )
        .bind(contest_id)
        .fetch_one(executor)
        .await?;

        Ok(count)
    }

    // Payment methods

    /// Methods the contest accepts
    pub async fn payment_methods<'e>(
        executor: impl PgExecutor<'e>,
        contest_id: &Uuid,
    ) -> AppResult<Vec<PaymentMethod>> {
        let methods = sqlx::query_as::<_, PaymentMethod>(
            r#"
            SELECT m.id, m.code, m.name
            FROM payment_methods m
            JOIN contest_payment_methods cpm ON cpm.method_id = m.id
            WHERE cpm.contest_id = $1
            ORDER BY m.code
            "#,
        )
        .bind(contest_id)
        .fetch_all(executor)
        .await?;

        Ok(methods)
    }

    /// Resolve method codes, ignoring unknown ones
    pub async fn find_methods_by_codes<'e>(
        executor: impl PgExecutor<'e>,
        codes: &[String],
    ) -> AppResult<Vec<PaymentMethod>> {
        let methods = sqlx::query_as::<_, PaymentMethod>(
            r#"SELECT id, code, name FROM payment_methods WHERE code = ANY($1) ORDER BY code"#,
        )
        .bind(codes)
        .fetch_all(executor)
        .await?;

        Ok(methods)
    }

    /// Replace the set of allowed methods
    pub async fn set_payment_methods(
        conn: &mut sqlx::PgConnection,
        contest_id: &Uuid,
        method_ids: &[Uuid],
    ) -> AppResult<()> {
        sqlx::query(r#"DELETE FROM contest_payment_methods WHERE contest_id = $1"#)
            .bind(contest_id)
            .execute(&mut *conn)
            .await?;

        sqlx::query(
            r#"
            INSERT INTO contest_payment_methods (contest_id, method_id)
            SELECT $1, UNNEST($2::uuid[])
            "#,
        )
        .bind(contest_id)
        .bind(method_ids)
        .execute(&mut *conn)
        .await?;

        Ok(())
    }

    // Categories

    /// Add a style to the contest
    pub async fn create_category(
        pool: &PgPool,
        contest_id: &Uuid,
        style_id: &Uuid,
        entries_limit: i32,
    ) -> AppResult<Category> {
        let category = sqlx::query_as::<_, Category>(
            r#"
            INSERT INTO categories (contest_id, style_id, entries_limit)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(contest_id)
        .bind(style_id)
        .bind(entries_limit)
        .fetch_one(pool)
        .await?;

        Ok(category)
    }

    /// Find category by ID
    pub async fn find_category<'e>(executor: impl PgExecutor<'e>, id: &Uuid) -> AppResult<Option<Category>> {
        let category = sqlx::query_as::<_, Category>(r#"SELECT * FROM categories WHERE id = $1"#)
            .bind(id)
            .fetch_optional(executor)
            .await?;

        Ok(category)
    }

    /// Change the per-user limit of a category
    pub async fn update_category_limit(pool: &PgPool, id: &Uuid, entries_limit: i32) -> AppResult<Category> {
        let category = sqlx::query_as::<_, Category>(
            r#"UPDATE categories SET entries_limit = $2 WHERE id = $1 RETURNING *"#,
        )
        .bind(id)
        .bind(entries_limit)
        .fetch_one(pool)
        .await?;

        Ok(category)
    }

    /// Remove a category together with its entries
    pub async fn delete_category<'e>(executor: impl PgExecutor<'e>, id: &Uuid) -> AppResult<bool> {
        let result = sqlx::query(r#"DELETE FROM categories WHERE id = $1"#)
            .bind(id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Categories with style details and the user's own entry count
    pub async fn list_categories(
        pool: &PgPool,
        contest_id: &Uuid,
        user_id: Option<&Uuid>,
    ) -> AppResult<Vec<CategoryOverview>> {
        let categories = sqlx::query_as::<_, CategoryOverview>(
            r#"
            SELECT
                c.id, c.contest_id, c.style_id,
                s.name AS style_name, s.slug AS style_slug,
                s.extra_info_is_required, s.extra_info_hint,
                c.entries_limit,
                (
                    SELECT COUNT(*) FROM entries e
                    WHERE e.category_id = c.id AND e.brewer_id = $2
                ) AS user_entries
            FROM categories c
            JOIN styles s ON s.id = c.style_id
            WHERE c.contest_id = $1
            ORDER BY s.name
            "#,
        )
        .bind(contest_id)
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(categories)
    }

    /// Number of finalists and of placed entries in a category
    pub async fn final_round_counts(pool: &PgPool, category_id: &Uuid) -> AppResult<(i64, i64)> {
        let counts: (i64, i64) = sqlx::query_as(
            r#"
            SELECT
                COUNT(*) FILTER (WHERE s.final_round) AS finalists,
                COUNT(*) FILTER (WHERE e.place > 0) AS placed
            FROM entries e
            LEFT JOIN score_sheets s ON s.entry_id = e.id
            WHERE e.category_id = $1
            "#,
        )
        .bind(category_id)
        .fetch_one(pool)
        .await?;

        Ok(counts)
    }
}
