//! Score sheet repository

use sqlx::PgPool;
use uuid::Uuid;

use crate::{error::AppResult, models::ScoreSheet};

/// Scores and notes written by a judge
pub struct ScoreFields<'a> {
    pub final_round: bool,
    pub appearance: &'a str,
    pub appearance_score: i32,
    pub aroma: &'a str,
    pub aroma_score: i32,
    pub flavor: &'a str,
    pub flavor_score: i32,
    pub finish: &'a str,
    pub finish_score: i32,
    pub overall: &'a str,
    pub overall_score: i32,
}

pub struct ScoreSheetRepository;

impl ScoreSheetRepository {
    /// Create or overwrite the single sheet of an entry
    pub async fn upsert(
        pool: &PgPool,
        entry_id: &Uuid,
        judge_id: &Uuid,
        fields: &ScoreFields<'_>,
    ) -> AppResult<ScoreSheet> {
        let sheet = sqlx::query_as::<_, ScoreSheet>(
            r#"
            INSERT INTO score_sheets (
                entry_id, judge_id, final_round,
                appearance, appearance_score, aroma, aroma_score,
                flavor, flavor_score, finish, finish_score, overall, overall_score
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            ON CONFLICT (entry_id) DO UPDATE SET
                judge_id = EXCLUDED.judge_id,
                final_round = EXCLUDED.final_round,
                appearance = EXCLUDED.appearance,
                appearance_score = EXCLUDED.appearance_score,
                aroma = EXCLUDED.aroma,
                aroma_score = EXCLUDED.aroma_score,
                flavor = EXCLUDED.flavor,
                flavor_score = EXCLUDED.flavor_score,
                finish = EXCLUDED.finish,
                finish_score = EXCLUDED.finish_score,
                overall = EXCLUDED.overall,
                overall_score = EXCLUDED.overall_score,
                updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(entry_id)
        .bind(judge_id)
        .bind(fields.final_round)
        .bind(fields.appearance)
        .bind(fields.appearance_score)
        .bind(fields.aroma)
        .bind(fields.aroma_score)
        .bind(fields.flavor)
        .bind(fields.flavor_score)
        .bind(fields.finish)
        .bind(fields.finish_score)
        .bind(fields.overall)
        .bind(fields.overall_score)
        .fetch_one(pool)
        .await?;

        Ok(sheet)
    }

    pub async fn find_by_entry(pool: &PgPool, entry_id: &Uuid) -> AppResult<Option<ScoreSheet>> {
        let sheet = sqlx::query_as::<_, ScoreSheet>(r#"SELECT * FROM score_sheets WHERE entry_id = $1"#)
            .bind(entry_id)
            .fetch_optional(pool)
            .await?;

        Ok(sheet)
    }

    /// Sheets of a brewer's entries in a contest
    pub async fn list_for_brewer(pool: &PgPool, contest_id: &Uuid, brewer_id: &Uuid) -> AppResult<Vec<ScoreSheet>> {
        let sheets = sqlx::query_as::<_, ScoreSheet>(
            r#"
            SELECT s.* FROM score_sheets s
            JOIN entries e ON e.id = s.entry_id
            JOIN categories c ON c.id = e.category_id
            WHERE c.contest_id = $1 AND e.brewer_id = $2
            ORDER BY e.code
            "#,
        )
        .bind(contest_id)
        .bind(brewer_id)
        .fetch_all(pool)
        .await?;

        Ok(sheets)
    }
}
