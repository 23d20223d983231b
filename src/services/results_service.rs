//! Scoring, final ranking and published results

use std::collections::BTreeMap;

use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::{
    constants::score_limits,
    db::repositories::{
        entry_repo::PlacedEntry, score_sheet_repo::ScoreFields, ContestRepository, EntryRepository,
        JudgeRepository, ScoreSheetRepository,
    },
    error::{AppError, AppResult},
    handlers::results::{
        request::ScoreSheetRequest,
        response::{CategoryResults, ResultsResponse},
    },
    middleware::AuthenticatedUser,
    models::{Contest, ScoreSheet},
    services::ContestService,
    utils::{now_utc, sanitize_string},
};

/// Every score must fit between zero and its section's maximum
fn check_scores(sheet: &ScoreSheetRequest) -> AppResult<()> {
    let sections = [
        ("appearance_score", sheet.appearance_score, score_limits::APPEARANCE),
        ("aroma_score", sheet.aroma_score, score_limits::AROMA),
        ("flavor_score", sheet.flavor_score, score_limits::FLAVOR),
        ("finish_score", sheet.finish_score, score_limits::FINISH),
        ("overall_score", sheet.overall_score, score_limits::OVERALL),
    ];
    for (field, score, max) in sections {
        if !(0..=max).contains(&score) {
            return Err(AppError::InvalidField {
                field: field.to_string(),
                message: format!("Score must be between 0 and {max}"),
            });
        }
    }
    Ok(())
}

fn judging_in_progress(contest: &Contest) -> bool {
    contest.is_judging_eliminations || contest.is_judging_finals || contest.is_judging_bos
}

fn ensure_results_shown(contest: &Contest) -> AppResult<()> {
    if contest.show_results(now_utc()) {
        Ok(())
    } else {
        Err(AppError::NotFound("Results are not published yet".to_string()))
    }
}

/// Group placed entries per category, keeping the repository order inside
fn group_results(contest: &Contest, placed: Vec<PlacedEntry>) -> ResultsResponse {
    let best_of_show = contest
        .bos_entry_id
        .and_then(|id| placed.iter().find(|e| e.id == id).cloned());

    let mut by_category: BTreeMap<(String, Uuid), Vec<PlacedEntry>> = BTreeMap::new();
    for entry in placed {
        by_category
            .entry((entry.style_name.clone(), entry.category_id))
            .or_default()
            .push(entry);
    }

    ResultsResponse {
        contest_id: contest.id,
        categories: by_category
            .into_iter()
            .map(|((style_name, category_id), entries)| CategoryResults {
                category_id,
                style_name,
                entries,
            })
            .collect(),
        best_of_show,
    }
}

pub struct ResultsService;

impl ResultsService {
    /// Create or overwrite the sheet of an entry
    pub async fn save_score_sheet(
        pool: &PgPool,
        user: &AuthenticatedUser,
        entry_id: &Uuid,
        payload: &ScoreSheetRequest,
    ) -> AppResult<ScoreSheet> {
        check_scores(payload)?;

        let contest_id = EntryRepository::contest_id_of(pool, entry_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Entry not found".to_string()))?;
        let contest = ContestService::get_by_id(pool, &contest_id).await?;

        if !judging_in_progress(&contest) {
            return Err(AppError::Forbidden("Judging is not in progress".to_string()));
        }
        if !user.is_staff() && !JudgeRepository::is_approved_judge(pool, &user.id, &contest.id).await? {
            return Err(AppError::Forbidden("Only approved judges can score entries".to_string()));
        }

        let appearance = sanitize_string(&payload.appearance);
        let aroma = sanitize_string(&payload.aroma);
        let flavor = sanitize_string(&payload.flavor);
        let finish = sanitize_string(&payload.finish);
        let overall = sanitize_string(&payload.overall);
        let fields = ScoreFields {
            final_round: payload.final_round,
            appearance: &appearance,
            appearance_score: payload.appearance_score,
            aroma: &aroma,
            aroma_score: payload.aroma_score,
            flavor: &flavor,
            flavor_score: payload.flavor_score,
            finish: &finish,
            finish_score: payload.finish_score,
            overall: &overall,
            overall_score: payload.overall_score,
        };

        let sheet = ScoreSheetRepository::upsert(pool, entry_id, &user.id, &fields).await?;
        info!(
            entry_id = %entry_id,
            judge_id = %user.id,
            total = sheet.total_points(),
            final_round = sheet.final_round,
            "Score sheet saved"
        );
        Ok(sheet)
    }

    /// Sheet of one entry: judges and staff while judging, the brewer once
    /// results are out
    pub async fn get_score_sheet(pool: &PgPool, user: &AuthenticatedUser, entry_id: &Uuid) -> AppResult<ScoreSheet> {
        let entry = EntryRepository::find_by_id(pool, entry_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Entry not found".to_string()))?;
        let contest_id = EntryRepository::contest_id_of(pool, entry_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Entry not found".to_string()))?;
        let contest = ContestService::get_by_id(pool, &contest_id).await?;

        let allowed = user.is_staff()
            || (entry.brewer_id == user.id && contest.show_results(now_utc()))
            || JudgeRepository::is_approved_judge(pool, &user.id, &contest.id).await?;
        if !allowed {
            return Err(AppError::NotFound("Score sheet not found".to_string()));
        }

        ScoreSheetRepository::find_by_entry(pool, entry_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Score sheet not found".to_string()))
    }

    /// Staff pick the Best of Show among category winners
    pub async fn set_best_of_show(pool: &PgPool, slug: &str, entry_id: Option<Uuid>) -> AppResult<Contest> {
        let contest = ContestService::find_by_slug(pool, slug).await?;

        if let Some(id) = entry_id {
            let entry = EntryRepository::find_by_id(pool, &id).await?;
            let in_contest = EntryRepository::contest_id_of(pool, &id).await? == Some(contest.id);
            if !in_contest || entry.is_none_or(|e| e.place != 1) {
                return Err(AppError::InvalidField {
                    field: "entry_id".to_string(),
                    message: "Best of Show must be chosen among first places".to_string(),
                });
            }
        }

        let contest = ContestRepository::set_bos_entry(pool, &contest.id, entry_id).await?;
        info!(contest_id = %contest.id, bos_entry_id = ?entry_id, "Best of Show set");
        Ok(contest)
    }

    /// Published ranking of a contest
    pub async fn results(pool: &PgPool, slug: &str, user: Option<&AuthenticatedUser>) -> AppResult<ResultsResponse> {
        let contest = ContestService::find_visible(pool, slug, user).await?;
        if !user.is_some_and(AuthenticatedUser::is_staff) {
            ensure_results_shown(&contest)?;
        }

        let placed = EntryRepository::list_placed(pool, &contest.id).await?;
        Ok(group_results(&contest, placed))
    }

    /// The caller's own sheets once results are shown
    pub async fn my_score_sheets(pool: &PgPool, user: &AuthenticatedUser, slug: &str) -> AppResult<Vec<ScoreSheet>> {
        let contest = ContestService::find_visible(pool, slug, Some(user)).await?;
        ensure_results_shown(&contest)?;
        ScoreSheetRepository::list_for_brewer(pool, &contest.id, &user.id).await
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::models::contest::tests::contest;

    fn sheet() -> ScoreSheetRequest {
        ScoreSheetRequest {
            final_round: false,
            appearance: String::new(),
            appearance_score: 12,
            aroma: String::new(),
            aroma_score: 30,
            flavor: String::new(),
            flavor_score: 32,
            finish: String::new(),
            finish_score: 14,
            overall: String::new(),
            overall_score: 12,
        }
    }

    fn placed(category_id: Uuid, style: &str, place: i32) -> PlacedEntry {
        PlacedEntry {
            id: Uuid::new_v4(),
            code: 1000 + place,
            category_id,
            style_name: style.to_string(),
            name: format!("Mead {place}"),
            place,
            brewer_first_name: "Jan".to_string(),
            brewer_last_name: "Kowalski".to_string(),
            total_points: Some(80),
        }
    }

    #[test]
    fn test_maximum_scores_accepted() {
        tokio_test::assert_ok!(check_scores(&sheet()));
    }

    #[test]
    fn test_score_over_limit_names_field() {
        let mut s = sheet();
        s.flavor_score = 33;
        assert_eq!(check_scores(&s).unwrap_err().field(), Some("flavor_score"));

        let mut s = sheet();
        s.overall_score = -1;
        assert_eq!(check_scores(&s).unwrap_err().field(), Some("overall_score"));
    }

    #[test]
    fn test_judging_flags() {
        let mut c = contest();
        c.is_judging_eliminations = false;
        c.is_judging_finals = false;
        c.is_judging_bos = false;
        assert!(!judging_in_progress(&c));
        c.is_judging_bos = true;
        assert!(judging_in_progress(&c));
    }

    #[test]
    fn test_results_hidden_until_published() {
        let mut c = contest();
        c.result_is_published = false;
        c.result_autopublish_at = Some(now_utc() + Duration::days(1));
        assert!(ensure_results_shown(&c).is_err());

        c.result_autopublish_at = Some(now_utc() - Duration::minutes(1));
        tokio_test::assert_ok!(ensure_results_shown(&c));
    }

    #[test]
    fn test_results_grouped_per_category_with_bos() {
        let melomel = Uuid::new_v4();
        let braggot = Uuid::new_v4();
        let winner = placed(melomel, "Melomel", 1);
        let entries = vec![
            placed(braggot, "Braggot", 1),
            placed(braggot, "Braggot", 2),
            winner.clone(),
        ];

        let mut c = contest();
        c.bos_entry_id = Some(winner.id);
        let results = group_results(&c, entries);

        assert_eq!(results.categories.len(), 2);
        assert_eq!(results.categories[0].style_name, "Braggot");
        assert_eq!(results.categories[0].entries.len(), 2);
        assert_eq!(results.categories[1].entries[0].id, winner.id);
        assert_eq!(results.best_of_show.map(|e| e.id), Some(winner.id));
    }
}
