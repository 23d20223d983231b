//! Contest service

use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::{
    constants::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE},
    db::repositories::{ContestRepository, EntryRepository, StyleRepository},
    error::{AppError, AppResult},
    handlers::contests::{
        request::{CategoryRequest, ContestRequest},
        response::{
            CategoryResponse, ContestListResponse, ContestResponse, ContestSummary,
            FinalRoundResponse,
        },
    },
    middleware::AuthenticatedUser,
    models::{final_round_done, Category, Contest},
    utils::{now_utc, slugify, validate_currency},
};

/// Contest service for business logic
fn ensure_category_removable(frozen_entries: i64) -> AppResult<()> {
    if frozen_entries > 0 {
        return Err(AppError::Conflict(format!(
            "Category has {frozen_entries} paid, received or pending entries"
        )));
    }
    Ok(())
}

pub struct ContestService;

impl ContestService {
    /// Find contest by slug, published or not
    pub async fn find_by_slug(pool: &PgPool, slug: &str) -> AppResult<Contest> {
        ContestRepository::find_by_slug(pool, slug)
            .await?
            .ok_or_else(|| AppError::NotFound("Contest not found".to_string()))
    }

    pub async fn get_by_id(pool: &PgPool, id: &Uuid) -> AppResult<Contest> {
        ContestRepository::find_by_id(pool, id)
            .await?
            .ok_or_else(|| AppError::NotFound("Contest not found".to_string()))
    }

    /// Contest as seen by the caller; unpublished contests exist only for staff
    pub async fn find_visible(pool: &PgPool, slug: &str, user: Option<&AuthenticatedUser>) -> AppResult<Contest> {
        let contest = Self::find_by_slug(pool, slug).await?;
        if contest.is_published(now_utc()) || user.is_some_and(AuthenticatedUser::is_staff) {
            Ok(contest)
        } else {
            Err(AppError::NotFound("Contest not found".to_string()))
        }
    }

    pub async fn get_contest(pool: &PgPool, slug: &str, user: Option<&AuthenticatedUser>) -> AppResult<ContestResponse> {
        let contest = Self::find_visible(pool, slug, user).await?;
        Self::to_contest_response(pool, contest, user.map(|u| &u.id)).await
    }

    /// Published contests, newest registration first
    pub async fn list_published(pool: &PgPool, page: Option<u32>, per_page: Option<u32>) -> AppResult<ContestListResponse> {
        let (page, per_page) = Self::pagination(page, per_page);
        let offset = ((page - 1) * per_page) as i64;

        let (contests, total) = ContestRepository::list_published(pool, offset, per_page as i64).await?;
        Ok(Self::to_list_response(contests, total, page, per_page))
    }

    /// Every contest, for staff
    pub async fn list_all(pool: &PgPool, page: Option<u32>, per_page: Option<u32>) -> AppResult<ContestListResponse> {
        let (page, per_page) = Self::pagination(page, per_page);
        let offset = ((page - 1) * per_page) as i64;

        let (contests, total) = ContestRepository::list_all(pool, offset, per_page as i64).await?;
        Ok(Self::to_list_response(contests, total, page, per_page))
    }

    /// Create a contest with its settings and payment methods
    pub async fn create_contest(pool: &PgPool, created_by: &Uuid, payload: ContestRequest) -> AppResult<ContestResponse> {
        let slug = Self::slug_for(&payload)?;

        let mut tx = pool.begin().await?;
        let mut contest = ContestRepository::create(&mut *tx, &payload.title, &slug, created_by).await?;
        Self::apply_settings(&mut contest, &payload, slug)?;
        let contest = ContestRepository::update(&mut *tx, &contest).await?;
        Self::write_payment_methods(&mut tx, &contest.id, &payload.payment_methods).await?;
        tx.commit().await?;

        info!(contest_id = %contest.id, slug = %contest.slug, "Contest created");
        Self::to_contest_response(pool, contest, None).await
    }

    /// Replace a contest's settings
    pub async fn update_contest(pool: &PgPool, slug: &str, payload: ContestRequest) -> AppResult<ContestResponse> {
        let new_slug = Self::slug_for(&payload)?;

        let mut tx = pool.begin().await?;
        let found = Self::find_by_slug(pool, slug).await?;
        let mut contest = ContestRepository::lock(&mut *tx, &found.id)
            .await?
            .ok_or_else(|| AppError::NotFound("Contest not found".to_string()))?;

        Self::apply_settings(&mut contest, &payload, new_slug)?;
        let contest = ContestRepository::update(&mut *tx, &contest).await?;
        Self::write_payment_methods(&mut tx, &contest.id, &payload.payment_methods).await?;
        tx.commit().await?;

        info!(contest_id = %contest.id, "Contest updated");
        Self::to_contest_response(pool, contest, None).await
    }

    /// Copy request fields onto the contest and validate the combination
    fn apply_settings(contest: &mut Contest, payload: &ContestRequest, slug: String) -> AppResult<()> {
        validate_currency(&payload.entry_fee_currency).map_err(|m| AppError::InvalidField {
            field: "entry_fee_currency".to_string(),
            message: m.to_string(),
        })?;
        if payload.entry_fee_amount < Decimal::ZERO {
            return Err(AppError::InvalidField {
                field: "entry_fee_amount".to_string(),
                message: "Entry fee cannot be negative".to_string(),
            });
        }
        if payload.discount_rate < Decimal::ZERO || payload.discount_rate > Decimal::ONE_HUNDRED {
            return Err(AppError::InvalidField {
                field: "discount_rate".to_string(),
                message: "Discount must be between 0 and 100 percent".to_string(),
            });
        }

        contest.title = payload.title.trim().to_string();
        contest.slug = slug;
        contest.description = payload.description.clone();
        contest.rules = payload.rules.clone();
        contest.entry_fee_amount = payload.entry_fee_amount;
        contest.entry_fee_currency = payload.entry_fee_currency.clone();
        contest.payment_transfer_info = payload.payment_transfer_info.clone();
        contest.discount_rate = payload.discount_rate;
        contest.entry_global_limit = payload.entry_global_limit;
        contest.entry_user_limit = payload.entry_user_limit;
        contest.delivery_address = payload.delivery_address.clone();
        contest.judge_registration_date_from = payload.judge_registration_date_from;
        contest.judge_registration_date_to = payload.judge_registration_date_to;
        contest.registration_date_from = payload.registration_date_from;
        contest.registration_date_to = payload.registration_date_to;
        contest.delivery_date_from = payload.delivery_date_from;
        contest.delivery_date_to = payload.delivery_date_to;
        contest.judging_date_from = payload.judging_date_from;
        contest.judging_date_to = payload.judging_date_to;
        contest.competition_is_published = payload.competition_is_published;
        contest.competition_autopublish_at = payload.competition_autopublish_at;
        contest.result_is_published = payload.result_is_published;
        contest.result_autopublish_at = payload.result_autopublish_at;
        contest.is_judging_eliminations = payload.is_judging_eliminations;
        contest.is_judging_finals = payload.is_judging_finals;
        contest.is_judging_bos = payload.is_judging_bos;

        contest
            .validate_settings(&payload.payment_methods)
            .map_err(|m| AppError::Validation(m.to_string()))
    }

    fn slug_for(payload: &ContestRequest) -> AppResult<String> {
        let slug = match payload.slug.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            Some(slug) => slugify(slug),
            None => slugify(&payload.title),
        };
        if slug.is_empty() {
            return Err(AppError::InvalidField {
                field: "slug".to_string(),
                message: "Slug must contain letters or digits".to_string(),
            });
        }
        Ok(slug)
    }

    async fn write_payment_methods(conn: &mut sqlx::PgConnection, contest_id: &Uuid, codes: &[String]) -> AppResult<()> {
        let methods = ContestRepository::find_methods_by_codes(&mut *conn, codes).await?;
        if let Some(unknown) = codes.iter().find(|code| !methods.iter().any(|m| &m.code == *code)) {
            return Err(AppError::InvalidField {
                field: "payment_methods".to_string(),
                message: format!("Unknown payment method: {unknown}"),
            });
        }

        let ids: Vec<Uuid> = methods.iter().map(|m| m.id).collect();
        ContestRepository::set_payment_methods(conn, contest_id, &ids).await
    }

    // Categories

    /// Categories of a visible contest with the caller's occupancy
    pub async fn list_categories(
        pool: &PgPool,
        slug: &str,
        user: Option<&AuthenticatedUser>,
    ) -> AppResult<Vec<CategoryResponse>> {
        let contest = Self::find_visible(pool, slug, user).await?;
        let categories = ContestRepository::list_categories(pool, &contest.id, user.map(|u| &u.id)).await?;
        Ok(categories.into_iter().map(CategoryResponse::from).collect())
    }

    pub async fn add_category(pool: &PgPool, slug: &str, payload: CategoryRequest) -> AppResult<Category> {
        let contest = Self::find_by_slug(pool, slug).await?;
        let style = StyleRepository::find_by_id(pool, &payload.style_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Style not found".to_string()))?;
        if !style.show {
            return Err(AppError::InvalidField {
                field: "style_id".to_string(),
                message: "This style is not available for competitions".to_string(),
            });
        }

        let category = ContestRepository::create_category(
            pool,
            &contest.id,
            &style.id,
            payload.entries_limit.unwrap_or(1),
        )
        .await
        .map_err(|e| match e {
            AppError::AlreadyExists(_) => {
                AppError::AlreadyExists("This style is already a category of the contest".to_string())
            }
            other => other,
        })?;

        info!(contest_id = %contest.id, category_id = %category.id, style = %style.slug, "Category added");
        Ok(category)
    }

    pub async fn update_category(pool: &PgPool, id: &Uuid, entries_limit: i32) -> AppResult<Category> {
        Self::find_category(pool, id).await?;
        ContestRepository::update_category_limit(pool, id, entries_limit).await
    }

    /// Remove a category together with its entries, unless any of them is
    /// paid, received or waiting on a payment
    pub async fn remove_category(pool: &PgPool, id: &Uuid) -> AppResult<()> {
        let category = Self::find_category(pool, id).await?;

        let mut tx = pool.begin().await?;
        ContestRepository::lock(&mut *tx, &category.contest_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Contest not found".to_string()))?;
        let frozen = EntryRepository::count_frozen_in_category(&mut *tx, id).await?;
        ensure_category_removable(frozen)?;

        if !ContestRepository::delete_category(&mut *tx, id).await? {
            return Err(AppError::NotFound("Category not found".to_string()));
        }
        tx.commit().await?;

        info!(category_id = %id, "Category removed");
        Ok(())
    }

    pub async fn find_category(pool: &PgPool, id: &Uuid) -> AppResult<Category> {
        ContestRepository::find_category(pool, id)
            .await?
            .ok_or_else(|| AppError::NotFound("Category not found".to_string()))
    }

    pub async fn final_round_status(pool: &PgPool, id: &Uuid) -> AppResult<FinalRoundResponse> {
        Self::find_category(pool, id).await?;
        let (finalists, placed) = ContestRepository::final_round_counts(pool, id).await?;

        Ok(FinalRoundResponse {
            category_id: *id,
            finalists,
            placed,
            done: final_round_done(placed, finalists),
        })
    }

    // Response builders

    async fn to_contest_response(pool: &PgPool, contest: Contest, user_id: Option<&Uuid>) -> AppResult<ContestResponse> {
        let now = now_utc();
        let today = now.date_naive();

        let payment_methods = ContestRepository::payment_methods(pool, &contest.id).await?;
        let total = ContestRepository::count_entries(pool, &contest.id).await?;
        let global_limit_left = contest.global_limit_left(total);

        let user_limit_left = match user_id {
            Some(user_id) if contest.entry_user_limit.is_some() => {
                let stats = EntryRepository::stats(pool, &contest.id, Some(user_id)).await?;
                contest.user_limit_left(stats.total)
            }
            _ => None,
        };

        Ok(ContestResponse {
            payment_methods,
            is_published: contest.is_published(now),
            is_registrable: contest.is_registrable(now, global_limit_left),
            can_judges_register: contest.can_judges_register(today),
            show_results: contest.show_results(now),
            entries_editable: contest.entries_editable(today),
            global_limit_left,
            user_limit_left,
            contest,
        })
    }

    fn to_list_response(contests: Vec<Contest>, total: i64, page: u32, per_page: u32) -> ContestListResponse {
        let now = now_utc();
        let contests = contests
            .into_iter()
            .map(|c| ContestSummary {
                show_results: c.show_results(now),
                id: c.id,
                title: c.title,
                slug: c.slug,
                registration_date_from: c.registration_date_from,
                registration_date_to: c.registration_date_to,
                judging_date_from: c.judging_date_from,
                judging_date_to: c.judging_date_to,
            })
            .collect();

        ContestListResponse {
            contests,
            total,
            page,
            per_page,
        }
    }

    fn pagination(page: Option<u32>, per_page: Option<u32>) -> (u32, u32) {
        let page = page.unwrap_or(1).max(1);
        let per_page = per_page.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
        (page, per_page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::models::contest::tests::contest;

    fn request(value: serde_json::Value) -> ContestRequest {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_category_with_frozen_entries_stays() {
        assert!(ensure_category_removable(0).is_ok());
        assert!(matches!(ensure_category_removable(2), Err(AppError::Conflict(_))));
    }

    #[test]
    fn test_apply_settings_requires_transfer_info() {
        let mut c = contest();
        let payload = request(serde_json::json!({
            "title": "Mead Cup",
            "payment_methods": ["transfer"]
        }));
        let err = ContestService::apply_settings(&mut c, &payload, "mead-cup".to_string()).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_apply_settings_copies_fields() {
        let mut c = contest();
        let payload = request(serde_json::json!({
            "title": " Mead Cup 2025 ",
            "entry_fee_amount": "45.00",
            "discount_rate": "10",
            "entry_user_limit": 6,
            "registration_date_from": "2025-03-01",
            "registration_date_to": "2025-04-30",
            "payment_methods": ["payu"]
        }));
        ContestService::apply_settings(&mut c, &payload, "mead-cup-2025".to_string()).unwrap();
        assert_eq!(c.title, "Mead Cup 2025");
        assert_eq!(c.entry_fee_currency, "PLN");
        assert_eq!(c.entry_fee_amount, Decimal::new(4500, 2));
        assert_eq!(c.entry_user_limit, Some(6));
        assert!(c.registration_date_to.is_some());
    }

    #[test]
    fn test_apply_settings_rejects_discount_over_100() {
        let mut c = contest();
        let payload = request(serde_json::json!({ "title": "Cup", "discount_rate": "120" }));
        let err = ContestService::apply_settings(&mut c, &payload, "cup".to_string()).unwrap_err();
        assert_eq!(err.field(), Some("discount_rate"));
    }

    #[test]
    fn test_slug_falls_back_to_title() {
        let payload = request(serde_json::json!({ "title": "Miodowy Konkurs" }));
        assert_eq!(ContestService::slug_for(&payload).unwrap(), "miodowy-konkurs");
    }

    #[test]
    fn test_pagination_bounds() {
        assert_eq!(ContestService::pagination(None, None), (1, DEFAULT_PAGE_SIZE));
        assert_eq!(ContestService::pagination(Some(0), Some(1000)), (1, MAX_PAGE_SIZE));
    }
}
