//! Entry service
//!
//! Every write runs in a transaction that first locks the contest row, so two
//! concurrent registrations in the same contest see each other's counts.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};
use tracing::info;
use uuid::Uuid;

use crate::{
    constants::{MAX_ALCOHOL_CONTENT_HUNDREDTHS, MIN_ALCOHOL_CONTENT_HUNDREDTHS},
    db::repositories::{
        entry_repo::OccupancyCounts, ContestRepository, EntryRepository, PaymentRepository, StyleRepository,
    },
    error::{AppError, AppResult},
    handlers::entries::{request::EntryRequest, response::EntryListResponse},
    middleware::AuthenticatedUser,
    models::{Category, Contest, Entry, EntryStats, Style},
    rules::{
        capacity::{altered_fields, can_be_deleted, check_limits, is_late_change_allowed},
        EntryFields, EntryWrite, Occupancy,
    },
    services::{ContestService, UserService},
    utils::{now_utc, sanitize_string},
};

/// Caps of a contest and category combined with the counts read under lock
fn occupancy(contest: &Contest, category: &Category, counts: OccupancyCounts) -> Occupancy {
    Occupancy {
        category_limit: i64::from(category.entries_limit),
        user_in_category: counts.user_in_category,
        global_limit: contest.entry_global_limit.map(i64::from),
        contest_total: counts.contest_total,
        user_limit: contest.entry_user_limit.map(i64::from),
        user_in_contest: counts.user_in_contest,
    }
}

/// Styles that ask for extra information get it
fn ensure_extra_info(style: &Style, extra_info: &str) -> AppResult<()> {
    if style.extra_info_is_required && extra_info.trim().is_empty() {
        return Err(AppError::InvalidField {
            field: "extra_info".to_string(),
            message: format!("This style requires extra information: {}", style.extra_info_hint),
        });
    }
    Ok(())
}

/// Alcohol content must fit the stored NUMERIC(4, 2) after rounding
fn ensure_alcohol_content(value: Option<Decimal>) -> AppResult<()> {
    let Some(value) = value else {
        return Ok(());
    };
    let min = Decimal::new(MIN_ALCOHOL_CONTENT_HUNDREDTHS, 2);
    let max = Decimal::new(MAX_ALCOHOL_CONTENT_HUNDREDTHS, 2);
    if (min..=max).contains(&value.round_dp(2)) {
        Ok(())
    } else {
        Err(AppError::InvalidField {
            field: "alcohol_content".to_string(),
            message: format!("Alcohol content must be between {min} and {max}"),
        })
    }
}

/// Paid or received entries are frozen, and so are entries a payment is pending for
fn ensure_deletable(entry: &Entry, in_open_payment: bool) -> AppResult<()> {
    if !can_be_deleted(entry.is_paid, entry.is_received) {
        return Err(AppError::EntryLocked);
    }
    if in_open_payment {
        return Err(AppError::Conflict("Entry has a payment in progress".to_string()));
    }
    Ok(())
}

/// Entries can be modified while registration runs; afterwards only the place
fn ensure_editable(contest: &Contest, old: &EntryFields, new: &EntryFields, today: NaiveDate) -> AppResult<()> {
    if contest.entries_editable(today) {
        return Ok(());
    }
    if is_late_change_allowed(&altered_fields(old, new)) {
        Ok(())
    } else {
        Err(AppError::EditWindowClosed)
    }
}

fn ensure_owner(entry: &Entry, user: &AuthenticatedUser) -> AppResult<()> {
    if entry.brewer_id == user.id || user.is_staff() {
        Ok(())
    } else {
        Err(AppError::NotFound("Entry not found".to_string()))
    }
}

impl From<&EntryRequest> for EntryFields {
    fn from(payload: &EntryRequest) -> Self {
        Self {
            category_id: payload.category_id,
            name: sanitize_string(&payload.name),
            sweetness: payload.sweetness,
            carbonation: payload.carbonation,
            extra_info: sanitize_string(&payload.extra_info),
            alcohol_content: payload.alcohol_content,
            place: 0,
        }
    }
}

pub struct EntryService;

impl EntryService {
    /// Register a new entry for the caller
    pub async fn create_entry(
        pool: &PgPool,
        user: &AuthenticatedUser,
        slug: &str,
        payload: &EntryRequest,
    ) -> AppResult<Entry> {
        UserService::require_complete_profile(pool, &user.id).await?;
        let contest = ContestService::find_visible(pool, slug, Some(user)).await?;
        let fields = EntryFields::from(payload);
        ensure_alcohol_content(fields.alcohol_content)?;

        let mut tx = pool.begin().await?;
        let contest = ContestRepository::lock(&mut *tx, &contest.id)
            .await?
            .ok_or_else(|| AppError::NotFound("Contest not found".to_string()))?;

        let now = now_utc();
        if !contest.is_published(now) || !contest.is_registration_window_open(now.date_naive()) {
            return Err(AppError::Forbidden("Registration is closed".to_string()));
        }

        let category = Self::category_in_contest(&mut tx, &contest, &fields.category_id).await?;
        let style = Self::style_of(pool, &category).await?;
        ensure_extra_info(&style, &fields.extra_info)?;

        let counts = EntryRepository::occupancy(&mut *tx, &contest.id, &category.id, &user.id).await?;
        check_limits(EntryWrite::Insert, &occupancy(&contest, &category, counts))?;

        let code = EntryRepository::next_code(&mut tx).await?;
        let entry = EntryRepository::create(&mut *tx, code, &user.id, &fields).await?;
        tx.commit().await?;

        info!(entry_id = %entry.id, code = entry.code, contest_id = %contest.id, brewer_id = %user.id, "Entry registered");
        Ok(entry)
    }

    /// Edit an entry on behalf of its brewer; the place is never taken from the request
    pub async fn update_entry(
        pool: &PgPool,
        user: &AuthenticatedUser,
        id: &Uuid,
        payload: &EntryRequest,
    ) -> AppResult<Entry> {
        let mut fields = EntryFields::from(payload);
        ensure_alcohol_content(fields.alcohol_content)?;
        Self::write(pool, user, id, |old| {
            fields.place = old.place;
            fields
        })
        .await
    }

    /// Staff ranking in the category final
    pub async fn set_place(pool: &PgPool, user: &AuthenticatedUser, id: &Uuid, place: i32) -> AppResult<Entry> {
        user.require_staff()?;
        Self::write(pool, user, id, |old| EntryFields {
            place,
            ..old.clone()
        })
        .await
    }

    /// Shared update path: lock, diff against the stored row, re-check caps
    async fn write(
        pool: &PgPool,
        user: &AuthenticatedUser,
        id: &Uuid,
        build: impl FnOnce(&EntryFields) -> EntryFields,
    ) -> AppResult<Entry> {
        let contest_id = EntryRepository::contest_id_of(pool, id)
            .await?
            .ok_or_else(|| AppError::NotFound("Entry not found".to_string()))?;

        let mut tx = pool.begin().await?;
        let contest = ContestRepository::lock(&mut *tx, &contest_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Contest not found".to_string()))?;
        let existing = EntryRepository::find_for_update(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::NotFound("Entry not found".to_string()))?;
        ensure_owner(&existing, user)?;

        let old = EntryFields::from(&existing);
        let new = build(&old);
        if old == new {
            return Ok(existing);
        }
        ensure_editable(&contest, &old, &new, now_utc().date_naive())?;

        let category_changed = old.category_id != new.category_id;
        if category_changed || old.extra_info != new.extra_info {
            let category = Self::category_in_contest(&mut tx, &contest, &new.category_id).await?;
            let style = Self::style_of(pool, &category).await?;
            ensure_extra_info(&style, &new.extra_info)?;

            if category_changed {
                let counts =
                    EntryRepository::occupancy(&mut *tx, &contest.id, &category.id, &existing.brewer_id).await?;
                check_limits(
                    EntryWrite::Update { category_changed },
                    &occupancy(&contest, &category, counts),
                )?;
            }
        }

        let entry = EntryRepository::update(&mut *tx, id, &new).await?;
        tx.commit().await?;

        info!(entry_id = %entry.id, code = entry.code, "Entry updated");
        Ok(entry)
    }

    /// Delete an entry unless it has been paid for, delivered or put in a payment
    pub async fn delete_entry(pool: &PgPool, user: &AuthenticatedUser, id: &Uuid) -> AppResult<()> {
        let contest_id = EntryRepository::contest_id_of(pool, id)
            .await?
            .ok_or_else(|| AppError::NotFound("Entry not found".to_string()))?;

        let mut tx = pool.begin().await?;
        // Payment creation holds the same lock while it checks for open payments
        ContestRepository::lock(&mut *tx, &contest_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Contest not found".to_string()))?;
        let entry = EntryRepository::find_for_update(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::NotFound("Entry not found".to_string()))?;
        ensure_owner(&entry, user)?;

        let in_open_payment = !PaymentRepository::entries_in_open_payments(&mut *tx, &[entry.id])
            .await?
            .is_empty();
        ensure_deletable(&entry, in_open_payment)?;

        EntryRepository::delete(&mut *tx, id).await?;
        tx.commit().await?;

        info!(entry_id = %id, code = entry.code, "Entry deleted");
        Ok(())
    }

    pub async fn get_entry(pool: &PgPool, user: &AuthenticatedUser, id: &Uuid) -> AppResult<Entry> {
        let entry = EntryRepository::find_by_id(pool, id)
            .await?
            .ok_or_else(|| AppError::NotFound("Entry not found".to_string()))?;
        ensure_owner(&entry, user)?;
        Ok(entry)
    }

    /// The caller's entries in a contest with counters
    pub async fn list_mine(pool: &PgPool, user: &AuthenticatedUser, slug: &str) -> AppResult<EntryListResponse> {
        let contest = ContestService::find_visible(pool, slug, Some(user)).await?;
        let entries = EntryRepository::list_by_brewer(pool, &contest.id, &user.id).await?;
        let stats = EntryRepository::stats(pool, &contest.id, Some(&user.id)).await?;

        Ok(EntryListResponse {
            user_limit_left: contest.user_limit_left(stats.total),
            entries,
            stats,
        })
    }

    /// Contest-wide counters for staff
    pub async fn contest_stats(pool: &PgPool, slug: &str) -> AppResult<EntryStats> {
        let contest = ContestService::find_by_slug(pool, slug).await?;
        EntryRepository::stats(pool, &contest.id, None).await
    }

    /// Mark delivered entries received
    pub async fn mark_received(pool: &PgPool, slug: &str, ids: &[Uuid]) -> AppResult<u64> {
        let contest = ContestService::find_by_slug(pool, slug).await?;
        let updated = EntryRepository::mark_received(pool, &contest.id, ids).await?;
        info!(contest_id = %contest.id, requested = ids.len(), updated, "Entries received");
        Ok(updated)
    }

    async fn category_in_contest(conn: &mut PgConnection, contest: &Contest, id: &Uuid) -> AppResult<Category> {
        ContestRepository::find_category(conn, id)
            .await?
            .filter(|category| category.contest_id == contest.id)
            .ok_or_else(|| AppError::InvalidField {
                field: "category_id".to_string(),
                message: "Category does not belong to this contest".to_string(),
            })
    }

    async fn style_of(pool: &PgPool, category: &Category) -> AppResult<Style> {
        StyleRepository::find_by_id(pool, &category.style_id)
            .await?
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("category {} without style", category.id)))
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use rust_decimal::Decimal;

    use super::*;
    use crate::{
        constants::roles,
        models::{contest::tests::contest, Carbonation, Sweetness},
        rules::LimitViolation,
    };

    fn category(limit: i32) -> Category {
        Category {
            id: Uuid::new_v4(),
            contest_id: Uuid::new_v4(),
            style_id: Uuid::new_v4(),
            entries_limit: limit,
            created_at: Utc::now(),
        }
    }

    fn style(required: bool) -> Style {
        Style {
            id: Uuid::new_v4(),
            name: "Melomel".to_string(),
            slug: "melomel".to_string(),
            show: true,
            extra_info_is_required: required,
            extra_info_hint: "Fruit used".to_string(),
            description: String::new(),
            created_by: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn fields() -> EntryFields {
        EntryFields {
            category_id: Uuid::new_v4(),
            name: "Trójniak".to_string(),
            sweetness: Sweetness::Medium,
            carbonation: Carbonation::Still,
            extra_info: String::new(),
            alcohol_content: Some(Decimal::new(140, 1)),
            place: 0,
        }
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 5, d).unwrap()
    }

    #[test]
    fn test_occupancy_takes_caps_from_contest_and_category() {
        let mut c = contest();
        c.entry_global_limit = Some(100);
        c.entry_user_limit = Some(5);
        let counts = OccupancyCounts {
            user_in_category: 1,
            contest_total: 100,
            user_in_contest: 2,
        };

        let occ = occupancy(&c, &category(2), counts);
        assert_eq!(occ.category_limit, 2);
        assert_eq!(
            check_limits(EntryWrite::Insert, &occ),
            Err(LimitViolation::Global { limit: 100 })
        );
    }

    #[test]
    fn test_extra_info_required_by_style() {
        let err = ensure_extra_info(&style(true), "  ").unwrap_err();
        assert_eq!(err.field(), Some("extra_info"));
        assert!(ensure_extra_info(&style(true), "Raspberries").is_ok());
        assert!(ensure_extra_info(&style(false), "").is_ok());
    }

    #[test]
    fn test_after_deadline_only_place_changes() {
        let mut c = contest();
        c.registration_date_to = Some(day(10));
        let old = fields();

        let mut renamed = old.clone();
        renamed.name = "Dwójniak".to_string();
        assert!(ensure_editable(&c, &old, &renamed, day(10)).is_ok());
        assert!(matches!(
            ensure_editable(&c, &old, &renamed, day(11)),
            Err(AppError::EditWindowClosed)
        ));

        let mut placed = old.clone();
        placed.place = 1;
        assert!(ensure_editable(&c, &old, &placed, day(11)).is_ok());

        let mut both = placed.clone();
        both.name = "Dwójniak".to_string();
        assert!(ensure_editable(&c, &old, &both, day(11)).is_err());
    }

    fn stored_entry() -> Entry {
        Entry {
            id: Uuid::new_v4(),
            code: 1000,
            category_id: Uuid::new_v4(),
            brewer_id: Uuid::new_v4(),
            name: "Półtorak".to_string(),
            sweetness: Sweetness::Sweet,
            carbonation: Carbonation::Still,
            extra_info: String::new(),
            alcohol_content: None,
            place: 0,
            is_paid: false,
            is_received: false,
            created_at: Utc::now(),
            modified_at: Utc::now(),
        }
    }

    #[test]
    fn test_alcohol_content_fits_column() {
        assert!(ensure_alcohol_content(None).is_ok());
        assert!(ensure_alcohol_content(Some(Decimal::ZERO)).is_ok());
        assert!(ensure_alcohol_content(Some(Decimal::new(140, 1))).is_ok());
        assert!(ensure_alcohol_content(Some(Decimal::new(9999, 2))).is_ok());

        for bad in [Decimal::new(150, 0), Decimal::new(-5, 1), Decimal::new(99999, 3)] {
            let err = ensure_alcohol_content(Some(bad)).unwrap_err();
            assert_eq!(err.field(), Some("alcohol_content"), "{bad}");
        }
    }

    #[test]
    fn test_entries_in_payment_cannot_be_deleted() {
        let mut entry = stored_entry();
        assert!(ensure_deletable(&entry, false).is_ok());
        assert!(matches!(ensure_deletable(&entry, true), Err(AppError::Conflict(_))));

        entry.is_received = true;
        assert!(matches!(ensure_deletable(&entry, false), Err(AppError::EntryLocked)));

        entry.is_received = false;
        entry.is_paid = true;
        assert!(matches!(ensure_deletable(&entry, false), Err(AppError::EntryLocked)));
    }

    #[test]
    fn test_foreign_entries_look_missing() {
        let entry = stored_entry();
        let stranger = AuthenticatedUser {
            id: Uuid::new_v4(),
            email: "other@example.com".to_string(),
            role: roles::PARTICIPANT.to_string(),
        };
        assert!(matches!(ensure_owner(&entry, &stranger), Err(AppError::NotFound(_))));

        let staff = AuthenticatedUser {
            role: roles::STAFF.to_string(),
            ..stranger
        };
        assert!(ensure_owner(&entry, &staff).is_ok());
    }
}
