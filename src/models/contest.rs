//! Contest model

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::{
    constants::{payment_methods, MEDAL_PLACES},
    rules::capacity,
};

/// Contest database model
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Contest {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub description: String,
    pub rules: String,
    pub entry_fee_amount: Decimal,
    pub entry_fee_currency: String,
    pub payment_transfer_info: String,
    /// Discount in percent granted to holders of a rebate code
    pub discount_rate: Decimal,
    pub entry_global_limit: Option<i32>,
    pub entry_user_limit: Option<i32>,
    pub delivery_address: String,
    pub judge_registration_date_from: Option<NaiveDate>,
    pub judge_registration_date_to: Option<NaiveDate>,
    pub registration_date_from: Option<NaiveDate>,
    pub registration_date_to: Option<NaiveDate>,
    pub delivery_date_from: Option<NaiveDate>,
    pub delivery_date_to: Option<NaiveDate>,
    pub judging_date_from: Option<NaiveDate>,
    pub judging_date_to: Option<NaiveDate>,
    pub competition_is_published: bool,
    pub competition_autopublish_at: Option<DateTime<Utc>>,
    pub result_is_published: bool,
    pub result_autopublish_at: Option<DateTime<Utc>>,
    pub is_judging_eliminations: bool,
    pub is_judging_finals: bool,
    pub is_judging_bos: bool,
    pub bos_entry_id: Option<Uuid>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Contest {
    /// The flag wins; otherwise the page goes live at the autopublish time
    pub fn is_published(&self, now: DateTime<Utc>) -> bool {
        self.competition_is_published
            || self.competition_autopublish_at.is_some_and(|at| at <= now)
    }

    /// Results are shown once flagged or after their autopublish time
    pub fn show_results(&self, now: DateTime<Utc>) -> bool {
        self.result_is_published || self.result_autopublish_at.is_some_and(|at| at <= now)
    }

    /// Entry registration window, both bounds inclusive. A contest without
    /// dates is not open for registration.
    pub fn is_registration_window_open(&self, today: NaiveDate) -> bool {
        match (self.registration_date_from, self.registration_date_to) {
            (Some(from), Some(to)) => from <= today && today <= to,
            _ => false,
        }
    }

    /// Published, inside the window and with room left in the contest
    pub fn is_registrable(&self, now: DateTime<Utc>, global_limit_left: Option<i64>) -> bool {
        self.is_published(now)
            && self.is_registration_window_open(now.date_naive())
            && global_limit_left.is_none_or(|left| left > 0)
    }

    /// Judge registration window; a missing bound leaves that side open
    pub fn can_judges_register(&self, today: NaiveDate) -> bool {
        if self.judge_registration_date_from.is_some_and(|from| today < from) {
            return false;
        }
        if self.judge_registration_date_to.is_some_and(|to| today > to) {
            return false;
        }
        true
    }

    /// Entries may be edited until the registration deadline
    pub fn entries_editable(&self, today: NaiveDate) -> bool {
        capacity::can_be_edited(self.registration_date_to, today)
    }

    /// Entries still accepted contest-wide, `None` when unlimited
    pub fn global_limit_left(&self, contest_total: i64) -> Option<i64> {
        self.entry_global_limit
            .map(|limit| capacity::limit_left(i64::from(limit), contest_total))
    }

    /// Entries a user may still add, `None` when unlimited
    pub fn user_limit_left(&self, user_total: i64) -> Option<i64> {
        self.entry_user_limit
            .map(|limit| capacity::limit_left(i64::from(limit), user_total))
    }

    /// Fee for `count` entries, discounted for rebate code holders
    pub fn entries_price(&self, count: usize, has_rebate: bool) -> Decimal {
        let gross = self.entry_fee_amount * Decimal::from(count as u64);
        let price = if has_rebate && !self.discount_rate.is_zero() {
            gross * (Decimal::ONE_HUNDRED - self.discount_rate) / Decimal::ONE_HUNDRED
        } else {
            gross
        };
        price.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    }

    /// Contest-level validation performed by staff edits
    pub fn validate_settings(&self, allowed_methods: &[String]) -> Result<(), &'static str> {
        if let (Some(from), Some(to)) = (self.registration_date_from, self.registration_date_to) {
            if from > to {
                return Err("Registration must open before it closes");
            }
        }
        if let (Some(from), Some(to)) =
            (self.judge_registration_date_from, self.judge_registration_date_to)
        {
            if from > to {
                return Err("Judge registration must open before it closes");
            }
        }
        if allowed_methods.iter().any(|m| m == payment_methods::TRANSFER)
            && self.payment_transfer_info.trim().is_empty()
        {
            return Err("You have chosen to allow transfer payments. You need to provide payment info!");
        }
        Ok(())
    }
}

/// Category: a style offered in a contest with a per-user cap
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Category {
    pub id: Uuid,
    pub contest_id: Uuid,
    pub style_id: Uuid,
    pub entries_limit: i32,
    pub created_at: DateTime<Utc>,
}

/// Category joined with its style and the caller's occupancy
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CategoryOverview {
    pub id: Uuid,
    pub contest_id: Uuid,
    pub style_id: Uuid,
    pub style_name: String,
    pub style_slug: String,
    pub extra_info_is_required: bool,
    pub extra_info_hint: String,
    pub entries_limit: i32,
    pub user_entries: i64,
}

impl CategoryOverview {
    pub fn is_full(&self) -> bool {
        self.user_entries >= i64::from(self.entries_limit)
    }
}

/// Payment method a contest may accept
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct PaymentMethod {
    pub id: Uuid,
    pub code: String,
    pub name: String,
}

/// A category final is over when all medals are handed out, when nothing
/// advanced to it, or when every finalist got a place.
pub fn final_round_done(placed: i64, finalists: i64) -> bool {
    placed == MEDAL_PLACES || finalists == 0 || finalists == placed
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    pub(crate) fn contest() -> Contest {
        let now = Utc::now();
        Contest {
            id: Uuid::new_v4(),
            title: "Mead Cup".to_string(),
            slug: "mead-cup".to_string(),
            description: String::new(),
            rules: String::new(),
            entry_fee_amount: Decimal::new(3000, 2),
            entry_fee_currency: "PLN".to_string(),
            payment_transfer_info: String::new(),
            discount_rate: Decimal::ZERO,
            entry_global_limit: None,
            entry_user_limit: None,
            delivery_address: String::new(),
            judge_registration_date_from: None,
            judge_registration_date_to: None,
            registration_date_from: None,
            registration_date_to: None,
            delivery_date_from: None,
            delivery_date_to: None,
            judging_date_from: None,
            judging_date_to: None,
            competition_is_published: false,
            competition_autopublish_at: None,
            result_is_published: false,
            result_autopublish_at: None,
            is_judging_eliminations: false,
            is_judging_finals: false,
            is_judging_bos: false,
            bos_entry_id: None,
            created_by: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 5, d).unwrap()
    }

    #[test]
    fn test_autopublish() {
        let now = Utc.with_ymd_and_hms(2025, 5, 10, 12, 0, 0).unwrap();
        let mut c = contest();
        assert!(!c.is_published(now));
        c.competition_autopublish_at = Some(now - Duration::minutes(1));
        assert!(c.is_published(now));
        c.competition_autopublish_at = Some(now + Duration::minutes(1));
        assert!(!c.is_published(now));
        c.competition_is_published = true;
        assert!(c.is_published(now));
    }

    #[test]
    fn test_registrable_requires_window_and_room() {
        let now = Utc.with_ymd_and_hms(2025, 5, 10, 12, 0, 0).unwrap();
        let mut c = contest();
        c.competition_is_published = true;
        c.registration_date_from = Some(day(1));
        c.registration_date_to = Some(day(10));
        assert!(c.is_registrable(now, None));
        assert!(!c.is_registrable(now, Some(0)));

        c.registration_date_to = Some(day(9));
        assert!(!c.is_registrable(now, None));
    }

    #[test]
    fn test_judge_registration_window() {
        let mut c = contest();
        assert!(c.can_judges_register(day(10)));

        c.judge_registration_date_from = Some(day(5));
        c.judge_registration_date_to = Some(day(15));
        assert!(!c.can_judges_register(day(4)));
        assert!(c.can_judges_register(day(5)));
        assert!(c.can_judges_register(day(15)));
        assert!(!c.can_judges_register(day(16)));
    }

    #[test]
    fn test_limits_left() {
        let mut c = contest();
        assert_eq!(c.global_limit_left(10), None);
        c.entry_global_limit = Some(2);
        c.entry_user_limit = Some(3);
        assert_eq!(c.global_limit_left(1), Some(1));
        assert_eq!(c.global_limit_left(5), Some(0));
        assert_eq!(c.user_limit_left(1), Some(2));
    }

    #[test]
    fn test_entries_price_with_rebate() {
        let mut c = contest();
        c.discount_rate = Decimal::new(150, 1);
        assert_eq!(c.entries_price(3, false), Decimal::new(9000, 2));
        assert_eq!(c.entries_price(3, true), Decimal::new(7650, 2));
    }

    #[test]
    fn test_transfer_requires_instructions() {
        let mut c = contest();
        let methods = vec!["transfer".to_string()];
        assert!(c.validate_settings(&methods).is_err());
        c.payment_transfer_info = "IBAN PL00 0000".to_string();
        assert!(c.validate_settings(&methods).is_ok());
    }

    #[test]
    fn test_final_round_done() {
        assert!(final_round_done(3, 7));
        assert!(final_round_done(0, 0));
        assert!(final_round_done(2, 2));
        assert!(!final_round_done(1, 4));
    }
}
