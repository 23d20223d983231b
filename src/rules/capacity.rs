//! Entry capacity and edit-window rules
//!
//! Three caps guard every new entry, checked in this order: the category's
//! per-user limit, the contest-wide limit and the contest per-user limit.
//! Moving an existing entry into another category re-checks the target
//! category only.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::models::{Carbonation, Entry, Sweetness};

/// A cap that a write would break
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum LimitViolation {
    #[error("You have reached entry limit for this category ({limit})!")]
    Category { limit: i64 },

    #[error("Cannot change category due to target category limit")]
    CategoryChange { limit: i64 },

    #[error("This contest has reached maximum number of entries, no more entries can be registered.")]
    Global { limit: i64 },

    #[error("You have reached maximum number of entries per user in this competition.")]
    PerUser { limit: i64 },
}

impl LimitViolation {
    /// Short machine readable name of the limit
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Category { .. } => "category",
            Self::CategoryChange { .. } => "category_change",
            Self::Global { .. } => "global",
            Self::PerUser { .. } => "user",
        }
    }

    /// The configured maximum that was hit
    pub fn max(&self) -> i64 {
        match self {
            Self::Category { limit }
            | Self::CategoryChange { limit }
            | Self::Global { limit }
            | Self::PerUser { limit } => *limit,
        }
    }
}

/// Counts read from the database right before a write
#[derive(Debug, Clone, Copy, Default)]
pub struct Occupancy {
    /// `entries_limit` of the target category
    pub category_limit: i64,
    /// Entries the brewer already holds in the target category
    pub user_in_category: i64,
    pub global_limit: Option<i64>,
    /// Entries in the whole contest
    pub contest_total: i64,
    pub user_limit: Option<i64>,
    /// Entries the brewer holds in the whole contest
    pub user_in_contest: i64,
}

/// Kind of write being validated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryWrite {
    Insert,
    Update { category_changed: bool },
}

/// Validate a write against all caps.
pub fn check_limits(write: EntryWrite, occupancy: &Occupancy) -> Result<(), LimitViolation> {
    match write {
        EntryWrite::Update { category_changed } => {
            if category_changed && occupancy.category_limit <= occupancy.user_in_category {
                return Err(LimitViolation::CategoryChange {
                    limit: occupancy.category_limit,
                });
            }
            Ok(())
        }
        EntryWrite::Insert => {
            if occupancy.category_limit < occupancy.user_in_category + 1 {
                return Err(LimitViolation::Category {
                    limit: occupancy.category_limit,
                });
            }

            if let Some(limit) = occupancy.global_limit {
                if limit_left(limit, occupancy.contest_total) <= 0 {
                    return Err(LimitViolation::Global { limit });
                }
            }

            if let Some(limit) = occupancy.user_limit {
                if limit_left(limit, occupancy.user_in_contest) <= 0 {
                    return Err(LimitViolation::PerUser { limit });
                }
            }

            Ok(())
        }
    }
}

/// Remaining capacity, never negative
pub fn limit_left(limit: i64, used: i64) -> i64 {
    (limit - used).max(0)
}

/// Entries stay editable until the registration deadline (inclusive).
/// A contest without a deadline never closes.
pub fn can_be_edited(registration_date_to: Option<NaiveDate>, today: NaiveDate) -> bool {
    registration_date_to.is_none_or(|deadline| deadline >= today)
}

/// Paid or received entries are frozen.
pub fn can_be_deleted(is_paid: bool, is_received: bool) -> bool {
    !is_paid && !is_received
}

/// The user-editable fields of an entry, used to diff a write against the
/// persisted row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntryFields {
    pub category_id: Uuid,
    pub name: String,
    pub sweetness: Sweetness,
    pub carbonation: Carbonation,
    pub extra_info: String,
    pub alcohol_content: Option<Decimal>,
    pub place: i32,
}

impl From<&Entry> for EntryFields {
    fn from(entry: &Entry) -> Self {
        Self {
            category_id: entry.category_id,
            name: entry.name.clone(),
            sweetness: entry.sweetness,
            carbonation: entry.carbonation,
            extra_info: entry.extra_info.clone(),
            alcohol_content: entry.alcohol_content,
            place: entry.place,
        }
    }
}

/// Names of the fields that differ between `old` and `new`
pub fn altered_fields(old: &EntryFields, new: &EntryFields) -> Vec<&'static str> {
    let mut altered = Vec::new();
    if old.category_id != new.category_id {
        altered.push("category_id");
    }
    if old.name != new.name {
        altered.push("name");
    }
    if old.sweetness != new.sweetness {
        altered.push("sweetness");
    }
    if old.carbonation != new.carbonation {
        altered.push("carbonation");
    }
    if old.extra_info != new.extra_info {
        altered.push("extra_info");
    }
    if old.alcohol_content != new.alcohol_content {
        altered.push("alcohol_content");
    }
    if old.place != new.place {
        altered.push("place");
    }
    altered
}

/// Fields that may still change once registration is closed
const LATE_MODIFICATIONS: &[&str] = &["place"];

/// Once the window is closed only a change of exactly the place (or no
/// change at all) is accepted.
pub fn is_late_change_allowed(altered: &[&str]) -> bool {
    altered.is_empty()
        || (altered.len() == LATE_MODIFICATIONS.len()
            && altered.iter().all(|field| LATE_MODIFICATIONS.contains(field)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn occupancy(category_limit: i64, user_in_category: i64) -> Occupancy {
        Occupancy {
            category_limit,
            user_in_category,
            ..Default::default()
        }
    }

    fn fields() -> EntryFields {
        EntryFields {
            category_id: Uuid::nil(),
            name: "Trójniak".to_string(),
            sweetness: Sweetness::Sweet,
            carbonation: Carbonation::Still,
            extra_info: String::new(),
            alcohol_content: Some(Decimal::new(1350, 2)),
            place: 0,
        }
    }

    #[test]
    fn test_second_entry_in_single_slot_category_is_rejected() {
        assert!(check_limits(EntryWrite::Insert, &occupancy(1, 0)).is_ok());
        assert_eq!(
            check_limits(EntryWrite::Insert, &occupancy(1, 1)),
            Err(LimitViolation::Category { limit: 1 })
        );
    }

    #[test]
    fn test_global_limit_counts_all_brewers() {
        let mut occ = occupancy(1, 0);
        occ.global_limit = Some(2);
        occ.contest_total = 1;
        assert!(check_limits(EntryWrite::Insert, &occ).is_ok());

        occ.contest_total = 2;
        assert_eq!(
            check_limits(EntryWrite::Insert, &occ),
            Err(LimitViolation::Global { limit: 2 })
        );
    }

    #[test]
    fn test_user_limit_across_categories() {
        let mut occ = occupancy(3, 0);
        occ.user_limit = Some(2);
        occ.user_in_contest = 2;
        assert_eq!(
            check_limits(EntryWrite::Insert, &occ),
            Err(LimitViolation::PerUser { limit: 2 })
        );
    }

    #[test]
    fn test_category_limit_is_checked_before_global() {
        let occ = Occupancy {
            category_limit: 1,
            user_in_category: 1,
            global_limit: Some(1),
            contest_total: 5,
            user_limit: Some(1),
            user_in_contest: 5,
        };
        assert_eq!(
            check_limits(EntryWrite::Insert, &occ),
            Err(LimitViolation::Category { limit: 1 })
        );
    }

    #[test]
    fn test_update_without_category_change_skips_caps() {
        let occ = Occupancy {
            category_limit: 1,
            user_in_category: 1,
            global_limit: Some(0),
            contest_total: 10,
            user_limit: Some(0),
            user_in_contest: 10,
        };
        assert!(check_limits(EntryWrite::Update { category_changed: false }, &occ).is_ok());
    }

    #[test]
    fn test_category_change_checks_target_occupancy() {
        let write = EntryWrite::Update { category_changed: true };
        assert!(check_limits(write, &occupancy(2, 1)).is_ok());
        assert_eq!(
            check_limits(write, &occupancy(2, 2)),
            Err(LimitViolation::CategoryChange { limit: 2 })
        );
    }

    #[test]
    fn test_edit_window() {
        let deadline = NaiveDate::from_ymd_opt(2025, 3, 31).unwrap();
        assert!(can_be_edited(Some(deadline), deadline));
        assert!(!can_be_edited(Some(deadline), deadline.succ_opt().unwrap()));
        assert!(can_be_edited(None, deadline));
    }

    #[test]
    fn test_paid_or_received_entries_cannot_be_deleted() {
        assert!(can_be_deleted(false, false));
        assert!(!can_be_deleted(true, false));
        assert!(!can_be_deleted(false, true));
    }

    #[test]
    fn test_place_only_change_is_allowed_late() {
        let old = fields();
        let mut new = fields();
        new.place = 1;
        let altered = altered_fields(&old, &new);
        assert_eq!(altered, vec!["place"]);
        assert!(is_late_change_allowed(&altered));
    }

    #[test]
    fn test_place_with_other_field_is_rejected_late() {
        let old = fields();
        let mut new = fields();
        new.place = 2;
        new.name = "Dwójniak".to_string();
        assert!(!is_late_change_allowed(&altered_fields(&old, &new)));
    }

    #[test]
    fn test_no_change_is_allowed_late() {
        assert!(is_late_change_allowed(&altered_fields(&fields(), &fields())));
    }
}
