//! Entries package service

use std::collections::HashSet;

use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::{
    db::repositories::{package_repo::LabelRow, EntryRepository, PackageRepository},
    error::{AppError, AppResult},
    middleware::AuthenticatedUser,
    models::{EntriesPackage, EntryScope},
};

/// Check that the requested entries exist, live in one contest and belong to
/// the caller (staff may group anyone's entries). Returns the contest id.
pub fn check_entry_scopes(user: &AuthenticatedUser, requested: &[Uuid], scopes: &[EntryScope]) -> AppResult<Uuid> {
    let requested: HashSet<&Uuid> = requested.iter().collect();
    let Some(first) = scopes.first() else {
        return Err(AppError::InvalidField {
            field: "entry_ids".to_string(),
            message: "Select at least one entry".to_string(),
        });
    };

    if scopes.len() != requested.len() {
        return Err(AppError::NotFound("Entry not found".to_string()));
    }
    if scopes.iter().any(|s| s.contest_id != first.contest_id) {
        return Err(AppError::InvalidField {
            field: "entry_ids".to_string(),
            message: "All entries must belong to the same contest".to_string(),
        });
    }
    if !user.is_staff() && scopes.iter().any(|s| s.brewer_id != user.id) {
        return Err(AppError::NotFound("Entry not found".to_string()));
    }
    Ok(first.contest_id)
}

pub struct PackageService;

impl PackageService {
    pub async fn create_package(pool: &PgPool, user: &AuthenticatedUser, entry_ids: &[Uuid]) -> AppResult<EntriesPackage> {
        let mut ids = entry_ids.to_vec();
        ids.sort_unstable();
        ids.dedup();

        let scopes = EntryRepository::scopes(pool, &ids).await?;
        let contest_id = check_entry_scopes(user, &ids, &scopes)?;

        let mut tx = pool.begin().await?;
        let package = PackageRepository::create(&mut tx, &user.id, &contest_id, &ids).await?;
        tx.commit().await?;

        info!(package_id = %package.id, entries = ids.len(), owner_id = %user.id, "Package created");
        Ok(package)
    }

    pub async fn get_package(pool: &PgPool, user: &AuthenticatedUser, id: &Uuid) -> AppResult<(EntriesPackage, Vec<Uuid>)> {
        let package = PackageRepository::find_by_id(pool, id)
            .await?
            .filter(|p| p.owner_id == user.id || user.is_staff())
            .ok_or_else(|| AppError::NotFound("Package not found".to_string()))?;
        let entry_ids = PackageRepository::entry_ids(pool, id).await?;
        Ok((package, entry_ids))
    }

    /// Printable labels of the package's entries
    pub async fn labels(pool: &PgPool, user: &AuthenticatedUser, id: &Uuid) -> AppResult<Vec<LabelRow>> {
        let (package, _) = Self::get_package(pool, user, id).await?;
        PackageRepository::labels(pool, &package.id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::roles;

    fn user(role: &str) -> AuthenticatedUser {
        AuthenticatedUser {
            id: Uuid::new_v4(),
            email: "brewer@example.com".to_string(),
            role: role.to_string(),
        }
    }

    fn scope(brewer_id: Uuid, contest_id: Uuid) -> EntryScope {
        EntryScope {
            id: Uuid::new_v4(),
            brewer_id,
            contest_id,
            is_paid: false,
        }
    }

    #[test]
    fn test_own_entries_in_one_contest() {
        let brewer = user(roles::PARTICIPANT);
        let contest = Uuid::new_v4();
        let scopes = vec![scope(brewer.id, contest), scope(brewer.id, contest)];
        let ids: Vec<Uuid> = scopes.iter().map(|s| s.id).collect();
        assert_eq!(check_entry_scopes(&brewer, &ids, &scopes).unwrap(), contest);
    }

    #[test]
    fn test_empty_selection_rejected() {
        let err = check_entry_scopes(&user(roles::PARTICIPANT), &[], &[]).unwrap_err();
        assert_eq!(err.field(), Some("entry_ids"));
    }

    #[test]
    fn test_mixed_contests_rejected() {
        let brewer = user(roles::PARTICIPANT);
        let scopes = vec![scope(brewer.id, Uuid::new_v4()), scope(brewer.id, Uuid::new_v4())];
        let ids: Vec<Uuid> = scopes.iter().map(|s| s.id).collect();
        assert!(check_entry_scopes(&brewer, &ids, &scopes).is_err());
    }

    #[test]
    fn test_foreign_entries_only_for_staff() {
        let contest = Uuid::new_v4();
        let scopes = vec![scope(Uuid::new_v4(), contest)];
        let ids = vec![scopes[0].id];

        let brewer = user(roles::PARTICIPANT);
        assert!(matches!(
            check_entry_scopes(&brewer, &ids, &scopes),
            Err(AppError::NotFound(_))
        ));
        assert!(check_entry_scopes(&user(roles::STAFF), &ids, &scopes).is_ok());
    }

    #[test]
    fn test_missing_entry_rejected() {
        let brewer = user(roles::PARTICIPANT);
        let contest = Uuid::new_v4();
        let scopes = vec![scope(brewer.id, contest)];
        let ids = vec![scopes[0].id, Uuid::new_v4()];
        assert!(matches!(
            check_entry_scopes(&brewer, &ids, &scopes),
            Err(AppError::NotFound(_))
        ));
    }
}
