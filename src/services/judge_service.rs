//! Judge certification and contest applications

use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::{
    db::repositories::{judge_repo::ApplicationRow, JudgeRepository},
    error::{AppError, AppResult},
    handlers::judges::{request::CertificationRequest, response::ApplicationStatusResponse},
    middleware::AuthenticatedUser,
    models::{Contest, JudgeCertification, JudgeInCompetition, JudgeStatus},
    rules::judging::{can_apply, can_withdraw, PolicyDecision},
    services::{ContestService, UserService},
    utils::{now_utc, sanitize_string},
};

/// Applications are only handled while judge registration runs
fn ensure_registration_open(contest: &Contest) -> AppResult<()> {
    if contest.can_judges_register(now_utc().date_naive()) {
        Ok(())
    } else {
        Err(AppError::NotFound("Judge registration is closed".to_string()))
    }
}

fn enforce(decision: PolicyDecision) -> AppResult<()> {
    match decision.reason() {
        None => Ok(()),
        Some(reason) => Err(AppError::PolicyDenied(reason.to_string())),
    }
}

impl CertificationRequest {
    fn into_certification(self, user_id: Uuid) -> JudgeCertification {
        JudgeCertification {
            user_id,
            is_mead_bjcp: self.is_mead_bjcp,
            is_mjp: self.is_mjp,
            is_other: self.is_other,
            mjp_level: self.mjp_level,
            other_description: sanitize_string(&self.other_description),
            updated_at: now_utc(),
        }
    }
}

pub struct JudgeService;

impl JudgeService {
    pub async fn get_certification(pool: &PgPool, user_id: &Uuid) -> AppResult<JudgeCertification> {
        JudgeRepository::find_certification(pool, user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Certification not found".to_string()))
    }

    /// Save the form. With no type checked the certification is removed and
    /// `None` is returned.
    pub async fn save_certification(
        pool: &PgPool,
        user_id: &Uuid,
        payload: CertificationRequest,
    ) -> AppResult<Option<JudgeCertification>> {
        let mut cert = payload.into_certification(*user_id);
        cert.clean()?;

        if !cert.has_any() {
            JudgeRepository::delete_certification(pool, user_id).await?;
            info!(%user_id, "Judge certification cleared");
            return Ok(None);
        }

        let saved = JudgeRepository::upsert_certification(pool, &cert).await?;
        info!(%user_id, bjcp = saved.is_mead_bjcp, mjp = ?saved.mjp_level, other = saved.is_other, "Judge certification saved");
        Ok(Some(saved))
    }

    pub async fn delete_certification(pool: &PgPool, user_id: &Uuid) -> AppResult<()> {
        if !JudgeRepository::delete_certification(pool, user_id).await? {
            return Err(AppError::NotFound("Certification not found".to_string()));
        }
        Ok(())
    }

    /// What the caller may do about judging the contest
    pub async fn application_status(
        pool: &PgPool,
        user: &AuthenticatedUser,
        slug: &str,
    ) -> AppResult<ApplicationStatusResponse> {
        let contest = ContestService::find_visible(pool, slug, Some(user)).await?;
        let has_certification = JudgeRepository::find_certification(pool, &user.id).await?.is_some();
        let status = JudgeRepository::find_application(pool, &user.id, &contest.id)
            .await?
            .map(|a| a.status);

        Ok(Self::describe(&contest, has_certification, status))
    }

    fn describe(contest: &Contest, has_certification: bool, status: Option<JudgeStatus>) -> ApplicationStatusResponse {
        let registration_open = contest.can_judges_register(now_utc().date_naive());
        let apply = can_apply(has_certification, status);
        let withdraw = can_withdraw(status);

        ApplicationStatusResponse {
            status,
            registration_open,
            has_certification,
            can_apply: registration_open && apply.is_allowed(),
            can_withdraw: registration_open && withdraw.is_allowed(),
            reason: if status.is_none() { apply.reason() } else { None },
        }
    }

    pub async fn apply(pool: &PgPool, user: &AuthenticatedUser, slug: &str) -> AppResult<JudgeInCompetition> {
        let contest = ContestService::find_visible(pool, slug, Some(user)).await?;
        ensure_registration_open(&contest)?;
        UserService::require_complete_profile(pool, &user.id).await?;

        let mut tx = pool.begin().await?;
        let has_certification = JudgeRepository::find_certification(&mut *tx, &user.id).await?.is_some();
        let existing = JudgeRepository::find_application(&mut *tx, &user.id, &contest.id).await?;
        enforce(can_apply(has_certification, existing.map(|a| a.status)))?;

        let application = JudgeRepository::create_application(&mut *tx, &user.id, &contest.id)
            .await
            .map_err(|e| match e {
                AppError::AlreadyExists(_) => AppError::PolicyDenied("You already applied for judging.".to_string()),
                other => other,
            })?;
        tx.commit().await?;

        info!(user_id = %user.id, contest_id = %contest.id, "Judge applied");
        Ok(application)
    }

    pub async fn withdraw(pool: &PgPool, user: &AuthenticatedUser, slug: &str) -> AppResult<()> {
        let contest = ContestService::find_visible(pool, slug, Some(user)).await?;
        ensure_registration_open(&contest)?;

        let mut tx = pool.begin().await?;
        let existing = JudgeRepository::find_application(&mut *tx, &user.id, &contest.id).await?;
        enforce(can_withdraw(existing.as_ref().map(|a| a.status)))?;

        if let Some(application) = existing {
            JudgeRepository::delete_application(&mut *tx, &application.id).await?;
        }
        tx.commit().await?;

        info!(user_id = %user.id, contest_id = %contest.id, "Judge application withdrawn");
        Ok(())
    }

    pub async fn list_applications(
        pool: &PgPool,
        slug: &str,
        status: Option<JudgeStatus>,
    ) -> AppResult<Vec<ApplicationRow>> {
        let contest = ContestService::find_by_slug(pool, slug).await?;
        JudgeRepository::list_applications(pool, &contest.id, status).await
    }

    /// Approve or reject pending applications in bulk
    pub async fn decide(pool: &PgPool, slug: &str, ids: &[Uuid], status: JudgeStatus) -> AppResult<u64> {
        if !JudgeStatus::Application.can_transition_to(status) {
            return Err(AppError::InvalidInput(format!("Applications cannot be moved to {status}")));
        }

        let contest = ContestService::find_by_slug(pool, slug).await?;
        let updated = JudgeRepository::decide_applications(pool, &contest.id, ids, status).await?;

        info!(contest_id = %contest.id, %status, requested = ids.len(), updated, "Judge applications decided");
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::*;
    use crate::models::contest::tests::contest;

    fn open_contest() -> Contest {
        let today = Utc::now().date_naive();
        let mut c = contest();
        c.judge_registration_date_from = Some(today - Duration::days(1));
        c.judge_registration_date_to = Some(today + Duration::days(1));
        c
    }

    #[test]
    fn test_closed_window_hides_application() {
        let mut c = open_contest();
        c.judge_registration_date_to = Some(Utc::now().date_naive() - Duration::days(1));
        assert!(matches!(ensure_registration_open(&c), Err(AppError::NotFound(_))));
        assert!(ensure_registration_open(&open_contest()).is_ok());
    }

    #[test]
    fn test_denial_carries_reason() {
        let err = enforce(can_apply(false, None)).unwrap_err();
        match err {
            AppError::PolicyDenied(reason) => assert!(reason.contains("judge certificates")),
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(enforce(can_apply(true, None)).is_ok());
    }

    #[test]
    fn test_status_without_certification() {
        let status = JudgeService::describe(&open_contest(), false, None);
        assert!(!status.can_apply);
        assert!(!status.can_withdraw);
        assert!(status.reason.is_some());
    }

    #[test]
    fn test_status_of_pending_application() {
        let status = JudgeService::describe(&open_contest(), true, Some(JudgeStatus::Application));
        assert!(!status.can_apply);
        assert!(status.can_withdraw);
        assert_eq!(status.reason, None);
    }

    #[test]
    fn test_rejected_cannot_withdraw() {
        let status = JudgeService::describe(&open_contest(), true, Some(JudgeStatus::Rejected));
        assert!(!status.can_withdraw);
    }

    #[test]
    fn test_empty_form_has_no_certification() {
        let mut cert = CertificationRequest::default().into_certification(Uuid::new_v4());
        assert!(cert.clean().is_ok());
        assert!(!cert.has_any());
    }
}
