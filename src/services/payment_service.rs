//! Payment service
//!
//! Status changes run in a transaction holding the payment row lock. The
//! notification is sent only after the commit and only for the change that
//! actually moved the payment to `ok`.

use sqlx::{PgConnection, PgPool};
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    config::Config,
    constants::{payment_methods, API_BASE_PATH},
    db::repositories::{ContestRepository, EntryRepository, PaymentRepository, UserRepository},
    error::{AppError, AppResult},
    gateway::{payu, Notification, OrderUrls, PayuClient},
    handlers::payments::{
        request::CreatePaymentRequest,
        response::{PaymentResponse, RedirectResponse},
    },
    middleware::AuthenticatedUser,
    models::{Contest, Payment, PaymentStatus},
    rules::payment::{plan, Transition},
    services::{notification::Notifier, package_service::check_entry_scopes, ContestService},
};

/// What to tell the payer once the transaction is committed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaidNotice {
    pub user_id: Uuid,
    pub contest_id: Uuid,
    pub entry_codes: Vec<i32>,
}

fn payment_not_found() -> AppError {
    AppError::NotFound("Payment not found".to_string())
}

fn ensure_payer(payment: &Payment, user: &AuthenticatedUser) -> AppResult<()> {
    if payment.user_id == user.id {
        Ok(())
    } else {
        Err(payment_not_found())
    }
}

/// Deliver a notice; a failed delivery never undoes a committed payment
pub async fn deliver(notifier: &dyn Notifier, notice: Option<PaidNotice>) {
    let Some(notice) = notice else {
        return;
    };
    if let Err(e) = notifier
        .entries_paid(notice.user_id, notice.contest_id, notice.entry_codes)
        .await
    {
        warn!(user_id = %notice.user_id, error = %e, "Failed to send payment notification");
    }
}

pub struct PaymentService;

impl PaymentService {
    /// Start a payment for some of the caller's unpaid entries
    pub async fn create_payment(
        pool: &PgPool,
        config: &Config,
        user: &AuthenticatedUser,
        slug: &str,
        payload: &CreatePaymentRequest,
    ) -> AppResult<PaymentResponse> {
        let contest = ContestService::find_visible(pool, slug, Some(user)).await?;

        let method = ContestRepository::payment_methods(pool, &contest.id)
            .await?
            .into_iter()
            .find(|m| m.code == payload.method)
            .ok_or_else(|| AppError::InvalidField {
                field: "method".to_string(),
                message: "This payment method is not available".to_string(),
            })?;
        match method.code.as_str() {
            payment_methods::PAYPAL => {
                return Err(AppError::Gateway("PayPal payments are unavailable".to_string()));
            }
            payment_methods::FAKE if !config.payments.fake_enabled => {
                return Err(AppError::InvalidField {
                    field: "method".to_string(),
                    message: "This payment method is not available".to_string(),
                });
            }
            _ => {}
        }

        let mut ids = payload.entry_ids.clone();
        ids.sort_unstable();
        ids.dedup();

        let mut tx = pool.begin().await?;
        // Serializes payment creation per contest so an entry cannot join two open payments
        let contest = ContestRepository::lock(&mut *tx, &contest.id)
            .await?
            .ok_or_else(|| AppError::NotFound("Contest not found".to_string()))?;

        let scopes = EntryRepository::scopes(&mut *tx, &ids).await?;
        let contest_id = check_entry_scopes(user, &ids, &scopes)?;
        if contest_id != contest.id || scopes.iter().any(|s| s.brewer_id != user.id) {
            return Err(AppError::NotFound("Entry not found".to_string()));
        }
        if scopes.iter().any(|s| s.is_paid) {
            return Err(AppError::InvalidField {
                field: "entry_ids".to_string(),
                message: "Some entries are already paid".to_string(),
            });
        }
        if !PaymentRepository::entries_in_open_payments(&mut *tx, &ids).await?.is_empty() {
            return Err(AppError::InvalidField {
                field: "entry_ids".to_string(),
                message: "Some entries already have a payment in progress".to_string(),
            });
        }

        let has_rebate = UserRepository::has_rebate(&mut *tx, &user.id).await?;
        let amount = contest.entries_price(ids.len(), has_rebate);
        let mut payment = PaymentRepository::create(
            &mut tx,
            &method.id,
            &user.id,
            &contest.id,
            amount,
            &contest.entry_fee_currency,
            &ids,
        )
        .await?;

        if payment.method_code == payment_methods::TRANSFER {
            Self::apply_status(&mut tx, &mut payment, PaymentStatus::Awaiting).await?;
        }
        let entry_codes = PaymentRepository::entry_codes(&mut *tx, &payment.id).await?;
        tx.commit().await?;

        info!(
            payment_id = %payment.id,
            method = %payment.method_code,
            amount = %payment.amount,
            entries = ids.len(),
            has_rebate,
            "Payment created"
        );
        Ok(Self::to_response(&contest, payment, entry_codes))
    }

    pub async fn get_payment(pool: &PgPool, user: &AuthenticatedUser, id: &Uuid) -> AppResult<PaymentResponse> {
        let payment = PaymentRepository::find_by_id(pool, id)
            .await?
            .ok_or_else(payment_not_found)?;
        if !user.is_staff() {
            ensure_payer(&payment, user)?;
        }
        let contest = ContestService::get_by_id(pool, &payment.contest_id).await?;
        let entry_codes = PaymentRepository::entry_codes(pool, id).await?;
        Ok(Self::to_response(&contest, payment, entry_codes))
    }

    /// The caller's payments in a contest
    pub async fn list_mine(pool: &PgPool, user: &AuthenticatedUser, slug: &str) -> AppResult<Vec<PaymentResponse>> {
        let contest = ContestService::find_visible(pool, slug, Some(user)).await?;
        let payments = PaymentRepository::list_by_user(pool, &contest.id, &user.id).await?;

        futures::future::try_join_all(payments.into_iter().map(|payment| {
            let contest = &contest;
            async move {
                let entry_codes = PaymentRepository::entry_codes(pool, &payment.id).await?;
                Ok::<_, AppError>(Self::to_response(contest, payment, entry_codes))
            }
        }))
        .await
    }

    /// Transfers waiting for staff confirmation
    pub async fn list_pending(pool: &PgPool, slug: Option<&str>) -> AppResult<Vec<Payment>> {
        let contest_id = match slug {
            Some(slug) => Some(ContestService::find_by_slug(pool, slug).await?.id),
            None => None,
        };
        PaymentRepository::list_pending_transfers(pool, contest_id.as_ref()).await
    }

    /// Tester bypass: settle the payment without any gateway
    pub async fn fake(
        pool: &PgPool,
        config: &Config,
        notifier: &dyn Notifier,
        user: &AuthenticatedUser,
        id: &Uuid,
        successful: bool,
    ) -> AppResult<Payment> {
        if !config.payments.fake_enabled {
            return Err(payment_not_found());
        }

        let mut tx = pool.begin().await?;
        let mut payment = PaymentRepository::lock(&mut *tx, id)
            .await?
            .ok_or_else(payment_not_found)?;
        ensure_payer(&payment, user)?;
        if payment.method_code != payment_methods::FAKE {
            return Err(AppError::InvalidInput("Not a test payment".to_string()));
        }

        let next = if successful { PaymentStatus::Ok } else { PaymentStatus::Failed };
        let notice = Self::apply_status(&mut tx, &mut payment, next).await?;
        tx.commit().await?;

        deliver(notifier, notice).await;
        Ok(payment)
    }

    /// Staff saw the bank transfer
    pub async fn confirm_transfer(pool: &PgPool, notifier: &dyn Notifier, id: &Uuid) -> AppResult<Payment> {
        let mut tx = pool.begin().await?;
        let mut payment = PaymentRepository::lock(&mut *tx, id)
            .await?
            .ok_or_else(payment_not_found)?;
        if payment.method_code != payment_methods::TRANSFER {
            return Err(AppError::InvalidInput(
                "Only transfer payments are confirmed manually".to_string(),
            ));
        }

        let notice = Self::apply_status(&mut tx, &mut payment, PaymentStatus::Ok).await?;
        tx.commit().await?;

        deliver(notifier, notice).await;
        Ok(payment)
    }

    /// Payer gives up on an unsettled payment
    pub async fn cancel(pool: &PgPool, user: &AuthenticatedUser, id: &Uuid) -> AppResult<Payment> {
        let mut tx = pool.begin().await?;
        let mut payment = PaymentRepository::lock(&mut *tx, id)
            .await?
            .ok_or_else(payment_not_found)?;
        ensure_payer(&payment, user)?;

        Self::apply_status(&mut tx, &mut payment, PaymentStatus::Canceled).await?;
        tx.commit().await?;
        Ok(payment)
    }

    /// Register the payment at PayU and return where to send the payer
    pub async fn start_payu(
        pool: &PgPool,
        config: &Config,
        client: &PayuClient,
        user: &AuthenticatedUser,
        id: &Uuid,
        customer_ip: &str,
    ) -> AppResult<RedirectResponse> {
        let payment = PaymentRepository::find_by_id(pool, id)
            .await?
            .ok_or_else(payment_not_found)?;
        ensure_payer(&payment, user)?;

        match payment.method_code.as_str() {
            payment_methods::PAYU => {}
            payment_methods::PAYPAL => {
                return Err(AppError::Gateway("PayPal payments are unavailable".to_string()));
            }
            _ => return Err(AppError::InvalidInput("Not a PayU payment".to_string())),
        }
        if payment.status.is_final() {
            return Err(AppError::Conflict("Payment is already settled".to_string()));
        }

        let buyer = UserRepository::find_by_id(pool, &user.id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
        let base = &config.server.public_base_url;
        let continue_url = format!("{base}/payments/{}", payment.id);
        let notify_url = format!("{base}{API_BASE_PATH}/payments/payu/notify");
        let urls = OrderUrls {
            customer_ip,
            continue_url: &continue_url,
            notify_url: &notify_url,
        };

        let order = client.create_order(&payment, &buyer, &urls).await?;
        let mut tx = pool.begin().await?;
        PaymentRepository::record_order(&mut tx, &payment.id, &order.order_id).await?;
        tx.commit().await?;

        info!(payment_id = %payment.id, order_id = %order.order_id, "PayU order registered");
        Ok(RedirectResponse {
            redirect_uri: order.redirect_uri,
        })
    }

    /// PayU order notification. Anything we cannot match to a stored payment
    /// is answered with not found.
    pub async fn payu_notification(pool: &PgPool, notifier: &dyn Notifier, body: &[u8]) -> AppResult<()> {
        let Some(Notification { order }) = Notification::parse(body) else {
            warn!("Malformed PayU notification");
            return Err(payment_not_found());
        };

        let mut tx = pool.begin().await?;
        let Some(mut payment) = PaymentRepository::lock_by_order(&mut *tx, &order.order_id).await? else {
            warn!(order_id = %order.order_id, "PayU notification for an unknown order");
            return Err(payment_not_found());
        };
        let orders = PaymentRepository::order_ids(&mut *tx, &payment.id).await?;

        let next = match payu::verify(&payment, &orders, &order) {
            Err(mismatch) => {
                warn!(payment_id = %payment.id, order_id = %order.order_id, %mismatch, "PayU notification rejected");
                return Err(payment_not_found());
            }
            Ok(None) => {
                info!(payment_id = %payment.id, status = %order.status, "PayU status ignored");
                return Ok(());
            }
            Ok(Some(next)) => next,
        };

        let notice = match Self::apply_status(&mut tx, &mut payment, next).await {
            Ok(notice) => notice,
            Err(AppError::InvalidTransition(e)) => {
                warn!(payment_id = %payment.id, error = %e, "Out of order PayU notification");
                return Ok(());
            }
            Err(e) => return Err(e),
        };
        tx.commit().await?;

        deliver(notifier, notice).await;
        Ok(())
    }

    /// Persist a status change of a locked payment and its side effects.
    /// Returns the notice to deliver after commit.
    async fn apply_status(
        conn: &mut PgConnection,
        payment: &mut Payment,
        next: PaymentStatus,
    ) -> AppResult<Option<PaidNotice>> {
        let Transition::Applied { to, effects } = plan(Some(payment.status), next)? else {
            return Ok(None);
        };

        PaymentRepository::set_status(&mut *conn, &payment.id, to).await?;
        info!(payment_id = %payment.id, from = %payment.status, to = %to, "Payment status changed");
        payment.status = to;

        let entry_codes = if effects.mark_entries_paid {
            EntryRepository::mark_paid_by_payment(&mut *conn, &payment.id).await?
        } else {
            Vec::new()
        };

        Ok(effects.notify.then(|| PaidNotice {
            user_id: payment.user_id,
            contest_id: payment.contest_id,
            entry_codes,
        }))
    }

    fn to_response(contest: &Contest, payment: Payment, entry_codes: Vec<i32>) -> PaymentResponse {
        let transfer_info = (payment.method_code == payment_methods::TRANSFER)
            .then(|| contest.payment_transfer_info.clone());
        PaymentResponse {
            payment,
            entry_codes,
            transfer_info,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use mockall::predicate::eq;
    use rust_decimal::Decimal;

    use super::*;
    use crate::{models::contest::tests::contest, services::notification::MockNotifier};

    fn notice_for(previous: PaymentStatus, next: PaymentStatus, user_id: Uuid, contest_id: Uuid) -> Option<PaidNotice> {
        match plan(Some(previous), next).ok()? {
            Transition::Applied { effects, .. } if effects.notify => Some(PaidNotice {
                user_id,
                contest_id,
                entry_codes: vec![1000, 1001],
            }),
            _ => None,
        }
    }

    #[tokio::test]
    async fn test_planned_notice_reaches_notifier_once() {
        let user_id = Uuid::new_v4();
        let contest_id = Uuid::new_v4();

        let mut notifier = MockNotifier::new();
        notifier
            .expect_entries_paid()
            .with(eq(user_id), eq(contest_id), eq(vec![1000, 1001]))
            .times(1)
            .returning(|_, _, _| Ok(()));

        deliver(&notifier, notice_for(PaymentStatus::Awaiting, PaymentStatus::Ok, user_id, contest_id)).await;
        deliver(&notifier, notice_for(PaymentStatus::Ok, PaymentStatus::Ok, user_id, contest_id)).await;
    }

    #[tokio::test]
    async fn test_non_ok_changes_stay_silent() {
        let mut notifier = MockNotifier::new();
        notifier.expect_entries_paid().times(0);

        let (user_id, contest_id) = (Uuid::new_v4(), Uuid::new_v4());
        deliver(&notifier, notice_for(PaymentStatus::Created, PaymentStatus::Awaiting, user_id, contest_id)).await;
        deliver(&notifier, notice_for(PaymentStatus::Awaiting, PaymentStatus::Canceled, user_id, contest_id)).await;
    }

    #[tokio::test]
    async fn test_failed_delivery_is_swallowed() {
        let mut notifier = MockNotifier::new();
        notifier
            .expect_entries_paid()
            .times(1)
            .returning(|_, _, _| Err(anyhow::anyhow!("smtp down")));

        let notice = PaidNotice {
            user_id: Uuid::new_v4(),
            contest_id: Uuid::new_v4(),
            entry_codes: vec![1000],
        };
        deliver(&notifier, Some(notice)).await;
    }

    fn payment(method: &str) -> Payment {
        Payment {
            id: Uuid::new_v4(),
            method_id: Uuid::new_v4(),
            method_code: method.to_string(),
            user_id: Uuid::new_v4(),
            contest_id: Uuid::new_v4(),
            amount: Decimal::new(6000, 2),
            currency: "PLN".to_string(),
            status: PaymentStatus::Awaiting,
            code: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_transfer_response_carries_instructions() {
        let mut c = contest();
        c.payment_transfer_info = "PL61 1090 1014 0000 0712 1981 2874".to_string();

        let transfer = PaymentService::to_response(&c, payment(payment_methods::TRANSFER), vec![1000]);
        assert_eq!(transfer.transfer_info.as_deref(), Some(c.payment_transfer_info.as_str()));

        let payu = PaymentService::to_response(&c, payment(payment_methods::PAYU), vec![1000]);
        assert!(payu.transfer_info.is_none());
    }

    #[test]
    fn test_only_payer_sees_payment() {
        let p = payment(payment_methods::PAYU);
        let payer = AuthenticatedUser {
            id: p.user_id,
            email: "payer@example.com".to_string(),
            role: crate::constants::roles::PARTICIPANT.to_string(),
        };
        assert!(ensure_payer(&p, &payer).is_ok());

        let other = AuthenticatedUser {
            id: Uuid::new_v4(),
            ..payer
        };
        assert!(matches!(ensure_payer(&p, &other), Err(AppError::NotFound(_))));
    }
}
