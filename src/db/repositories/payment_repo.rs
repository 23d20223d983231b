//! Payment repository
//!
//! Payments are always read joined with their method so callers can branch on
//! the method code without a second query.

use rust_decimal::Decimal;
use sqlx::{PgConnection, PgExecutor, PgPool};
use uuid::Uuid;

use crate::{
    constants::payment_methods,
    error::AppResult,
    models::{Payment, PaymentStatus},
};

const SELECT_PAYMENT: &str = r#"
    SELECT p.*, m.code AS method_code
    FROM payments p
    JOIN payment_methods m ON m.id = p.method_id
"#;

pub struct PaymentRepository;

impl PaymentRepository {
    /// Create a payment in `created` status covering the given entries
    pub async fn create(
        conn: &mut PgConnection,
        method_id: &Uuid,
        user_id: &Uuid,
        contest_id: &Uuid,
        amount: Decimal,
        currency: &str,
        entry_ids: &[Uuid],
    ) -> AppResult<Payment> {
        let payment = sqlx::query_as::<_, Payment>(
            r#"
            WITH p AS (
                INSERT INTO payments (method_id, user_id, contest_id, amount, currency)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING *
            )
            SELECT p.*, m.code AS method_code
            FROM p
            JOIN payment_methods m ON m.id = p.method_id
            "#,
        )
        .bind(method_id)
        .bind(user_id)
        .bind(contest_id)
        .bind(amount)
        .bind(currency)
        .fetch_one(&mut *conn)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO payment_entries (payment_id, entry_id)
            SELECT $1, UNNEST($2::uuid[])
            "#,
        )
        .bind(payment.id)
        .bind(entry_ids)
        .execute(&mut *conn)
        .await?;

        Ok(payment)
    }

    pub async fn find_by_id<'e>(executor: impl PgExecutor<'e>, id: &Uuid) -> AppResult<Option<Payment>> {
        let payment = sqlx::query_as::<_, Payment>(&format!("{SELECT_PAYMENT} WHERE p.id = $1"))
            .bind(id)
            .fetch_optional(executor)
            .await?;

        Ok(payment)
    }

    /// Lock the payment row; status changes happen under this lock
    pub async fn lock<'e>(executor: impl PgExecutor<'e>, id: &Uuid) -> AppResult<Option<Payment>> {
        let payment =
            sqlx::query_as::<_, Payment>(&format!("{SELECT_PAYMENT} WHERE p.id = $1 FOR UPDATE OF p"))
                .bind(id)
                .fetch_optional(executor)
                .await?;

        Ok(payment)
    }

    /// Lock the payment a gateway order was registered for
    pub async fn lock_by_order<'e>(executor: impl PgExecutor<'e>, order_id: &str) -> AppResult<Option<Payment>> {
        let payment = sqlx::query_as::<_, Payment>(&format!(
            "{SELECT_PAYMENT} WHERE p.id = (SELECT payment_id FROM payment_orders WHERE order_id = $1) FOR UPDATE OF p"
        ))
        .bind(order_id)
        .fetch_optional(executor)
        .await?;

        Ok(payment)
    }

    pub async fn set_status<'e>(executor: impl PgExecutor<'e>, id: &Uuid, status: PaymentStatus) -> AppResult<()> {
        sqlx::query(r#"UPDATE payments SET status = $2, updated_at = NOW() WHERE id = $1"#)
            .bind(id)
            .bind(status.as_str())
            .execute(executor)
            .await?;

        Ok(())
    }

    /// Register a gateway order; `code` tracks the latest one
    pub async fn record_order(conn: &mut PgConnection, id: &Uuid, order_id: &str) -> AppResult<()> {
        sqlx::query(r#"INSERT INTO payment_orders (order_id, payment_id) VALUES ($1, $2)"#)
            .bind(order_id)
            .bind(id)
            .execute(&mut *conn)
            .await?;

        sqlx::query(r#"UPDATE payments SET code = $2, updated_at = NOW() WHERE id = $1"#)
            .bind(id)
            .bind(order_id)
            .execute(&mut *conn)
            .await?;

        Ok(())
    }

    /// Every order id registered for the payment, oldest first
    pub async fn order_ids<'e>(executor: impl PgExecutor<'e>, id: &Uuid) -> AppResult<Vec<String>> {
        let ids: Vec<String> = sqlx::query_scalar(
            r#"SELECT order_id FROM payment_orders WHERE payment_id = $1 ORDER BY created_at, order_id"#,
        )
        .bind(id)
        .fetch_all(executor)
        .await?;

        Ok(ids)
    }

    pub async fn entry_codes<'e>(executor: impl PgExecutor<'e>, id: &Uuid) -> AppResult<Vec<i32>> {
        let codes: Vec<i32> = sqlx::query_scalar(
            r#"
            SELECT e.code FROM payment_entries pe
            JOIN entries e ON e.id = pe.entry_id
            WHERE pe.payment_id = $1
            ORDER BY e.code
            "#,
        )
        .bind(id)
        .fetch_all(executor)
        .await?;

        Ok(codes)
    }

    /// Entries among `ids` already covered by a payment that is still alive
    pub async fn entries_in_open_payments<'e>(executor: impl PgExecutor<'e>, ids: &[Uuid]) -> AppResult<Vec<Uuid>> {
        let taken: Vec<Uuid> = sqlx::query_scalar(
            r#"
            SELECT DISTINCT pe.entry_id
            FROM payment_entries pe
            JOIN payments p ON p.id = pe.payment_id
            WHERE pe.entry_id = ANY($1) AND p.status IN ('created', 'awaiting')
            "#,
        )
        .bind(ids)
        .fetch_all(executor)
        .await?;

        Ok(taken)
    }

    /// A user's payments in a contest, newest first
    pub async fn list_by_user(pool: &PgPool, contest_id: &Uuid, user_id: &Uuid) -> AppResult<Vec<Payment>> {
        let payments = sqlx::query_as::<_, Payment>(&format!(
            "{SELECT_PAYMENT} WHERE p.contest_id = $1 AND p.user_id = $2 ORDER BY p.created_at DESC"
        ))
        .bind(contest_id)
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(payments)
    }

    /// Transfer payments staff still have to confirm
    pub async fn list_pending_transfers(pool: &PgPool, contest_id: Option<&Uuid>) -> AppResult<Vec<Payment>> {
        let payments = sqlx::query_as::<_, Payment>(&format!(
            r#"{SELECT_PAYMENT}
            WHERE m.code = $1
              AND p.status NOT IN ('ok', 'failed')
              AND ($2::uuid IS NULL OR p.contest_id = $2)
            ORDER BY p.created_at"#
        ))
        .bind(payment_methods::TRANSFER)
        .bind(contest_id)
        .fetch_all(pool)
        .await?;

        Ok(payments)
    }
}
