//! Payment handler implementations

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::AppResult,
    middleware::AuthenticatedUser,
    models::Payment,
    services::PaymentService,
    state::AppState,
};

use super::{
    request::{CreatePaymentRequest, FakePaymentRequest},
    response::{PaymentResponse, RedirectResponse},
};

/// Address PayU shows to its antifraud; the proxy's view wins
fn customer_ip(headers: &HeaderMap) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or("127.0.0.1")
        .to_string()
}

pub async fn create_payment(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(slug): Path<String>,
    Json(payload): Json<CreatePaymentRequest>,
) -> AppResult<(StatusCode, Json<PaymentResponse>)> {
    payload.validate()?;
    let payment = PaymentService::create_payment(state.db(), state.config(), &user, &slug, &payload).await?;
    Ok((StatusCode::CREATED, Json(payment)))
}

pub async fn list_my_payments(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(slug): Path<String>,
) -> AppResult<Json<Vec<PaymentResponse>>> {
    let payments = PaymentService::list_mine(state.db(), &user, &slug).await?;
    Ok(Json(payments))
}

pub async fn get_payment(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<PaymentResponse>> {
    let payment = PaymentService::get_payment(state.db(), &user, &id).await?;
    Ok(Json(payment))
}

pub async fn cancel_payment(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Payment>> {
    let payment = PaymentService::cancel(state.db(), &user, &id).await?;
    Ok(Json(payment))
}

/// Tester bypass form
pub async fn fake_payment(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<FakePaymentRequest>,
) -> AppResult<Json<Payment>> {
    let payment = PaymentService::fake(
        state.db(),
        state.config(),
        state.notifier(),
        &user,
        &id,
        payload.successful,
    )
    .await?;
    Ok(Json(payment))
}

pub async fn start_payu(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> AppResult<Json<RedirectResponse>> {
    let redirect = PaymentService::start_payu(
        state.db(),
        state.config(),
        state.payu(),
        &user,
        &id,
        &customer_ip(&headers),
    )
    .await?;
    Ok(Json(redirect))
}

/// PayU webhook; the raw body is parsed by the service so any malformed
/// payload is answered like an unknown order
pub async fn payu_notify(State(state): State<AppState>, body: Bytes) -> AppResult<&'static str> {
    PaymentService::payu_notification(state.db(), state.notifier(), &body).await?;
    Ok("OK")
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn test_customer_ip_prefers_first_forwarded_address() {
        let mut headers = HeaderMap::new();
        assert_eq!(customer_ip(&headers), "127.0.0.1");

        headers.insert("x-forwarded-for", HeaderValue::from_static("203.0.113.7, 10.0.0.1"));
        assert_eq!(customer_ip(&headers), "203.0.113.7");
    }
}
