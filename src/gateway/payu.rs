//! PayU REST client and notification validation
//!
//! Orders are created with an OAuth client-credentials token. PayU answers the
//! order call with a redirect, so the client never follows redirects.

use std::time::Duration;

use reqwest::redirect::Policy;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{
    config::PayuConfig,
    constants::{PAYU_OAUTH_ENDPOINT, PAYU_ORDER_DESCRIPTION, PAYU_ORDER_ENDPOINT},
    error::{AppError, AppResult},
    models::{Payment, PaymentStatus, User},
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Deserialize)]
struct OAuthToken {
    access_token: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Buyer<'a> {
    email: &'a str,
    phone: &'a str,
    first_name: &'a str,
    last_name: &'a str,
    language: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct OrderRequest<'a> {
    customer_ip: &'a str,
    continue_url: &'a str,
    notify_url: &'a str,
    merchant_pos_id: &'a str,
    description: &'a str,
    currency_code: &'a str,
    total_amount: String,
    buyer: Buyer<'a>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OrderResponse {
    order_id: Option<String>,
    redirect_uri: Option<String>,
}

/// Order registered at PayU
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedOrder {
    pub order_id: String,
    pub redirect_uri: String,
}

/// Where PayU sends the buyer and its notifications
#[derive(Debug, Clone)]
pub struct OrderUrls<'a> {
    pub customer_ip: &'a str,
    pub continue_url: &'a str,
    pub notify_url: &'a str,
}

/// Thin PayU API client
#[derive(Clone)]
pub struct PayuClient {
    http: reqwest::Client,
    config: PayuConfig,
}

impl PayuClient {
    pub fn new(config: PayuConfig) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .redirect(Policy::none())
            .build()
            .map_err(|e| AppError::Configuration(format!("PayU client: {e}")))?;

        Ok(Self { http, config })
    }

    pub fn is_configured(&self) -> bool {
        self.config.is_configured()
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), endpoint)
    }

    async fn access_token(&self) -> AppResult<String> {
        let response = self
            .http
            .post(self.url(PAYU_OAUTH_ENDPOINT))
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            warn!(status = %response.status(), "PayU OAuth request refused");
            return Err(AppError::Gateway("PayU authorization failed".to_string()));
        }

        let token: OAuthToken = response.json().await?;
        Ok(token.access_token)
    }

    /// Register an order for the payment and return where to send the buyer
    pub async fn create_order(&self, payment: &Payment, buyer: &User, urls: &OrderUrls<'_>) -> AppResult<CreatedOrder> {
        if !self.is_configured() {
            return Err(AppError::Gateway("PayU is not configured".to_string()));
        }

        let total_amount = payment
            .amount_minor()
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("payment {} amount out of range", payment.id)))?;

        let order = OrderRequest {
            customer_ip: urls.customer_ip,
            continue_url: urls.continue_url,
            notify_url: urls.notify_url,
            merchant_pos_id: &self.config.pos_id,
            description: PAYU_ORDER_DESCRIPTION,
            currency_code: &payment.currency,
            total_amount: total_amount.to_string(),
            buyer: Buyer {
                email: &buyer.email,
                phone: &buyer.phone,
                first_name: &buyer.first_name,
                last_name: &buyer.last_name,
                language: &buyer.language,
            },
        };

        let token = self.access_token().await?;
        let response = self
            .http
            .post(self.url(PAYU_ORDER_ENDPOINT))
            .bearer_auth(token)
            .json(&order)
            .send()
            .await?;

        let status = response.status();
        if !(status.is_success() || status.is_redirection()) {
            warn!(status = %status, payment_id = %payment.id, "PayU order creation refused");
            return Err(AppError::Gateway("PayU rejected the order".to_string()));
        }

        let body: OrderResponse = response.json().await?;
        debug!(payment_id = %payment.id, order_id = ?body.order_id, "PayU order created");

        match (body.order_id, body.redirect_uri) {
            (Some(order_id), Some(redirect_uri)) => Ok(CreatedOrder { order_id, redirect_uri }),
            _ => Err(AppError::Gateway("PayU response without order".to_string())),
        }
    }
}

/// Body of a PayU order notification
#[derive(Debug, Clone, Deserialize)]
pub struct Notification {
    pub order: NotifiedOrder,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotifiedOrder {
    pub order_id: String,
    /// Minor units, sent as a string
    pub total_amount: String,
    pub currency_code: String,
    pub status: String,
}

impl Notification {
    pub fn parse(body: &[u8]) -> Option<Self> {
        serde_json::from_slice(body).ok()
    }
}

/// Why a notification was not trusted
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum NotificationMismatch {
    #[error("order was not registered for this payment")]
    OrderId,
    #[error("amount does not match")]
    Amount,
    #[error("currency does not match")]
    Currency,
}

/// Map a PayU order status onto ours; statuses we do not track yield `None`
pub fn map_status(status: &str) -> Option<PaymentStatus> {
    match status {
        "PENDING" | "WAITING_FOR_CONFIRMATION" => Some(PaymentStatus::Awaiting),
        "COMPLETED" => Some(PaymentStatus::Ok),
        "CANCELED" => Some(PaymentStatus::Canceled),
        _ => None,
    }
}

/// Compare the notification with the stored payment and the orders
/// registered for it before trusting its status
pub fn verify(
    payment: &Payment,
    orders: &[String],
    order: &NotifiedOrder,
) -> Result<Option<PaymentStatus>, NotificationMismatch> {
    if !orders.iter().any(|id| *id == order.order_id) {
        return Err(NotificationMismatch::OrderId);
    }
    let notified: Option<i64> = order.total_amount.trim().parse().ok();
    if notified.is_none() || notified != payment.amount_minor() {
        return Err(NotificationMismatch::Amount);
    }
    if payment.currency != order.currency_code {
        return Err(NotificationMismatch::Currency);
    }
    Ok(map_status(&order.status))
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use rust_decimal::Decimal;
    use uuid::Uuid;

    use super::*;

    fn payment() -> Payment {
        Payment {
            id: Uuid::new_v4(),
            method_id: Uuid::new_v4(),
            method_code: "payu".to_string(),
            user_id: Uuid::new_v4(),
            contest_id: Uuid::new_v4(),
            amount: Decimal::new(21000, 2),
            currency: "PLN".to_string(),
            status: PaymentStatus::Created,
            code: Some("WZHF5FFDRJ140731GUEST000P01".to_string()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn orders() -> Vec<String> {
        vec!["WZHF5FFDRJ140731GUEST000P01".to_string()]
    }

    fn notification(body: &str) -> NotifiedOrder {
        Notification::parse(body.as_bytes()).unwrap().order
    }

    #[test]
    fn test_completed_notification_is_trusted() {
        let order = notification(
            r#"{"order":{"orderId":"WZHF5FFDRJ140731GUEST000P01","totalAmount":"21000","currencyCode":"PLN","status":"COMPLETED"}}"#,
        );
        assert_eq!(verify(&payment(), &orders(), &order), Ok(Some(PaymentStatus::Ok)));
    }

    #[test]
    fn test_amount_mismatch_rejected() {
        let order = notification(
            r#"{"order":{"orderId":"WZHF5FFDRJ140731GUEST000P01","totalAmount":"100","currencyCode":"PLN","status":"COMPLETED"}}"#,
        );
        assert_eq!(verify(&payment(), &orders(), &order), Err(NotificationMismatch::Amount));
    }

    #[test]
    fn test_currency_and_order_mismatch_rejected() {
        let mut order = notification(
            r#"{"order":{"orderId":"WZHF5FFDRJ140731GUEST000P01","totalAmount":"21000","currencyCode":"EUR","status":"COMPLETED"}}"#,
        );
        assert_eq!(verify(&payment(), &orders(), &order), Err(NotificationMismatch::Currency));

        order.order_id = "OTHER".to_string();
        assert_eq!(verify(&payment(), &orders(), &order), Err(NotificationMismatch::OrderId));
    }

    #[test]
    fn test_earlier_order_still_settles() {
        let mut p = payment();
        p.code = Some("SECOND000P01".to_string());
        let orders = vec!["WZHF5FFDRJ140731GUEST000P01".to_string(), "SECOND000P01".to_string()];

        let order = notification(
            r#"{"order":{"orderId":"WZHF5FFDRJ140731GUEST000P01","totalAmount":"21000","currencyCode":"PLN","status":"COMPLETED"}}"#,
        );
        assert_eq!(verify(&p, &orders, &order), Ok(Some(PaymentStatus::Ok)));
        assert_eq!(verify(&p, &orders[1..], &order), Err(NotificationMismatch::OrderId));
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(map_status("PENDING"), Some(PaymentStatus::Awaiting));
        assert_eq!(map_status("WAITING_FOR_CONFIRMATION"), Some(PaymentStatus::Awaiting));
        assert_eq!(map_status("CANCELED"), Some(PaymentStatus::Canceled));
        assert_eq!(map_status("NEW"), None);
    }

    #[test]
    fn test_malformed_body_is_not_a_notification() {
        assert!(Notification::parse(b"{\"order\":{}}").is_none());
        assert!(Notification::parse(b"not json").is_none());
    }
}
