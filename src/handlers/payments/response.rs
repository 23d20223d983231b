//! Payment response DTOs

use serde::Serialize;

use crate::models::Payment;

#[derive(Debug, Serialize)]
pub struct PaymentResponse {
    #[serde(flatten)]
    pub payment: Payment,
    pub entry_codes: Vec<i32>,
    /// Bank transfer instructions, only for transfer payments
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transfer_info: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RedirectResponse {
    pub redirect_uri: String,
}
