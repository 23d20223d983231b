//! Payment request DTOs

use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct CreatePaymentRequest {
    #[validate(length(min = 1))]
    pub entry_ids: Vec<Uuid>,
    /// Payment method code
    #[validate(length(min = 1, max = 20))]
    pub method: String,
}

/// Outcome picked on the tester bypass form
#[derive(Debug, Deserialize)]
pub struct FakePaymentRequest {
    pub successful: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct PendingPaymentsQuery {
    pub contest: Option<String>,
}
