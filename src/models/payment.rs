//! Payment model

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::UnknownVariant;

/// Payment joined with its method code
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Payment {
    pub id: Uuid,
    pub method_id: Uuid,
    pub method_code: String,
    pub user_id: Uuid,
    pub contest_id: Uuid,
    pub amount: Decimal,
    pub currency: String,
    #[sqlx(try_from = "String")]
    pub status: PaymentStatus,
    /// Order id assigned by an online gateway
    pub code: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Payment {
    /// Amount in minor currency units, as gateways exchange it
    pub fn amount_minor(&self) -> Option<i64> {
        use rust_decimal::prelude::ToPrimitive;
        (self.amount * Decimal::ONE_HUNDRED).round().to_i64()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Created,
    Awaiting,
    Ok,
    Failed,
    Canceled,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Awaiting => "awaiting",
            Self::Ok => "ok",
            Self::Failed => "failed",
            Self::Canceled => "canceled",
        }
    }

    /// `ok`, `failed` and `canceled` are final
    pub fn is_final(&self) -> bool {
        matches!(self, Self::Ok | Self::Failed | Self::Canceled)
    }

    pub fn can_transition_to(&self, next: PaymentStatus) -> bool {
        match self {
            Self::Created => next != Self::Created,
            Self::Awaiting => matches!(next, Self::Ok | Self::Failed | Self::Canceled),
            Self::Ok | Self::Failed | Self::Canceled => false,
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "created" => Ok(Self::Created),
            "awaiting" => Ok(Self::Awaiting),
            "ok" => Ok(Self::Ok),
            "failed" => Ok(Self::Failed),
            "canceled" => Ok(Self::Canceled),
            other => Err(UnknownVariant {
                kind: "payment status",
                value: other.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for PaymentStatus {
    type Error = UnknownVariant;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip_through_text() {
        for status in [
            PaymentStatus::Created,
            PaymentStatus::Awaiting,
            PaymentStatus::Ok,
            PaymentStatus::Failed,
            PaymentStatus::Canceled,
        ] {
            assert_eq!(status.as_str().parse::<PaymentStatus>().unwrap(), status);
        }
    }

    #[test]
    fn test_awaiting_cannot_go_back_to_created() {
        assert!(!PaymentStatus::Awaiting.can_transition_to(PaymentStatus::Created));
        assert!(PaymentStatus::Created.can_transition_to(PaymentStatus::Awaiting));
    }

    #[test]
    fn test_amount_minor() {
        let payment = Payment {
            id: Uuid::new_v4(),
            method_id: Uuid::new_v4(),
            method_code: "payu".to_string(),
            user_id: Uuid::new_v4(),
            contest_id: Uuid::new_v4(),
            amount: Decimal::new(21050, 2),
            currency: "PLN".to_string(),
            status: PaymentStatus::Created,
            code: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert_eq!(payment.amount_minor(), Some(21050));
    }
}
