//! Payment log entries.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::domain::foundation::{
    DomainError, ErrorCode, PaymentId, SubscriptionId, Timestamp, UserId,
};
use crate::domain::settings::Currency;

/// Outcome of a payment as reported by the billing provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Succeeded,
    Failed,
    Refunded,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Succeeded => "succeeded",
            PaymentStatus::Failed => "failed",
            PaymentStatus::Refunded => "refunded",
        }
    }
}

impl FromStr for PaymentStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(PaymentStatus::Pending),
            "succeeded" => Ok(PaymentStatus::Succeeded),
            "failed" => Ok(PaymentStatus::Failed),
            "refunded" => Ok(PaymentStatus::Refunded),
            _ => Err(DomainError::new(
                ErrorCode::InvalidFormat,
                format!("Invalid payment status: {}", s.trim()),
            )
            .with_detail("field", "status")),
        }
    }
}

/// A recorded payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Payment {
    pub id: PaymentId,
    pub user_id: UserId,
    pub subscription_id: Option<SubscriptionId>,
    pub stripe_payment_intent_id: Option<String>,
    pub amount: Decimal,
    pub currency: Currency,
    pub status: PaymentStatus,
    pub description: Option<String>,
    pub created_at: Timestamp,
}

impl Payment {
    /// Validates and builds a payment record.
    #[allow(clippy::too_many_arguments)]
    pub fn record(
        user_id: UserId,
        subscription_id: Option<SubscriptionId>,
        stripe_payment_intent_id: Option<&str>,
        amount: Decimal,
        currency: &str,
        status: &str,
        description: Option<&str>,
        now: Timestamp,
    ) -> Result<Self, DomainError> {
        if amount < Decimal::ZERO {
            return Err(DomainError::validation("amount", "Payment amount cannot be negative"));
        }
        let currency: Currency = currency.parse()?;
        let status: PaymentStatus = status.parse()?;

        Ok(Self {
            id: PaymentId::new(),
            user_id,
            subscription_id,
            stripe_payment_intent_id: trimmed(stripe_payment_intent_id),
            amount: amount.round_dp(2),
            currency,
            status,
            description: trimmed(description),
            created_at: now,
        })
    }
}

fn trimmed(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(amount: Decimal, currency: &str, status: &str) -> Result<Payment, DomainError> {
        Payment::record(
            UserId::new(),
            None,
            Some(" pi_123 "),
            amount,
            currency,
            status,
            Some("Unlimited plan"),
            Timestamp::now(),
        )
    }

    #[test]
    fn records_valid_payment() {
        let payment = record(Decimal::new(14500, 2), "usd", "succeeded").unwrap();
        assert_eq!(payment.currency, Currency::Usd);
        assert_eq!(payment.status, PaymentStatus::Succeeded);
        assert_eq!(payment.stripe_payment_intent_id.as_deref(), Some("pi_123"));
    }

    #[test]
    fn zero_amount_is_allowed() {
        assert!(record(Decimal::ZERO, "USD", "pending").is_ok());
    }

    #[test]
    fn rejects_negative_amount() {
        let err = record(Decimal::new(-100, 2), "USD", "failed").unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
    }

    #[test]
    fn rejects_unknown_status_and_currency() {
        assert!(record(Decimal::ONE, "USD", "lost").is_err());
        assert!(record(Decimal::ONE, "XYZ", "pending").is_err());
    }
}
