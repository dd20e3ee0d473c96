//! Subscription and add-on lifecycle states.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::domain::foundation::{DomainError, ErrorCode, StateMachine};

/// Status of a user's subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    /// Paid up (or free) and counting towards the user's quota.
    Active,
    /// Payment failed; the billing provider is retrying.
    PastDue,
    /// Replaced or cancelled by the user.
    Cancelled,
    /// Period ended without renewal.
    Expired,
}

impl SubscriptionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionStatus::Active => "active",
            SubscriptionStatus::PastDue => "past_due",
            SubscriptionStatus::Cancelled => "cancelled",
            SubscriptionStatus::Expired => "expired",
        }
    }
}

impl FromStr for SubscriptionStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "active" => Ok(SubscriptionStatus::Active),
            "past_due" => Ok(SubscriptionStatus::PastDue),
            "cancelled" => Ok(SubscriptionStatus::Cancelled),
            "expired" => Ok(SubscriptionStatus::Expired),
            _ => Err(DomainError::new(
                ErrorCode::InvalidFormat,
                format!("Invalid subscription status: {}", s),
            )),
        }
    }
}

impl StateMachine for SubscriptionStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use SubscriptionStatus::*;
        matches!(
            (self, target),
            (Active, PastDue)
                | (Active, Cancelled)
                | (Active, Expired)
                | (PastDue, Active)
                | (PastDue, Cancelled)
                | (PastDue, Expired)
                | (Cancelled, Expired)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use SubscriptionStatus::*;
        match self {
            Active => vec![PastDue, Cancelled, Expired],
            PastDue => vec![Active, Cancelled, Expired],
            Cancelled => vec![Expired],
            Expired => vec![],
        }
    }
}

/// Status of an add-on attached to a subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AddonStatus {
    Active,
    Cancelled,
}

impl AddonStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AddonStatus::Active => "active",
            AddonStatus::Cancelled => "cancelled",
        }
    }
}

impl FromStr for AddonStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "active" => Ok(AddonStatus::Active),
            "cancelled" => Ok(AddonStatus::Cancelled),
            _ => Err(DomainError::new(
                ErrorCode::InvalidFormat,
                format!("Invalid add-on status: {}", s),
            )),
        }
    }
}
