//! Subscription plan types.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::{DomainError, ErrorCode};

/// The three plan families StockWatch sells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanType {
    /// Default tier, small fixed product cap.
    Free,
    /// Billed per tracked product; the purchased count is the cap.
    PayAsYouGo,
    /// Flat monthly price, no cap.
    Unlimited,
}

impl PlanType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanType::Free => "free",
            PlanType::PayAsYouGo => "pay_as_you_go",
            PlanType::Unlimited => "unlimited",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            PlanType::Free => "Free",
            PlanType::PayAsYouGo => "Pay As You Go",
            PlanType::Unlimited => "Unlimited",
        }
    }

    pub fn is_paid(&self) -> bool {
        !matches!(self, PlanType::Free)
    }
}

impl fmt::Display for PlanType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlanType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "free" => Ok(PlanType::Free),
            "pay_as_you_go" => Ok(PlanType::PayAsYouGo),
            "unlimited" => Ok(PlanType::Unlimited),
            _ => Err(DomainError::new(ErrorCode::InvalidPlanType, "Invalid plan type.")
                .with_detail("plan_type", s.trim())),
        }
    }
}
