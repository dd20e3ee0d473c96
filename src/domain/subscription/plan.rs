//! Plan and add-on catalogue entries.

use rust_decimal::Decimal;
use serde::Serialize;

use super::PlanType;
use crate::domain::foundation::{AddonId, PlanId};

/// Name of the only add-on sold today.
pub const AI_ENHANCEMENT: &str = "AI Enhancement";

/// A row of the plan catalogue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubscriptionPlan {
    pub id: PlanId,
    pub plan_name: String,
    pub plan_type: PlanType,
    pub price_per_month: Decimal,
    pub price_per_product: Option<Decimal>,
    /// None = unlimited.
    pub max_products: Option<i32>,
    pub stripe_price_id: Option<String>,
    pub is_active: bool,
}

impl SubscriptionPlan {
    /// Catalogue entry used when a plan type is requested but has no row yet.
    ///
    /// | Type | Monthly | Per product | Max products |
    /// |------|---------|-------------|--------------|
    /// | free | $0 | - | 2 |
    /// | pay_as_you_go | $0 | $5 | unlimited (purchased count applies) |
    /// | unlimited | $145 | - | unlimited |
    pub fn default_for(plan_type: PlanType) -> Self {
        let (price_per_month, price_per_product, max_products) = match plan_type {
            PlanType::Free => (Decimal::ZERO, None, Some(2)),
            PlanType::PayAsYouGo => (Decimal::ZERO, Some(Decimal::new(500, 2)), None),
            PlanType::Unlimited => (Decimal::new(14500, 2), None, None),
        };
        Self {
            id: PlanId::new(),
            plan_name: plan_type.display_name().to_string(),
            plan_type,
            price_per_month,
            price_per_product,
            max_products,
            stripe_price_id: None,
            is_active: true,
        }
    }
}

/// A row of the add-on catalogue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubscriptionAddon {
    pub id: AddonId,
    pub addon_name: String,
    pub addon_description: Option<String>,
    pub price_per_month: Decimal,
    pub stripe_price_id: Option<String>,
    pub is_active: bool,
}

impl SubscriptionAddon {
    /// The AI Enhancement add-on at $50/month.
    pub fn ai_enhancement() -> Self {
        Self {
            id: AddonId::new(),
            addon_name: AI_ENHANCEMENT.to_string(),
            addon_description: Some(
                "AI-powered price predictions and smarter alert timing".to_string(),
            ),
            price_per_month: Decimal::new(5000, 2),
            stripe_price_id: None,
            is_active: true,
        }
    }

    /// Case-insensitive name match.
    pub fn is_named(&self, name: &str) -> bool {
        self.addon_name.eq_ignore_ascii_case(name.trim())
    }
}

/// Everything a checkout page needs to render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlanCatalogue {
    pub plans: Vec<SubscriptionPlan>,
    pub addons: Vec<SubscriptionAddon>,
}
