//! Product quota resolution.
//!
//! The single place that turns a user's plan, any per-user override, and
//! their current product count into "may they add another product?".
//! Both the limit check and the add-product path go through
//! [`resolve_product_quota`].

use super::{PlanType, SubscriptionPlan};

/// Value reported to callers in place of a cap for unlimited plans.
pub const UNLIMITED_SENTINEL: i64 = -1;

/// Free-tier cap used only when the plan catalogue has no free plan.
pub const DEFAULT_FREE_TIER_LIMIT: u32 = 2;

/// Effective cap on active products.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductLimit {
    Limited(u32),
    Unlimited,
}

impl ProductLimit {
    /// Builds a limit from a nullable column. `None` means unlimited.
    pub fn from_max(max_products: Option<i32>) -> Self {
        match max_products {
            Some(max) => ProductLimit::Limited(max.max(0) as u32),
            None => ProductLimit::Unlimited,
        }
    }

    /// True if one more product fits on top of `current_count`.
    pub fn allows(&self, current_count: u32) -> bool {
        match self {
            ProductLimit::Limited(max) => current_count < *max,
            ProductLimit::Unlimited => true,
        }
    }

    /// Cap as reported to callers, `-1` for unlimited.
    pub fn reported(&self) -> i64 {
        match self {
            ProductLimit::Limited(max) => i64::from(*max),
            ProductLimit::Unlimited => UNLIMITED_SENTINEL,
        }
    }

    pub fn is_unlimited(&self) -> bool {
        matches!(self, ProductLimit::Unlimited)
    }
}

/// What the active subscription contributes to quota resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanAllowance {
    pub plan_type: PlanType,
    pub max_products: Option<i32>,
    pub custom_product_limit: Option<i32>,
}

/// Outcome of quota resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProductQuota {
    pub allowed: bool,
    pub current_count: u32,
    pub limit: ProductLimit,
    pub plan_type: PlanType,
}

impl ProductQuota {
    /// Cap as reported to callers, `-1` for unlimited.
    pub fn max_products(&self) -> i64 {
        self.limit.reported()
    }

    /// Products that can still be added, `None` when unlimited.
    pub fn remaining(&self) -> Option<u32> {
        match self.limit {
            ProductLimit::Limited(max) => Some(max.saturating_sub(self.current_count)),
            ProductLimit::Unlimited => None,
        }
    }
}

/// Resolves the effective product quota.
///
/// - With an active subscription the per-user override wins over the plan's
///   `max_products`.
/// - Without one, the free plan row from the catalogue applies; only when
///   that row is missing does `fallback_limit` apply.
/// - Unlimited plan types and null limits always allow another product.
pub fn resolve_product_quota(
    current_count: u32,
    active: Option<PlanAllowance>,
    free_plan: Option<&SubscriptionPlan>,
    fallback_limit: u32,
) -> ProductQuota {
    let (plan_type, limit) = match active {
        Some(allowance) if allowance.plan_type == PlanType::Unlimited => {
            (PlanType::Unlimited, ProductLimit::Unlimited)
        }
        Some(allowance) => (
            allowance.plan_type,
            ProductLimit::from_max(allowance.custom_product_limit.or(allowance.max_products)),
        ),
        None => match free_plan {
            Some(plan) => (PlanType::Free, ProductLimit::from_max(plan.max_products)),
            None => (PlanType::Free, ProductLimit::Limited(fallback_limit)),
        },
    };

    ProductQuota {
        allowed: limit.allows(current_count),
        current_count,
        limit,
        plan_type,
    }
}
