//! Subscription domain - plans, add-ons, subscriptions, quotas and payments.

mod aggregate;
mod payment;
mod plan;
mod plan_type;
mod quota;
mod status;

pub use aggregate::{
    AttachedAddon, Subscription, SubscriptionDetails, SubscriptionRequest, DEFAULT_PERIOD_DAYS,
};
pub use payment::{Payment, PaymentStatus};
pub use plan::{PlanCatalogue, SubscriptionAddon, SubscriptionPlan, AI_ENHANCEMENT};
pub use plan_type::PlanType;
pub use quota::{
    resolve_product_quota, PlanAllowance, ProductLimit, ProductQuota, DEFAULT_FREE_TIER_LIMIT,
    UNLIMITED_SENTINEL,
};
pub use status::{AddonStatus, SubscriptionStatus};
