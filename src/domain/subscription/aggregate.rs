//! User subscription entity and the inputs that create or change it.

use rust_decimal::Decimal;
use serde::Serialize;

use super::{AddonStatus, PlanType, SubscriptionStatus};
use crate::domain::foundation::{
    AddonId, DomainError, ErrorCode, PlanId, StateMachine, SubscriptionAddonId, SubscriptionId,
    Timestamp, UserId,
};

/// Billing period length used when the caller does not supply one.
pub const DEFAULT_PERIOD_DAYS: i64 = 30;

/// A user's subscription to one plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Subscription {
    pub id: SubscriptionId,
    pub user_id: UserId,
    pub plan_id: PlanId,
    pub status: SubscriptionStatus,
    /// Overrides the plan's `max_products` when set.
    pub custom_product_limit: Option<i32>,
    pub stripe_customer_id: Option<String>,
    pub stripe_subscription_id: Option<String>,
    pub stripe_session_id: Option<String>,
    pub current_period_start: Timestamp,
    /// None for plans that never renew (free).
    pub current_period_end: Option<Timestamp>,
    pub cancel_at_period_end: bool,
    pub cancelled_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Subscription {
    /// Active free-plan subscription with an open-ended period.
    pub fn free(user_id: UserId, plan_id: PlanId, now: Timestamp) -> Self {
        Self {
            id: SubscriptionId::new(),
            user_id,
            plan_id,
            status: SubscriptionStatus::Active,
            custom_product_limit: None,
            stripe_customer_id: None,
            stripe_subscription_id: None,
            stripe_session_id: None,
            current_period_start: now,
            current_period_end: None,
            cancel_at_period_end: false,
            cancelled_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Active subscription built from a validated checkout request.
    pub fn start(user_id: UserId, plan_id: PlanId, request: &SubscriptionRequest, now: Timestamp) -> Self {
        Self {
            id: SubscriptionId::new(),
            user_id,
            plan_id,
            status: SubscriptionStatus::Active,
            custom_product_limit: request.custom_product_limit,
            stripe_customer_id: request.stripe_customer_id.clone(),
            stripe_subscription_id: request.stripe_subscription_id.clone(),
            stripe_session_id: request.stripe_session_id.clone(),
            current_period_start: request.period_start,
            current_period_end: Some(request.period_end),
            cancel_at_period_end: false,
            cancelled_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == SubscriptionStatus::Active
    }

    /// Ends the subscription now.
    pub fn cancel(&mut self, now: Timestamp) -> Result<(), DomainError> {
        self.status = self.status.transition_to(SubscriptionStatus::Cancelled).map_err(|e| {
            DomainError::new(ErrorCode::InvalidStateTransition, e.to_string())
        })?;
        self.cancelled_at = Some(now);
        self.updated_at = now;
        Ok(())
    }

    /// Flags the subscription to end when the current period does.
    pub fn schedule_cancellation(&mut self, now: Timestamp) -> Result<(), DomainError> {
        if !self.is_active() {
            return Err(DomainError::new(
                ErrorCode::InvalidStateTransition,
                "Only active subscriptions can be cancelled",
            ));
        }
        if self.cancel_at_period_end {
            return Err(DomainError::new(
                ErrorCode::CancellationNotAllowed,
                "Subscription is already scheduled to cancel at period end",
            ));
        }
        self.cancel_at_period_end = true;
        self.updated_at = now;
        Ok(())
    }
}

/// Validated input for creating or replacing a subscription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionRequest {
    pub plan_type: PlanType,
    pub custom_product_limit: Option<i32>,
    pub stripe_customer_id: Option<String>,
    pub stripe_subscription_id: Option<String>,
    pub stripe_session_id: Option<String>,
    pub period_start: Timestamp,
    pub period_end: Timestamp,
}

impl SubscriptionRequest {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        plan_type: &str,
        custom_product_limit: Option<i32>,
        stripe_customer_id: Option<&str>,
        stripe_subscription_id: Option<&str>,
        stripe_session_id: Option<&str>,
        period_start: Option<Timestamp>,
        period_end: Option<Timestamp>,
        now: Timestamp,
    ) -> Result<Self, DomainError> {
        let plan_type: PlanType = plan_type.parse()?;

        if let Some(limit) = custom_product_limit {
            if limit < 1 {
                return Err(DomainError::new(
                    ErrorCode::OutOfRange,
                    "Custom product limit must be at least 1",
                )
                .with_detail("field", "custom_product_limit"));
            }
        }
        let period_start = period_start.unwrap_or(now);
        let period_end = period_end.unwrap_or_else(|| period_start.plus_days(DEFAULT_PERIOD_DAYS));
        if period_end.is_before(&period_start) {
            return Err(DomainError::validation(
                "current_period_end",
                "Period end must not be before period start",
            ));
        }

        Ok(Self {
            plan_type,
            custom_product_limit,
            stripe_customer_id: non_blank(stripe_customer_id),
            stripe_subscription_id: non_blank(stripe_subscription_id),
            stripe_session_id: non_blank(stripe_session_id),
            period_start,
            period_end,
        })
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// An add-on attached to a subscription.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttachedAddon {
    pub id: SubscriptionAddonId,
    pub subscription_id: SubscriptionId,
    pub addon_id: AddonId,
    pub addon_name: String,
    pub stripe_subscription_item_id: Option<String>,
    pub status: AddonStatus,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl AttachedAddon {
    pub fn attach(
        subscription_id: SubscriptionId,
        addon_id: AddonId,
        addon_name: impl Into<String>,
        stripe_subscription_item_id: Option<&str>,
        now: Timestamp,
    ) -> Self {
        Self {
            id: SubscriptionAddonId::new(),
            subscription_id,
            addon_id,
            addon_name: addon_name.into(),
            stripe_subscription_item_id: non_blank(stripe_subscription_item_id),
            status: AddonStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }
}

/// An active subscription joined with its plan and live add-ons.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubscriptionDetails {
    pub subscription: Subscription,
    pub plan_name: String,
    pub plan_type: PlanType,
    pub price_per_month: Decimal,
    pub price_per_product: Option<Decimal>,
    pub plan_max_products: Option<i32>,
    pub addons: Vec<String>,
}

impl SubscriptionDetails {
    pub fn has_addon(&self, name: &str) -> bool {
        self.addons.iter().any(|a| a.eq_ignore_ascii_case(name))
    }
}
