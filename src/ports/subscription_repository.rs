//! Subscription repository port.
//!
//! Covers the plan and add-on catalogue, user subscriptions and attached
//! add-ons. Every mutating method runs in one transaction that locks the
//! owning user row, so a user never ends up with two active subscriptions.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, SubscriptionId, Timestamp, UserId};
use crate::domain::subscription::{
    AttachedAddon, PlanType, Subscription, SubscriptionAddon, SubscriptionDetails,
    SubscriptionPlan, SubscriptionRequest,
};

#[async_trait]
pub trait SubscriptionRepository: Send + Sync {
    /// Active plans, cheapest first.
    async fn list_plans(&self) -> Result<Vec<SubscriptionPlan>, DomainError>;

    /// Active add-ons, by name.
    async fn list_addons(&self) -> Result<Vec<SubscriptionAddon>, DomainError>;

    /// The plan row for a type, if one exists.
    async fn find_plan_by_type(
        &self,
        plan_type: PlanType,
    ) -> Result<Option<SubscriptionPlan>, DomainError>;

    /// The user's active subscription with its plan and live add-ons.
    async fn find_active(&self, user_id: &UserId)
        -> Result<Option<SubscriptionDetails>, DomainError>;

    async fn find_by_id(&self, id: &SubscriptionId) -> Result<Option<Subscription>, DomainError>;

    /// Replaces the user's active subscription.
    ///
    /// Creates the plan row from defaults if the type has none, cancels every
    /// active subscription of the user (and their add-ons), then inserts the
    /// new active one.
    ///
    /// # Errors
    ///
    /// - `UserNotFound` / `AccountInactive` for a missing or disabled user
    async fn replace_active(
        &self,
        user_id: &UserId,
        request: &SubscriptionRequest,
        now: Timestamp,
    ) -> Result<Subscription, DomainError>;

    /// Attaches a catalogue add-on to an active subscription.
    ///
    /// # Errors
    ///
    /// - `SubscriptionNotFound` if the subscription is missing or not active
    /// - `AddonNotFound` if no active add-on has this name (case-insensitive)
    /// - `DuplicateAddon` if it is already attached and active
    async fn attach_addon(
        &self,
        subscription_id: &SubscriptionId,
        addon_name: &str,
        stripe_subscription_item_id: Option<&str>,
        now: Timestamp,
    ) -> Result<AttachedAddon, DomainError>;

    /// Cancels the given active subscription and its add-ons right away,
    /// then subscribes the user to the free plan if one exists.
    ///
    /// Returns the fallback free subscription, if one was created.
    ///
    /// # Errors
    ///
    /// - `SubscriptionNotFound` if it is no longer the user's active subscription
    async fn cancel_immediately(
        &self,
        user_id: &UserId,
        subscription_id: &SubscriptionId,
        now: Timestamp,
    ) -> Result<Option<SubscriptionId>, DomainError>;

    /// Persists `cancel_at_period_end` and `updated_at` of an active subscription.
    async fn save_cancellation_flag(&self, subscription: &Subscription) -> Result<(), DomainError>;
}
