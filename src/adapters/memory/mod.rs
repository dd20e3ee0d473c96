//! In-memory adapter.
//!
//! Implements every port over one shared state guarded by a single
//! `RwLock`, so multi-table operations are as atomic as their PostgreSQL
//! transactions. Useful for:
//! - Handler and integration tests
//! - Local experimentation without a database
//!
//! Does not persist data across restarts.

mod account;
mod product;
mod settings;
mod subscription;

use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::account::{ActivityEntry, PasswordHash, ResetTokenRecord, User};
use crate::domain::foundation::{ProductId, Timestamp, UserId};
use crate::domain::product::{ProductStatus, TrackedProduct};
use crate::domain::settings::UserSettings;
use crate::domain::subscription::{
    AddonStatus, AttachedAddon, Payment, PlanType, Subscription, SubscriptionAddon,
    SubscriptionPlan,
};

#[derive(Debug, Clone)]
struct StoredUser {
    user: User,
    password_hash: PasswordHash,
}

#[derive(Debug, Clone)]
struct PriceObservation {
    product_id: ProductId,
    price: Decimal,
}

#[derive(Debug, Default)]
struct MemoryState {
    users: HashMap<UserId, StoredUser>,
    settings: HashMap<UserId, UserSettings>,
    plans: Vec<SubscriptionPlan>,
    addons: Vec<SubscriptionAddon>,
    subscriptions: Vec<Subscription>,
    attached_addons: Vec<AttachedAddon>,
    payments: Vec<Payment>,
    products: Vec<TrackedProduct>,
    price_history: Vec<PriceObservation>,
    activity: Vec<ActivityEntry>,
    reset_tokens: Vec<ResetTokenRecord>,
}

impl MemoryState {
    fn plan_by_type(&self, plan_type: PlanType) -> Option<&SubscriptionPlan> {
        self.plans.iter().find(|p| p.plan_type == plan_type)
    }

    fn active_user(&self, user_id: &UserId) -> Option<&StoredUser> {
        self.users.get(user_id).filter(|u| u.user.is_active)
    }

    fn active_subscriptions_mut<'a>(
        &'a mut self,
        user_id: &'a UserId,
    ) -> impl Iterator<Item = &'a mut Subscription> + 'a {
        self.subscriptions
            .iter_mut()
            .filter(move |s| &s.user_id == user_id && s.is_active())
    }

    fn cancel_addons_of(&mut self, subscription: &Subscription, now: Timestamp) {
        for addon in self
            .attached_addons
            .iter_mut()
            .filter(|a| a.subscription_id == subscription.id && a.status == AddonStatus::Active)
        {
            addon.status = AddonStatus::Cancelled;
            addon.updated_at = now;
        }
    }

    fn count_active_products(&self, user_id: &UserId) -> u32 {
        self.products
            .iter()
            .filter(|p| &p.user_id == user_id && p.is_active)
            .count() as u32
    }
}

/// In-memory implementation of all StockWatch ports.
///
/// Cloning shares the underlying state.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    state: Arc<RwLock<MemoryState>>,
}

impl InMemoryStore {
    /// Creates an empty store with no plans or add-ons.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store seeded with the same catalogue as the migrations:
    /// free, pay-as-you-go and unlimited plans plus the AI Enhancement add-on.
    pub fn with_default_catalogue() -> Self {
        let state = MemoryState {
            plans: vec![
                SubscriptionPlan::default_for(PlanType::Free),
                SubscriptionPlan::default_for(PlanType::PayAsYouGo),
                SubscriptionPlan::default_for(PlanType::Unlimited),
            ],
            addons: vec![SubscriptionAddon::ai_enhancement()],
            ..Default::default()
        };
        Self {
            state: Arc::new(RwLock::new(state)),
        }
    }

    /// Adds or replaces the plan row for its type.
    pub async fn upsert_plan(&self, plan: SubscriptionPlan) {
        let mut state = self.state.write().await;
        state.plans.retain(|p| p.plan_type != plan.plan_type);
        state.plans.push(plan);
    }

    /// Deletes the plan row for a type.
    pub async fn remove_plan(&self, plan_type: PlanType) {
        self.state.write().await.plans.retain(|p| p.plan_type != plan_type);
    }

    /// Disables an account.
    pub async fn deactivate_user(&self, user_id: &UserId) {
        if let Some(stored) = self.state.write().await.users.get_mut(user_id) {
            stored.user.is_active = false;
        }
    }

    /// Records a price check the way the external checker does: appends to
    /// history and updates the product's current price and status.
    pub async fn record_price_check(
        &self,
        product_id: &ProductId,
        price: Decimal,
        status: ProductStatus,
        at: Timestamp,
    ) {
        let mut state = self.state.write().await;
        state.price_history.push(PriceObservation {
            product_id: *product_id,
            price,
        });
        if let Some(product) = state.products.iter_mut().find(|p| &p.id == product_id) {
            if product.current_price != Some(price) {
                product.last_price_change = Some(at);
            }
            product.current_price = Some(price);
            product.status = status;
            product.last_checked_at = Some(at);
        }
    }

    /// Every subscription ever created for a user, oldest first.
    pub async fn subscriptions_for(&self, user_id: &UserId) -> Vec<Subscription> {
        self.state
            .read()
            .await
            .subscriptions
            .iter()
            .filter(|s| &s.user_id == user_id)
            .cloned()
            .collect()
    }

    /// Every product row for a user, including soft-deleted ones.
    pub async fn products_for(&self, user_id: &UserId) -> Vec<TrackedProduct> {
        self.state
            .read()
            .await
            .products
            .iter()
            .filter(|p| &p.user_id == user_id)
            .cloned()
            .collect()
    }

    /// Entire activity log, oldest first.
    pub async fn activity_entries(&self) -> Vec<ActivityEntry> {
        self.state.read().await.activity.clone()
    }

    pub async fn user_count(&self) -> usize {
        self.state.read().await.users.len()
    }

    /// Stored password hash, for asserting resets.
    pub async fn password_hash_of(&self, user_id: &UserId) -> Option<String> {
        self.state
            .read()
            .await
            .users
            .get(user_id)
            .map(|u| u.password_hash.expose().to_string())
    }
}
