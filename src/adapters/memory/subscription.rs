//! Plans, subscriptions, add-ons and payments.

use async_trait::async_trait;

use super::{InMemoryStore, MemoryState};
use crate::domain::foundation::{DomainError, ErrorCode, SubscriptionId, Timestamp, UserId};
use crate::domain::subscription::{
    AddonStatus, AttachedAddon, Payment, PlanType, Subscription, SubscriptionAddon,
    SubscriptionDetails, SubscriptionPlan, SubscriptionRequest,
};
use crate::ports::{PaymentRepository, SubscriptionRepository};

fn subscription_not_found() -> DomainError {
    DomainError::new(ErrorCode::SubscriptionNotFound, "Active subscription not found")
}

impl MemoryState {
    fn details_of(&self, subscription: &Subscription) -> Option<SubscriptionDetails> {
        let plan = self.plans.iter().find(|p| p.id == subscription.plan_id)?;
        let mut addons: Vec<String> = self
            .attached_addons
            .iter()
            .filter(|a| a.subscription_id == subscription.id && a.status == AddonStatus::Active)
            .map(|a| a.addon_name.clone())
            .collect();
        addons.sort();

        Some(SubscriptionDetails {
            subscription: subscription.clone(),
            plan_name: plan.plan_name.clone(),
            plan_type: plan.plan_type,
            price_per_month: plan.price_per_month,
            price_per_product: plan.price_per_product,
            plan_max_products: plan.max_products,
            addons,
        })
    }

    pub(super) fn ensure_active_user(&self, user_id: &UserId) -> Result<(), DomainError> {
        match self.users.get(user_id) {
            None => Err(DomainError::new(ErrorCode::UserNotFound, "User not found")),
            Some(stored) if !stored.user.is_active => Err(DomainError::new(
                ErrorCode::AccountInactive,
                "Account is disabled",
            )),
            Some(_) => Ok(()),
        }
    }

    /// Cancels every active subscription of the user along with its add-ons.
    fn cancel_active_subscriptions(
        &mut self,
        user_id: &UserId,
        now: Timestamp,
    ) -> Result<(), DomainError> {
        let mut replaced = Vec::new();
        for subscription in self.active_subscriptions_mut(user_id) {
            subscription.cancel(now)?;
            replaced.push(subscription.clone());
        }
        for subscription in &replaced {
            self.cancel_addons_of(subscription, now);
        }
        Ok(())
    }
}

#[async_trait]
impl SubscriptionRepository for InMemoryStore {
    async fn list_plans(&self) -> Result<Vec<SubscriptionPlan>, DomainError> {
        let state = self.state.read().await;
        let mut plans: Vec<SubscriptionPlan> =
            state.plans.iter().filter(|p| p.is_active).cloned().collect();
        plans.sort_by(|a, b| {
            a.price_per_month
                .cmp(&b.price_per_month)
                .then(a.price_per_product.cmp(&b.price_per_product))
        });
        Ok(plans)
    }

    async fn list_addons(&self) -> Result<Vec<SubscriptionAddon>, DomainError> {
        let state = self.state.read().await;
        let mut addons: Vec<SubscriptionAddon> =
            state.addons.iter().filter(|a| a.is_active).cloned().collect();
        addons.sort_by(|a, b| a.addon_name.cmp(&b.addon_name));
        Ok(addons)
    }

    async fn find_plan_by_type(
        &self,
        plan_type: PlanType,
    ) -> Result<Option<SubscriptionPlan>, DomainError> {
        Ok(self.state.read().await.plan_by_type(plan_type).cloned())
    }

    async fn find_active(
        &self,
        user_id: &UserId,
    ) -> Result<Option<SubscriptionDetails>, DomainError> {
        let state = self.state.read().await;
        Ok(state
            .subscriptions
            .iter()
            .find(|s| &s.user_id == user_id && s.is_active())
            .and_then(|s| state.details_of(s)))
    }

    async fn find_by_id(&self, id: &SubscriptionId) -> Result<Option<Subscription>, DomainError> {
        let state = self.state.read().await;
        Ok(state.subscriptions.iter().find(|s| &s.id == id).cloned())
    }

    async fn replace_active(
        &self,
        user_id: &UserId,
        request: &SubscriptionRequest,
        now: Timestamp,
    ) -> Result<Subscription, DomainError> {
        let mut state = self.state.write().await;
        state.ensure_active_user(user_id)?;

        let existing = state.plan_by_type(request.plan_type).map(|p| p.id);
        let plan_id = match existing {
            Some(id) => id,
            None => {
                let plan = SubscriptionPlan::default_for(request.plan_type);
                let id = plan.id;
                state.plans.push(plan);
                id
            }
        };

        state.cancel_active_subscriptions(user_id, now)?;

        let subscription = Subscription::start(*user_id, plan_id, request, now);
        state.subscriptions.push(subscription.clone());
        Ok(subscription)
    }

    async fn attach_addon(
        &self,
        subscription_id: &SubscriptionId,
        addon_name: &str,
        stripe_subscription_item_id: Option<&str>,
        now: Timestamp,
    ) -> Result<AttachedAddon, DomainError> {
        let mut state = self.state.write().await;

        if !state
            .subscriptions
            .iter()
            .any(|s| &s.id == subscription_id && s.is_active())
        {
            return Err(subscription_not_found());
        }

        let addon = state
            .addons
            .iter()
            .find(|a| a.is_active && a.is_named(addon_name))
            .cloned()
            .ok_or_else(|| {
                DomainError::new(
                    ErrorCode::AddonNotFound,
                    format!("Add-on not found: {}", addon_name.trim()),
                )
            })?;

        if state.attached_addons.iter().any(|a| {
            &a.subscription_id == subscription_id
                && a.addon_id == addon.id
                && a.status == AddonStatus::Active
        }) {
            return Err(DomainError::new(
                ErrorCode::DuplicateAddon,
                "Add-on is already active on this subscription",
            ));
        }

        let attached = AttachedAddon::attach(
            *subscription_id,
            addon.id,
            addon.addon_name,
            stripe_subscription_item_id,
            now,
        );
        state.attached_addons.push(attached.clone());
        Ok(attached)
    }

    async fn cancel_immediately(
        &self,
        user_id: &UserId,
        subscription_id: &SubscriptionId,
        now: Timestamp,
    ) -> Result<Option<SubscriptionId>, DomainError> {
        let mut state = self.state.write().await;

        let subscription = state
            .subscriptions
            .iter_mut()
            .find(|s| &s.id == subscription_id && &s.user_id == user_id && s.is_active())
            .ok_or_else(subscription_not_found)?;
        subscription.cancel(now)?;
        let cancelled = subscription.clone();
        state.cancel_addons_of(&cancelled, now);

        let free_plan_id = state.plan_by_type(PlanType::Free).map(|p| p.id);
        Ok(free_plan_id.map(|plan_id| {
            let fallback = Subscription::free(*user_id, plan_id, now);
            let id = fallback.id;
            state.subscriptions.push(fallback);
            id
        }))
    }

    async fn save_cancellation_flag(&self, subscription: &Subscription) -> Result<(), DomainError> {
        let mut state = self.state.write().await;
        let stored = state
            .subscriptions
            .iter_mut()
            .find(|s| s.id == subscription.id && s.is_active())
            .ok_or_else(subscription_not_found)?;
        stored.cancel_at_period_end = subscription.cancel_at_period_end;
        stored.updated_at = subscription.updated_at;
        Ok(())
    }
}

#[async_trait]
impl PaymentRepository for InMemoryStore {
    async fn record(&self, payment: &Payment) -> Result<(), DomainError> {
        let mut state = self.state.write().await;
        if !state.users.contains_key(&payment.user_id) {
            return Err(DomainError::new(ErrorCode::UserNotFound, "User not found"));
        }
        state.payments.push(payment.clone());
        Ok(())
    }

    async fn list_for_user(
        &self,
        user_id: &UserId,
        limit: usize,
    ) -> Result<Vec<Payment>, DomainError> {
        let state = self.state.read().await;
        let mut payments: Vec<Payment> = state
            .payments
            .iter()
            .rev()
            .filter(|p| &p.user_id == user_id)
            .cloned()
            .collect();
        payments.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        payments.truncate(limit);
        Ok(payments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::account::NewAccount;
    use crate::domain::subscription::{SubscriptionStatus, AI_ENHANCEMENT};
    use crate::ports::AccountRepository;

    async fn store_with_user() -> (InMemoryStore, UserId) {
        let store = InMemoryStore::with_default_catalogue();
        let account = NewAccount::new("Sam Lee", "sam@example.com", "hash", false).unwrap();
        let created = store.create_account(&account, Timestamp::now()).await.unwrap();
        (store, created.user.id)
    }

    fn unlimited_request() -> SubscriptionRequest {
        SubscriptionRequest::new("unlimited", None, None, None, None, None, None, Timestamp::now())
            .unwrap()
    }

    #[tokio::test]
    async fn replace_active_leaves_exactly_one_active() {
        let (store, user_id) = store_with_user().await;

        store
            .replace_active(&user_id, &unlimited_request(), Timestamp::now())
            .await
            .unwrap();

        let subs = store.subscriptions_for(&user_id).await;
        assert_eq!(subs.len(), 2);
        assert_eq!(subs.iter().filter(|s| s.is_active()).count(), 1);
        assert_eq!(subs[0].status, SubscriptionStatus::Cancelled);
        assert!(subs[0].cancelled_at.is_some());
    }

    #[tokio::test]
    async fn replace_active_creates_missing_plan_row() {
        let (store, user_id) = store_with_user().await;
        store.remove_plan(PlanType::Unlimited).await;

        store
            .replace_active(&user_id, &unlimited_request(), Timestamp::now())
            .await
            .unwrap();

        let plan = store.find_plan_by_type(PlanType::Unlimited).await.unwrap().unwrap();
        assert_eq!(plan.max_products, None);
    }

    #[tokio::test]
    async fn replace_active_rejects_unknown_user() {
        let store = InMemoryStore::with_default_catalogue();
        let err = store
            .replace_active(&UserId::new(), &unlimited_request(), Timestamp::now())
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::UserNotFound);
    }

    #[tokio::test]
    async fn attach_addon_rejects_active_duplicate() {
        let (store, user_id) = store_with_user().await;
        let sub = store
            .replace_active(&user_id, &unlimited_request(), Timestamp::now())
            .await
            .unwrap();

        store
            .attach_addon(&sub.id, "ai enhancement", None, Timestamp::now())
            .await
            .unwrap();
        let err = store
            .attach_addon(&sub.id, AI_ENHANCEMENT, None, Timestamp::now())
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::DuplicateAddon);

        let details = store.find_active(&user_id).await.unwrap().unwrap();
        assert!(details.has_addon(AI_ENHANCEMENT));
    }

    #[tokio::test]
    async fn attach_unknown_addon_fails() {
        let (store, user_id) = store_with_user().await;
        let sub = store.find_active(&user_id).await.unwrap().unwrap().subscription;

        let err = store
            .attach_addon(&sub.id, "Teleportation", None, Timestamp::now())
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::AddonNotFound);
    }

    #[tokio::test]
    async fn cancel_immediately_falls_back_to_free_plan() {
        let (store, user_id) = store_with_user().await;
        let sub = store
            .replace_active(&user_id, &unlimited_request(), Timestamp::now())
            .await
            .unwrap();
        store
            .attach_addon(&sub.id, AI_ENHANCEMENT, None, Timestamp::now())
            .await
            .unwrap();

        let fallback = store
            .cancel_immediately(&user_id, &sub.id, Timestamp::now())
            .await
            .unwrap();

        assert!(fallback.is_some());
        let details = store.find_active(&user_id).await.unwrap().unwrap();
        assert_eq!(details.plan_type, PlanType::Free);
        assert!(details.addons.is_empty());
    }

    #[tokio::test]
    async fn cancel_immediately_without_free_plan_leaves_none_active() {
        let (store, user_id) = store_with_user().await;
        let sub = store
            .replace_active(&user_id, &unlimited_request(), Timestamp::now())
            .await
            .unwrap();
        store.remove_plan(PlanType::Free).await;

        let fallback = store
            .cancel_immediately(&user_id, &sub.id, Timestamp::now())
            .await
            .unwrap();

        assert!(fallback.is_none());
        assert!(store.find_active(&user_id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn plans_are_listed_cheapest_first() {
        let store = InMemoryStore::with_default_catalogue();
        let types: Vec<PlanType> = store
            .list_plans()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.plan_type)
            .collect();
        assert_eq!(
            types,
            vec![PlanType::Free, PlanType::PayAsYouGo, PlanType::Unlimited]
        );
    }
}
