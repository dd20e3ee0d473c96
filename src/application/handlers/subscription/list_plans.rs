//! ListPlansHandler - Query handler for the public plan catalogue.

use std::sync::Arc;

use crate::domain::foundation::DomainError;
use crate::domain::subscription::PlanCatalogue;
use crate::ports::SubscriptionRepository;

pub type ListPlansResult = PlanCatalogue;

pub struct ListPlansHandler {
    subscriptions: Arc<dyn SubscriptionRepository>,
}

impl ListPlansHandler {
    pub fn new(subscriptions: Arc<dyn SubscriptionRepository>) -> Self {
        Self { subscriptions }
    }

    /// Active plans cheapest first, plus active add-ons.
    pub async fn handle(&self) -> Result<ListPlansResult, DomainError> {
        let plans = self.subscriptions.list_plans().await?;
        let addons = self.subscriptions.list_addons().await?;
        Ok(PlanCatalogue { plans, addons })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemoryStore;
    use crate::domain::subscription::{PlanType, SubscriptionPlan};

    #[tokio::test]
    async fn lists_active_catalogue() {
        let store = InMemoryStore::with_default_catalogue();
        let mut retired = SubscriptionPlan::default_for(PlanType::Unlimited);
        retired.is_active = false;
        store.upsert_plan(retired).await;

        let catalogue = ListPlansHandler::new(Arc::new(store)).handle().await.unwrap();
        let types: Vec<PlanType> = catalogue.plans.iter().map(|p| p.plan_type).collect();
        assert_eq!(types, vec![PlanType::Free, PlanType::PayAsYouGo]);
        assert_eq!(catalogue.addons.len(), 1);
    }

    #[tokio::test]
    async fn empty_catalogue_is_empty() {
        let catalogue = ListPlansHandler::new(Arc::new(InMemoryStore::new()))
            .handle()
            .await
            .unwrap();
        assert!(catalogue.plans.is_empty());
        assert!(catalogue.addons.is_empty());
    }
}
