//! Product quota resolution against live storage.

use std::sync::Arc;

use crate::domain::foundation::{DomainError, UserId};
use crate::domain::subscription::{resolve_product_quota, PlanAllowance, PlanType, ProductQuota};
use crate::ports::{ProductRepository, SubscriptionRepository};

/// Loads what the quota rule needs and applies it.
///
/// Shared by the limit check, the subscription summary and product creation
/// so all three agree on the same number.
pub struct QuotaResolver {
    products: Arc<dyn ProductRepository>,
    subscriptions: Arc<dyn SubscriptionRepository>,
    fallback_limit: u32,
}

impl QuotaResolver {
    pub fn new(
        products: Arc<dyn ProductRepository>,
        subscriptions: Arc<dyn SubscriptionRepository>,
        fallback_limit: u32,
    ) -> Self {
        Self {
            products,
            subscriptions,
            fallback_limit,
        }
    }

    pub async fn resolve(&self, user_id: &UserId) -> Result<ProductQuota, DomainError> {
        let current_count = self.products.count_active(user_id).await?;
        let active = self.subscriptions.find_active(user_id).await?;

        let allowance = active.map(|details| PlanAllowance {
            plan_type: details.plan_type,
            max_products: details.plan_max_products,
            custom_product_limit: details.subscription.custom_product_limit,
        });
        let free_plan = match allowance {
            Some(_) => None,
            None => self.subscriptions.find_plan_by_type(PlanType::Free).await?,
        };

        Ok(resolve_product_quota(
            current_count,
            allowance,
            free_plan.as_ref(),
            self.fallback_limit,
        ))
    }
}
