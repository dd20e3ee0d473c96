//! GetSubscriptionInfoHandler - Query handler for the plan summary screen.

use std::sync::Arc;

use crate::application::quota::QuotaResolver;
use crate::domain::foundation::{DomainError, UserId};
use crate::domain::subscription::{PlanType, SubscriptionDetails, AI_ENHANCEMENT};
use crate::ports::SubscriptionRepository;

#[derive(Debug, Clone)]
pub struct GetSubscriptionInfoQuery {
    pub user_id: UserId,
}

/// Active plan, usage and add-ons. Users without an active subscription
/// get the free-tier view with `subscription` unset.
#[derive(Debug, Clone, serde::Serialize)]
pub struct SubscriptionInfo {
    pub subscription: Option<SubscriptionDetails>,
    pub plan_name: String,
    pub plan_type: PlanType,
    /// `-1` when unlimited.
    pub max_products: i64,
    pub current_products: u32,
    pub can_add_product: bool,
    pub has_ai_enhancement: bool,
}

pub struct GetSubscriptionInfoHandler {
    subscriptions: Arc<dyn SubscriptionRepository>,
    quota: Arc<QuotaResolver>,
}

impl GetSubscriptionInfoHandler {
    pub fn new(subscriptions: Arc<dyn SubscriptionRepository>, quota: Arc<QuotaResolver>) -> Self {
        Self {
            subscriptions,
            quota,
        }
    }

    pub async fn handle(&self, query: GetSubscriptionInfoQuery) -> Result<SubscriptionInfo, DomainError> {
        let details = self.subscriptions.find_active(&query.user_id).await?;
        let quota = self.quota.resolve(&query.user_id).await?;

        let plan_name = details
            .as_ref()
            .map(|d| d.plan_name.clone())
            .unwrap_or_else(|| quota.plan_type.display_name().to_string());
        let has_ai_enhancement = details
            .as_ref()
            .map(|d| d.has_addon(AI_ENHANCEMENT))
            .unwrap_or(false);

        Ok(SubscriptionInfo {
            subscription: details,
            plan_name,
            plan_type: quota.plan_type,
            max_products: quota.max_products(),
            current_products: quota.current_count,
            can_add_product: quota.allowed,
            has_ai_enhancement,
        })
    }
}
