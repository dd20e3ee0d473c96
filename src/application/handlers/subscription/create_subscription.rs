//! CreateSubscriptionHandler - Command handler for completed checkouts.
//!
//! Replaces whatever the user is subscribed to with the requested plan.

use std::sync::Arc;

use crate::application::audit::audit;
use crate::domain::account::{ActivityEntry, ActivityType};
use crate::domain::foundation::{DomainError, Timestamp, UserId};
use crate::domain::subscription::{Subscription, SubscriptionRequest};
use crate::ports::{ActivityLog, SubscriptionRepository};

#[derive(Debug, Clone)]
pub struct CreateSubscriptionCommand {
    pub user_id: UserId,
    pub plan_type: String,
    /// Overrides the plan's cap; must be at least 1 when given.
    pub custom_product_limit: Option<i32>,
    pub stripe_customer_id: Option<String>,
    pub stripe_subscription_id: Option<String>,
    pub stripe_session_id: Option<String>,
    /// Defaults to now.
    pub current_period_start: Option<Timestamp>,
    /// Defaults to 30 days after the start.
    pub current_period_end: Option<Timestamp>,
}

impl CreateSubscriptionCommand {
    /// Command with no billing references or explicit period.
    pub fn plan(user_id: UserId, plan_type: impl Into<String>, custom_product_limit: Option<i32>) -> Self {
        Self {
            user_id,
            plan_type: plan_type.into(),
            custom_product_limit,
            stripe_customer_id: None,
            stripe_subscription_id: None,
            stripe_session_id: None,
            current_period_start: None,
            current_period_end: None,
        }
    }
}

pub type CreateSubscriptionResult = Subscription;

pub struct CreateSubscriptionHandler {
    subscriptions: Arc<dyn SubscriptionRepository>,
    activity: Arc<dyn ActivityLog>,
}

impl CreateSubscriptionHandler {
    pub fn new(subscriptions: Arc<dyn SubscriptionRepository>, activity: Arc<dyn ActivityLog>) -> Self {
        Self {
            subscriptions,
            activity,
        }
    }

    pub async fn handle(
        &self,
        cmd: CreateSubscriptionCommand,
    ) -> Result<CreateSubscriptionResult, DomainError> {
        let now = Timestamp::now();

        // 1. Validate plan type, limit and period
        let request = SubscriptionRequest::new(
            &cmd.plan_type,
            cmd.custom_product_limit,
            cmd.stripe_customer_id.as_deref(),
            cmd.stripe_subscription_id.as_deref(),
            cmd.stripe_session_id.as_deref(),
            cmd.current_period_start,
            cmd.current_period_end,
            now,
        )?;

        // 2. Cancel the current subscription and insert the new one
        let subscription = self
            .subscriptions
            .replace_active(&cmd.user_id, &request, now)
            .await?;

        let description = match request.custom_product_limit {
            Some(limit) => format!(
                "Subscribed to {} ({} products)",
                request.plan_type.display_name(),
                limit
            ),
            None => format!("Subscribed to {}", request.plan_type.display_name()),
        };
        audit(
            self.activity.as_ref(),
            ActivityEntry::for_user(cmd.user_id, ActivityType::SubscriptionCreated)
                .with_description(description),
        )
        .await;
        tracing::info!(
            user_id = %cmd.user_id,
            plan_type = request.plan_type.as_str(),
            "Subscription created"
        );

        Ok(subscription)
    }
}
