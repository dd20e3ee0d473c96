//! CancelSubscriptionHandler - Command handler for ending a paid plan.
//!
//! Immediate cancellation drops the user back to the free plan right away.
//! Deferred cancellation only flags the subscription; it stays active until
//! the current period ends.

use std::sync::Arc;

use crate::application::audit::audit;
use crate::domain::account::{ActivityEntry, ActivityType};
use crate::domain::foundation::{DomainError, ErrorCode, SubscriptionId, Timestamp, UserId};
use crate::domain::subscription::PlanType;
use crate::ports::{ActivityLog, SubscriptionRepository};

#[derive(Debug, Clone)]
pub struct CancelSubscriptionCommand {
    pub user_id: UserId,
    pub immediate: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct CancelSubscriptionResult {
    pub cancelled_subscription_id: SubscriptionId,
    pub immediate: bool,
    /// When the paid plan stops applying; `None` for an open-ended period.
    pub effective_at: Option<Timestamp>,
    /// Free subscription created by an immediate cancellation.
    pub fallback_subscription_id: Option<SubscriptionId>,
}

pub struct CancelSubscriptionHandler {
    subscriptions: Arc<dyn SubscriptionRepository>,
    activity: Arc<dyn ActivityLog>,
}

impl CancelSubscriptionHandler {
    pub fn new(subscriptions: Arc<dyn SubscriptionRepository>, activity: Arc<dyn ActivityLog>) -> Self {
        Self {
            subscriptions,
            activity,
        }
    }

    pub async fn handle(
        &self,
        cmd: CancelSubscriptionCommand,
    ) -> Result<CancelSubscriptionResult, DomainError> {
        let now = Timestamp::now();

        // 1. Find the active subscription
        let details = self
            .subscriptions
            .find_active(&cmd.user_id)
            .await?
            .ok_or_else(|| {
                DomainError::new(ErrorCode::CancellationNotAllowed, "No active subscription found")
            })?;

        // 2. The free plan is the floor; there is nothing to cancel to
        if details.plan_type == PlanType::Free {
            return Err(DomainError::new(
                ErrorCode::CancellationNotAllowed,
                "Free plan subscriptions cannot be cancelled",
            ));
        }

        // 3. Cancel now, or flag for period end
        let mut subscription = details.subscription;
        let result = if cmd.immediate {
            let fallback = self
                .subscriptions
                .cancel_immediately(&cmd.user_id, &subscription.id, now)
                .await?;
            CancelSubscriptionResult {
                cancelled_subscription_id: subscription.id,
                immediate: true,
                effective_at: Some(now),
                fallback_subscription_id: fallback,
            }
        } else {
            subscription.schedule_cancellation(now)?;
            self.subscriptions.save_cancellation_flag(&subscription).await?;
            CancelSubscriptionResult {
                cancelled_subscription_id: subscription.id,
                immediate: false,
                effective_at: subscription.current_period_end,
                fallback_subscription_id: None,
            }
        };

        let description = if cmd.immediate {
            format!("Cancelled {} immediately", details.plan_name)
        } else {
            format!("Cancelled {} at period end", details.plan_name)
        };
        audit(
            self.activity.as_ref(),
            ActivityEntry::for_user(cmd.user_id, ActivityType::SubscriptionCancelled)
                .with_description(description),
        )
        .await;
        tracing::info!(
            user_id = %cmd.user_id,
            immediate = cmd.immediate,
            "Subscription cancelled"
        );

        Ok(result)
    }
}
