//! AddAddonHandler - Command handler attaching a catalogue add-on.

use std::sync::Arc;

use crate::application::audit::audit;
use crate::domain::account::{ActivityEntry, ActivityType};
use crate::domain::foundation::{DomainError, ErrorCode, SubscriptionId, Timestamp};
use crate::domain::subscription::AttachedAddon;
use crate::ports::{ActivityLog, SubscriptionRepository};

#[derive(Debug, Clone)]
pub struct AddAddonCommand {
    pub subscription_id: SubscriptionId,
    /// Matched case-insensitively against the catalogue.
    pub addon_name: String,
    pub stripe_subscription_item_id: Option<String>,
}

pub type AddAddonResult = AttachedAddon;

pub struct AddAddonHandler {
    subscriptions: Arc<dyn SubscriptionRepository>,
    activity: Arc<dyn ActivityLog>,
}

impl AddAddonHandler {
    pub fn new(subscriptions: Arc<dyn SubscriptionRepository>, activity: Arc<dyn ActivityLog>) -> Self {
        Self {
            subscriptions,
            activity,
        }
    }

    pub async fn handle(&self, cmd: AddAddonCommand) -> Result<AddAddonResult, DomainError> {
        let addon_name = cmd.addon_name.trim();
        if addon_name.is_empty() {
            return Err(DomainError::new(ErrorCode::EmptyField, "Add-on name is required")
                .with_detail("field", "addon_name"));
        }
        let item_id = cmd
            .stripe_subscription_item_id
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty());

        let subscription = self
            .subscriptions
            .find_by_id(&cmd.subscription_id)
            .await?
            .filter(|s| s.is_active())
            .ok_or_else(|| {
                DomainError::new(ErrorCode::SubscriptionNotFound, "Active subscription not found")
            })?;

        let attached = self
            .subscriptions
            .attach_addon(&subscription.id, addon_name, item_id, Timestamp::now())
            .await?;

        audit(
            self.activity.as_ref(),
            ActivityEntry::for_user(subscription.user_id, ActivityType::AddonAdded)
                .with_description(format!("Added {}", attached.addon_name)),
        )
        .await;

        Ok(attached)
    }
}
