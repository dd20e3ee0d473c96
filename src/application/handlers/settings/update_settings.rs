//! UpdateSettingsHandler - Command handler for partial settings updates.

use std::sync::Arc;

use crate::application::audit::audit;
use crate::domain::account::{ActivityEntry, ActivityType};
use crate::domain::foundation::{DomainError, Timestamp, UserId};
use crate::domain::settings::{SettingsChanges, UserSettings};
use crate::ports::{ActivityLog, SettingsRepository};

#[derive(Debug, Clone)]
pub struct UpdateSettingsCommand {
    pub user_id: UserId,
    /// Only supplied fields change. Empty strings clear the webhook and phone.
    pub changes: SettingsChanges,
}

pub type UpdateSettingsResult = UserSettings;

pub struct UpdateSettingsHandler {
    settings: Arc<dyn SettingsRepository>,
    activity: Arc<dyn ActivityLog>,
}

impl UpdateSettingsHandler {
    pub fn new(settings: Arc<dyn SettingsRepository>, activity: Arc<dyn ActivityLog>) -> Self {
        Self { settings, activity }
    }

    pub async fn handle(&self, cmd: UpdateSettingsCommand) -> Result<UpdateSettingsResult, DomainError> {
        // 1. Validate every supplied field before loading anything
        let patch = cmd.changes.validate()?;

        // 2. Merge into the stored row and save
        let now = Timestamp::now();
        let mut settings = self.settings.get_or_create(&cmd.user_id, now).await?;
        settings.apply(patch, now);
        self.settings.save(&settings).await?;

        audit(
            self.activity.as_ref(),
            ActivityEntry::for_user(cmd.user_id, ActivityType::SettingsUpdated),
        )
        .await;

        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemoryStore;
    use crate::domain::account::NewAccount;
    use crate::domain::foundation::{ErrorCode, ErrorKind};
    use crate::domain::settings::{Currency, DashboardTheme, NotificationFrequency};
    use crate::ports::AccountRepository;

    async fn setup() -> (InMemoryStore, UserId, UpdateSettingsHandler) {
        let store = InMemoryStore::new();
        let account = NewAccount::new("Jane Doe", "jane@example.com", "$2b$12$hash", false).unwrap();
        let user_id = store.create_account(&account, Timestamp::now()).await.unwrap().user.id;
        let handler = UpdateSettingsHandler::new(Arc::new(store.clone()), Arc::new(store.clone()));
        (store, user_id, handler)
    }

    #[tokio::test]
    async fn applies_only_supplied_fields() {
        let (store, user_id, handler) = setup().await;

        let updated = handler
            .handle(UpdateSettingsCommand {
                user_id,
                changes: SettingsChanges {
                    dashboard_theme: Some("dark".to_string()),
                    default_currency: Some("eur".to_string()),
                    notification_frequency: Some("daily".to_string()),
                    phone_number: Some("+1 (555) 123-4567".to_string()),
                    ..Default::default()
                },
            })
            .await
            .unwrap();

        assert_eq!(updated.dashboard_theme, DashboardTheme::Dark);
        assert_eq!(updated.default_currency, Currency::Eur);
        assert_eq!(updated.notification_frequency, NotificationFrequency::Daily);
        assert!(updated.phone_number.is_some());
        assert!(updated.email_notifications);
        assert_eq!(store.get_or_create(&user_id, Timestamp::now()).await.unwrap(), updated);
        let last = store.activity_entries().await.pop().unwrap();
        assert_eq!(last.activity_type, ActivityType::SettingsUpdated);
    }

    #[tokio::test]
    async fn empty_phone_clears_it() {
        let (_, user_id, handler) = setup().await;
        let set = SettingsChanges {
            phone_number: Some("555-123-4567".to_string()),
            ..Default::default()
        };
        handler
            .handle(UpdateSettingsCommand { user_id, changes: set })
            .await
            .unwrap();

        let cleared = handler
            .handle(UpdateSettingsCommand {
                user_id,
                changes: SettingsChanges {
                    phone_number: Some(String::new()),
                    ..Default::default()
                },
            })
            .await
            .unwrap();
        assert_eq!(cleared.phone_number, None);
    }

    #[tokio::test]
    async fn invalid_field_changes_nothing() {
        let (store, user_id, handler) = setup().await;
        let before = store.get_or_create(&user_id, Timestamp::now()).await.unwrap();

        let err = handler
            .handle(UpdateSettingsCommand {
                user_id,
                changes: SettingsChanges {
                    dashboard_theme: Some("dark".to_string()),
                    items_per_page: Some(500),
                    ..Default::default()
                },
            })
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(store.get_or_create(&user_id, Timestamp::now()).await.unwrap(), before);
    }

    #[tokio::test]
    async fn unknown_user_is_not_found() {
        let (_, _, handler) = setup().await;
        let err = handler
            .handle(UpdateSettingsCommand {
                user_id: UserId::new(),
                changes: SettingsChanges::default(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::UserNotFound);
    }
}
