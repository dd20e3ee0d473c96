//! GetSettingsHandler - Query handler returning a user's settings.
//!
//! A missing row is created with defaults on first read.

use std::sync::Arc;

use crate::domain::foundation::{DomainError, Timestamp, UserId};
use crate::domain::settings::UserSettings;
use crate::ports::SettingsRepository;

#[derive(Debug, Clone)]
pub struct GetSettingsQuery {
    pub user_id: UserId,
}

pub type GetSettingsResult = UserSettings;

pub struct GetSettingsHandler {
    settings: Arc<dyn SettingsRepository>,
}

impl GetSettingsHandler {
    pub fn new(settings: Arc<dyn SettingsRepository>) -> Self {
        Self { settings }
    }

    pub async fn handle(&self, query: GetSettingsQuery) -> Result<GetSettingsResult, DomainError> {
        self.settings.get_or_create(&query.user_id, Timestamp::now()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemoryStore;
    use crate::domain::account::NewAccount;
    use crate::domain::foundation::ErrorCode;
    use crate::domain::settings::Currency;
    use crate::ports::AccountRepository;

    #[tokio::test]
    async fn returns_defaults_for_new_user() {
        let store = InMemoryStore::new();
        let account = NewAccount::new("Jane Doe", "jane@example.com", "$2b$12$hash", false).unwrap();
        let user_id = store.create_account(&account, Timestamp::now()).await.unwrap().user.id;

        let settings = GetSettingsHandler::new(Arc::new(store))
            .handle(GetSettingsQuery { user_id })
            .await
            .unwrap();
        assert_eq!(settings.user_id, user_id);
        assert_eq!(settings.items_per_page, 10);
        assert_eq!(settings.default_currency, Currency::Usd);
    }

    #[tokio::test]
    async fn unknown_user_is_not_found() {
        let err = GetSettingsHandler::new(Arc::new(InMemoryStore::new()))
            .handle(GetSettingsQuery {
                user_id: UserId::new(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::UserNotFound);
    }
}
