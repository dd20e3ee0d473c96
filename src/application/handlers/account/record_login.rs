//! RecordLoginHandler - Command handler stamping a successful login.

use std::sync::Arc;

use crate::application::audit::audit;
use crate::domain::account::{ActivityEntry, ActivityType};
use crate::domain::foundation::{DomainError, Timestamp, UserId};
use crate::ports::{AccountRepository, ActivityLog};

#[derive(Debug, Clone)]
pub struct RecordLoginCommand {
    pub user_id: UserId,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct RecordLoginResult {
    pub last_login_at: Timestamp,
}

pub struct RecordLoginHandler {
    accounts: Arc<dyn AccountRepository>,
    activity: Arc<dyn ActivityLog>,
}

impl RecordLoginHandler {
    pub fn new(accounts: Arc<dyn AccountRepository>, activity: Arc<dyn ActivityLog>) -> Self {
        Self { accounts, activity }
    }

    pub async fn handle(&self, cmd: RecordLoginCommand) -> Result<RecordLoginResult, DomainError> {
        let now = Timestamp::now();
        self.accounts.record_login(&cmd.user_id, now).await?;

        audit(
            self.activity.as_ref(),
            ActivityEntry::for_user(cmd.user_id, ActivityType::Login),
        )
        .await;

        Ok(RecordLoginResult { last_login_at: now })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemoryStore;
    use crate::domain::account::NewAccount;
    use crate::domain::foundation::ErrorCode;

    async fn registered(store: &InMemoryStore) -> UserId {
        let account = NewAccount::new("Jane Doe", "jane@example.com", "$2b$12$hash", false).unwrap();
        store.create_account(&account, Timestamp::now()).await.unwrap().user.id
    }

    #[tokio::test]
    async fn stamps_last_login_and_logs() {
        let store = InMemoryStore::new();
        let user_id = registered(&store).await;
        let handler = RecordLoginHandler::new(Arc::new(store.clone()), Arc::new(store.clone()));

        let result = handler.handle(RecordLoginCommand { user_id }).await.unwrap();

        let user = store.find_by_id(&user_id).await.unwrap().unwrap();
        assert_eq!(user.last_login_at, Some(result.last_login_at));
        let entries = store.activity_entries().await;
        assert_eq!(entries.last().unwrap().activity_type, ActivityType::Login);
    }

    #[tokio::test]
    async fn inactive_user_is_rejected_without_logging() {
        let store = InMemoryStore::new();
        let user_id = registered(&store).await;
        store.deactivate_user(&user_id).await;
        let handler = RecordLoginHandler::new(Arc::new(store.clone()), Arc::new(store.clone()));

        let err = handler.handle(RecordLoginCommand { user_id }).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::UserNotFound);
        assert!(store.activity_entries().await.is_empty());
    }
}
