//! ResetPasswordHandler - Consumes a reset token and stores the new hash.

use std::sync::Arc;

use crate::application::audit::audit;
use crate::domain::account::{hash_reset_token, ActivityEntry, ActivityType, PasswordHash};
use crate::domain::foundation::{DomainError, ErrorCode, Timestamp, UserId};
use crate::ports::{ActivityLog, PasswordResetRepository};

#[derive(Debug, Clone)]
pub struct ResetPasswordCommand {
    pub token: String,
    pub new_password_hash: String,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct ResetPasswordResult {
    pub user_id: UserId,
}

pub struct ResetPasswordHandler {
    resets: Arc<dyn PasswordResetRepository>,
    activity: Arc<dyn ActivityLog>,
}

impl ResetPasswordHandler {
    pub fn new(resets: Arc<dyn PasswordResetRepository>, activity: Arc<dyn ActivityLog>) -> Self {
        Self { resets, activity }
    }

    pub async fn handle(&self, cmd: ResetPasswordCommand) -> Result<ResetPasswordResult, DomainError> {
        let token = cmd.token.trim();
        if token.is_empty() {
            return Err(DomainError::new(ErrorCode::EmptyField, "Reset token is required")
                .with_detail("field", "token"));
        }
        let new_hash = PasswordHash::new(cmd.new_password_hash.trim())?;

        // Marks the token used and swaps the hash in one step
        let user_id = self
            .resets
            .consume(&hash_reset_token(token), &new_hash, Timestamp::now())
            .await?;

        audit(
            self.activity.as_ref(),
            ActivityEntry::for_user(user_id, ActivityType::PasswordReset),
        )
        .await;
        tracing::info!(user_id = %user_id, "Password reset completed");

        Ok(ResetPasswordResult { user_id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemoryStore;
    use crate::domain::account::{IssuedResetToken, NewAccount};
    use crate::domain::foundation::ErrorKind;
    use crate::ports::AccountRepository;

    async fn setup() -> (InMemoryStore, UserId, String, ResetPasswordHandler) {
        let store = InMemoryStore::new();
        let account = NewAccount::new("Jane Doe", "jane@example.com", "$2b$12$old", false).unwrap();
        let user_id = store.create_account(&account, Timestamp::now()).await.unwrap().user.id;
        let issued = IssuedResetToken::issue(user_id, Timestamp::now(), 24);
        PasswordResetRepository::store(&store, &issued.record).await.unwrap();
        let handler = ResetPasswordHandler::new(Arc::new(store.clone()), Arc::new(store.clone()));
        (store, user_id, issued.token, handler)
    }

    fn command(token: &str, hash: &str) -> ResetPasswordCommand {
        ResetPasswordCommand {
            token: token.to_string(),
            new_password_hash: hash.to_string(),
        }
    }

    #[tokio::test]
    async fn replaces_hash_and_logs() {
        let (store, user_id, token, handler) = setup().await;
        let result = handler.handle(command(&token, "$2b$12$new")).await.unwrap();

        assert_eq!(result.user_id, user_id);
        assert_eq!(store.password_hash_of(&user_id).await.as_deref(), Some("$2b$12$new"));
        let last = store.activity_entries().await.pop().unwrap();
        assert_eq!(last.activity_type, ActivityType::PasswordReset);
    }

    #[tokio::test]
    async fn token_is_single_use() {
        let (store, user_id, token, handler) = setup().await;
        handler.handle(command(&token, "$2b$12$new")).await.unwrap();

        let err = handler.handle(command(&token, "$2b$12$other")).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ResetTokenInvalid);
        assert_eq!(store.password_hash_of(&user_id).await.as_deref(), Some("$2b$12$new"));
    }

    #[tokio::test]
    async fn blank_new_hash_is_rejected_before_consuming() {
        let (store, _, token, handler) = setup().await;
        let err = handler.handle(command(&token, " ")).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);

        let record = store.find_by_hash(&hash_reset_token(&token)).await.unwrap().unwrap();
        assert!(record.used_at.is_none());
    }

    #[tokio::test]
    async fn unknown_token_is_invalid() {
        let (store, user_id, _, handler) = setup().await;
        let err = handler.handle(command("deadbeef", "$2b$12$new")).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ResetTokenInvalid);
        assert!(store.find_by_id(&user_id).await.unwrap().is_some());
    }
}
