//! CreateAccountHandler - Command handler for user registration.
//!
//! Registration provisions default settings and, when the catalogue has a
//! free plan, an active free subscription. Every attempt is audited.

use std::sync::Arc;

use crate::application::audit::audit;
use crate::domain::account::{ActivityEntry, ActivityType, NewAccount, User};
use crate::domain::foundation::{DomainError, ErrorCode, SubscriptionId, Timestamp};
use crate::ports::{AccountRepository, ActivityLog};

/// Command to register a new account.
///
/// The password arrives already hashed; this layer never sees plaintext.
#[derive(Debug, Clone)]
pub struct CreateAccountCommand {
    pub full_name: String,
    pub email: String,
    pub password_hash: String,
    pub newsletter_opt_in: bool,
}

/// Result of successful registration.
#[derive(Debug, Clone, serde::Serialize)]
pub struct CreateAccountResult {
    pub user: User,
    /// The initial free subscription, absent when no free plan exists.
    pub subscription_id: Option<SubscriptionId>,
}

pub struct CreateAccountHandler {
    accounts: Arc<dyn AccountRepository>,
    activity: Arc<dyn ActivityLog>,
}

impl CreateAccountHandler {
    pub fn new(accounts: Arc<dyn AccountRepository>, activity: Arc<dyn ActivityLog>) -> Self {
        Self { accounts, activity }
    }

    pub async fn handle(&self, cmd: CreateAccountCommand) -> Result<CreateAccountResult, DomainError> {
        // 1. Validate input before touching storage
        let account = match NewAccount::new(
            &cmd.full_name,
            &cmd.email,
            &cmd.password_hash,
            cmd.newsletter_opt_in,
        ) {
            Ok(account) => account,
            Err(e) => {
                let err = DomainError::from(e);
                self.log_failure(None, &err).await;
                return Err(err);
            }
        };

        // 2. Refuse emails that are already registered
        let existing = match self.accounts.find_by_email(&account.email).await {
            Ok(existing) => existing,
            Err(err) => {
                self.log_failure(None, &err).await;
                return Err(err);
            }
        };
        if let Some(existing) = existing {
            let err = DomainError::new(
                ErrorCode::EmailAlreadyExists,
                "An account with this email already exists",
            );
            self.log_failure(Some(&existing), &err).await;
            return Err(err);
        }

        // 3. Create user, settings and free subscription atomically
        let created = match self.accounts.create_account(&account, Timestamp::now()).await {
            Ok(created) => created,
            Err(err) => {
                self.log_failure(None, &err).await;
                return Err(err);
            }
        };

        audit(
            self.activity.as_ref(),
            ActivityEntry::for_user(created.user.id, ActivityType::Registration)
                .with_description("Account created"),
        )
        .await;
        tracing::info!(user_id = %created.user.id, "Account registered");

        Ok(CreateAccountResult {
            user: created.user,
            subscription_id: created.subscription_id,
        })
    }

    async fn log_failure(&self, existing: Option<&User>, err: &DomainError) {
        let entry = match existing {
            Some(user) => ActivityEntry::for_user(user.id, ActivityType::RegistrationFailed),
            None => ActivityEntry::anonymous(ActivityType::RegistrationFailed),
        };
        audit(
            self.activity.as_ref(),
            entry.with_description(err.public_message().to_string()),
        )
        .await;
        tracing::debug!(code = %err.code, "Registration refused");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemoryStore;
    use crate::domain::account::{Credentials, Email};
    use crate::domain::foundation::{ErrorKind, UserId};
    use crate::ports::CreatedAccount;
    use async_trait::async_trait;

    // ════════════════════════════════════════════════════════════════════════════
    // Mock Implementations
    // ════════════════════════════════════════════════════════════════════════════

    /// Fails the insert, and the email lookup too when `lookup` is set.
    struct FailingAccounts {
        lookup: bool,
    }

    #[async_trait]
    impl AccountRepository for FailingAccounts {
        async fn create_account(
            &self,
            _account: &NewAccount,
            _now: Timestamp,
        ) -> Result<CreatedAccount, DomainError> {
            Err(DomainError::database("Failed to create user", "connection reset"))
        }

        async fn find_credentials(&self, _email: &Email) -> Result<Option<Credentials>, DomainError> {
            Ok(None)
        }

        async fn find_by_id(&self, _id: &UserId) -> Result<Option<User>, DomainError> {
            Ok(None)
        }

        async fn find_by_email(&self, _email: &Email) -> Result<Option<User>, DomainError> {
            if self.lookup {
                return Err(DomainError::database("Failed to fetch user", "connection reset"));
            }
            Ok(None)
        }

        async fn record_login(&self, _id: &UserId, _at: Timestamp) -> Result<(), DomainError> {
            Ok(())
        }
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Test Helpers
    // ════════════════════════════════════════════════════════════════════════════

    fn handler(store: &InMemoryStore) -> CreateAccountHandler {
        CreateAccountHandler::new(Arc::new(store.clone()), Arc::new(store.clone()))
    }

    fn command(email: &str) -> CreateAccountCommand {
        CreateAccountCommand {
            full_name: "Jane Doe".to_string(),
            email: email.to_string(),
            password_hash: "$2b$12$hash".to_string(),
            newsletter_opt_in: false,
        }
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn registers_with_free_subscription() {
        let store = InMemoryStore::with_default_catalogue();
        let result = handler(&store).handle(command("Jane@Example.com")).await.unwrap();

        assert_eq!(result.user.email.as_str(), "jane@example.com");
        assert!(result.subscription_id.is_some());
        let entries = store.activity_entries().await;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].activity_type, ActivityType::Registration);
        assert_eq!(entries[0].user_id, Some(result.user.id));
    }

    #[tokio::test]
    async fn registers_without_subscription_when_no_free_plan() {
        let store = InMemoryStore::new();
        let result = handler(&store).handle(command("jane@example.com")).await.unwrap();
        assert!(result.subscription_id.is_none());
    }

    #[tokio::test]
    async fn duplicate_email_is_case_insensitive() {
        let store = InMemoryStore::with_default_catalogue();
        let handler = handler(&store);
        let first = handler.handle(command("jane@example.com")).await.unwrap();

        let err = handler.handle(command("JANE@example.com")).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::EmailAlreadyExists);
        assert_eq!(store.user_count().await, 1);

        let failed = store.activity_entries().await.pop().unwrap();
        assert_eq!(failed.activity_type, ActivityType::RegistrationFailed);
        assert_eq!(failed.user_id, Some(first.user.id));
    }

    #[tokio::test]
    async fn invalid_email_logs_anonymous_failure() {
        let store = InMemoryStore::with_default_catalogue();
        let err = handler(&store).handle(command("not-an-email")).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(store.user_count().await, 0);
        let entries = store.activity_entries().await;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].user_id, None);
        assert_eq!(entries[0].activity_type, ActivityType::RegistrationFailed);
    }

    #[tokio::test]
    async fn blank_name_is_rejected() {
        let store = InMemoryStore::with_default_catalogue();
        let mut cmd = command("jane@example.com");
        cmd.full_name = "   ".to_string();

        let err = handler(&store).handle(cmd).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::EmptyField);
    }

    #[tokio::test]
    async fn storage_failure_is_internal_and_audited() {
        let store = InMemoryStore::new();
        let handler = CreateAccountHandler::new(
            Arc::new(FailingAccounts { lookup: false }),
            Arc::new(store.clone()),
        );

        let err = handler.handle(command("jane@example.com")).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Internal);
        let entries = store.activity_entries().await;
        assert_eq!(entries[0].activity_type, ActivityType::RegistrationFailed);
        assert_eq!(
            entries[0].description.as_deref(),
            Some(crate::domain::foundation::GENERIC_BACKEND_MESSAGE)
        );
    }

    #[tokio::test]
    async fn lookup_failure_is_audited() {
        let store = InMemoryStore::new();
        let handler = CreateAccountHandler::new(
            Arc::new(FailingAccounts { lookup: true }),
            Arc::new(store.clone()),
        );

        let err = handler.handle(command("jane@example.com")).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Internal);
        let entries = store.activity_entries().await;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].activity_type, ActivityType::RegistrationFailed);
        assert_eq!(entries[0].user_id, None);
    }
}
