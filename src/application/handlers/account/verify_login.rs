//! VerifyLoginHandler - Query handler returning what login verification needs.
//!
//! The caller compares the password against the returned hash and decides
//! what to do with inactive or unverified accounts.

use std::sync::Arc;

use crate::domain::account::{Credentials, Email};
use crate::domain::foundation::{DomainError, ErrorCode};
use crate::ports::AccountRepository;

#[derive(Debug, Clone)]
pub struct VerifyLoginQuery {
    pub email: String,
}

pub type VerifyLoginResult = Credentials;

pub struct VerifyLoginHandler {
    accounts: Arc<dyn AccountRepository>,
}

impl VerifyLoginHandler {
    pub fn new(accounts: Arc<dyn AccountRepository>) -> Self {
        Self { accounts }
    }

    pub async fn handle(&self, query: VerifyLoginQuery) -> Result<VerifyLoginResult, DomainError> {
        let email = Email::parse(&query.email)?;
        self.accounts
            .find_credentials(&email)
            .await?
            .ok_or_else(|| DomainError::new(ErrorCode::UserNotFound, "No account found for this email"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemoryStore;
    use crate::domain::account::NewAccount;
    use crate::domain::foundation::{ErrorKind, Timestamp};

    async fn registered(store: &InMemoryStore) {
        let account = NewAccount::new("Jane Doe", "jane@example.com", "$2b$12$hash", false).unwrap();
        store.create_account(&account, Timestamp::now()).await.unwrap();
    }

    #[tokio::test]
    async fn returns_hash_and_flags_for_any_case() {
        let store = InMemoryStore::new();
        registered(&store).await;
        let handler = VerifyLoginHandler::new(Arc::new(store));

        let creds = handler
            .handle(VerifyLoginQuery {
                email: " JANE@example.COM ".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(creds.password_hash.expose(), "$2b$12$hash");
        assert!(creds.is_active);
        assert!(!creds.email_verified);
    }

    #[tokio::test]
    async fn inactive_account_is_still_returned() {
        let store = InMemoryStore::new();
        registered(&store).await;
        let handler = VerifyLoginHandler::new(Arc::new(store.clone()));
        let creds = handler
            .handle(VerifyLoginQuery {
                email: "jane@example.com".to_string(),
            })
            .await
            .unwrap();
        store.deactivate_user(&creds.user_id).await;

        let creds = handler
            .handle(VerifyLoginQuery {
                email: "jane@example.com".to_string(),
            })
            .await
            .unwrap();
        assert!(!creds.is_active);
    }

    #[tokio::test]
    async fn unknown_email_is_not_found() {
        let handler = VerifyLoginHandler::new(Arc::new(InMemoryStore::new()));
        let err = handler
            .handle(VerifyLoginQuery {
                email: "ghost@example.com".to_string(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn malformed_email_is_validation_error() {
        let handler = VerifyLoginHandler::new(Arc::new(InMemoryStore::new()));
        let err = handler
            .handle(VerifyLoginQuery {
                email: "nope".to_string(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }
}
