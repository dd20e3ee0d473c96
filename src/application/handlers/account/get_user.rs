//! GetUserHandler - Query handler for the public user record.

use std::sync::Arc;

use crate::domain::account::{Email, User};
use crate::domain::foundation::{DomainError, ErrorCode, UserId};
use crate::ports::AccountRepository;

/// Look a user up by id or by email.
#[derive(Debug, Clone)]
pub enum GetUserQuery {
    ById(UserId),
    ByEmail(String),
}

pub type GetUserResult = User;

pub struct GetUserHandler {
    accounts: Arc<dyn AccountRepository>,
}

impl GetUserHandler {
    pub fn new(accounts: Arc<dyn AccountRepository>) -> Self {
        Self { accounts }
    }

    pub async fn handle(&self, query: GetUserQuery) -> Result<GetUserResult, DomainError> {
        let found = match query {
            GetUserQuery::ById(id) => self.accounts.find_by_id(&id).await?,
            GetUserQuery::ByEmail(raw) => {
                let email = Email::parse(&raw)?;
                self.accounts.find_by_email(&email).await?
            }
        };
        found.ok_or_else(|| DomainError::new(ErrorCode::UserNotFound, "User not found"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemoryStore;
    use crate::domain::account::NewAccount;
    use crate::domain::foundation::Timestamp;

    #[tokio::test]
    async fn finds_by_id_and_email() {
        let store = InMemoryStore::new();
        let account = NewAccount::new("Jane Doe", "jane@example.com", "$2b$12$hash", true).unwrap();
        let created = store.create_account(&account, Timestamp::now()).await.unwrap();
        let handler = GetUserHandler::new(Arc::new(store));

        let by_id = handler.handle(GetUserQuery::ById(created.user.id)).await.unwrap();
        let by_email = handler
            .handle(GetUserQuery::ByEmail("Jane@Example.com".to_string()))
            .await
            .unwrap();

        assert_eq!(by_id, by_email);
        assert!(by_id.newsletter_opt_in);
    }

    #[tokio::test]
    async fn unknown_id_is_not_found() {
        let handler = GetUserHandler::new(Arc::new(InMemoryStore::new()));
        let err = handler.handle(GetUserQuery::ById(UserId::new())).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::UserNotFound);
    }
}
