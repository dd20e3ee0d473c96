//! Account repository port.
//!
//! Owns the `users` table plus the rows provisioned alongside a new account
//! (default settings, initial free subscription).

use async_trait::async_trait;

use crate::domain::account::{Credentials, Email, NewAccount, User};
use crate::domain::foundation::{DomainError, SubscriptionId, Timestamp, UserId};

/// Result of a successful registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedAccount {
    pub user: User,
    /// Present when a free plan existed and the user was subscribed to it.
    pub subscription_id: Option<SubscriptionId>,
}

/// Repository port for user accounts.
#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Registers a user.
    ///
    /// In one transaction: inserts the user, a default settings row, and an
    /// active free subscription if a free plan row exists.
    ///
    /// # Errors
    ///
    /// - `EmailAlreadyExists` if the (case-folded) email is taken, including
    ///   when a concurrent registration wins the unique index
    /// - `DatabaseError` on persistence failure
    async fn create_account(
        &self,
        account: &NewAccount,
        now: Timestamp,
    ) -> Result<CreatedAccount, DomainError>;

    /// Stored credentials for login verification, active or not.
    async fn find_credentials(&self, email: &Email) -> Result<Option<Credentials>, DomainError>;

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, DomainError>;

    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, DomainError>;

    /// Stamps `last_login_at`.
    ///
    /// # Errors
    ///
    /// - `UserNotFound` if no active user has this id
    async fn record_login(&self, id: &UserId, at: Timestamp) -> Result<(), DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn account_repository_is_object_safe() {
        fn _accepts_dyn(_repo: &dyn AccountRepository) {}
    }
}
