//! Password reset token storage port.

use async_trait::async_trait;

use crate::domain::account::{PasswordHash, ResetTokenRecord};
use crate::domain::foundation::{DomainError, Timestamp, UserId};

#[async_trait]
pub trait PasswordResetRepository: Send + Sync {
    /// Stores a new token, retiring any unused tokens the user already had.
    async fn store(&self, record: &ResetTokenRecord) -> Result<(), DomainError>;

    /// Looks a token up by its hash, used or not.
    async fn find_by_hash(&self, token_hash: &str) -> Result<Option<ResetTokenRecord>, DomainError>;

    /// Marks the token used and replaces the user's password hash.
    ///
    /// Both happen in one transaction with the token row locked, so a token
    /// can reset a password at most once.
    ///
    /// # Errors
    ///
    /// - `ResetTokenInvalid` if the token is unknown, used, expired, or its
    ///   user is inactive
    async fn consume(
        &self,
        token_hash: &str,
        new_password_hash: &PasswordHash,
        now: Timestamp,
    ) -> Result<UserId, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_reset_repository_is_object_safe() {
        fn _accepts_dyn(_repo: &dyn PasswordResetRepository) {}
    }
}
