//! VerifyResetTokenHandler - Checks a reset token without consuming it.

use std::sync::Arc;

use crate::domain::account::{hash_reset_token, Email};
use crate::domain::foundation::{DomainError, ErrorCode, Timestamp, UserId};
use crate::ports::{AccountRepository, PasswordResetRepository};

#[derive(Debug, Clone)]
pub struct VerifyResetTokenQuery {
    pub token: String,
}

/// Who the token belongs to.
#[derive(Debug, Clone, serde::Serialize)]
pub struct VerifyResetTokenResult {
    pub user_id: UserId,
    pub email: Email,
    pub full_name: String,
}

pub struct VerifyResetTokenHandler {
    accounts: Arc<dyn AccountRepository>,
    resets: Arc<dyn PasswordResetRepository>,
}

impl VerifyResetTokenHandler {
    pub fn new(accounts: Arc<dyn AccountRepository>, resets: Arc<dyn PasswordResetRepository>) -> Self {
        Self { accounts, resets }
    }

    pub async fn handle(&self, query: VerifyResetTokenQuery) -> Result<VerifyResetTokenResult, DomainError> {
        let token = query.token.trim();
        if token.is_empty() {
            return Err(DomainError::new(ErrorCode::EmptyField, "Reset token is required")
                .with_detail("field", "token"));
        }

        let record = self
            .resets
            .find_by_hash(&hash_reset_token(token))
            .await?
            .filter(|r| r.is_usable(Timestamp::now()))
            .ok_or_else(invalid_token)?;

        let user = self
            .accounts
            .find_by_id(&record.user_id)
            .await?
            .filter(|u| u.is_active)
            .ok_or_else(invalid_token)?;

        Ok(VerifyResetTokenResult {
            user_id: user.id,
            email: user.email,
            full_name: user.full_name,
        })
    }
}

fn invalid_token() -> DomainError {
    DomainError::new(ErrorCode::ResetTokenInvalid, "Invalid or expired reset token")
}
