//! RequestPasswordResetHandler - Issues a single-use reset token.
//!
//! Unknown and disabled emails succeed silently with no token so callers
//! cannot discover which addresses are registered.

use std::sync::Arc;

use crate::application::audit::audit;
use crate::domain::account::{ActivityEntry, ActivityType, Email, IssuedResetToken};
use crate::domain::foundation::{DomainError, Timestamp};
use crate::ports::{AccountRepository, ActivityLog, PasswordResetRepository};

#[derive(Debug, Clone)]
pub struct RequestPasswordResetCommand {
    pub email: String,
}

/// Token to be delivered out of band. Only its hash is stored.
#[derive(Debug, Clone, serde::Serialize)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: Timestamp,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct RequestPasswordResetResult {
    pub issued: Option<IssuedToken>,
}

pub struct RequestPasswordResetHandler {
    accounts: Arc<dyn AccountRepository>,
    resets: Arc<dyn PasswordResetRepository>,
    activity: Arc<dyn ActivityLog>,
    ttl_hours: i64,
}

impl RequestPasswordResetHandler {
    pub fn new(
        accounts: Arc<dyn AccountRepository>,
        resets: Arc<dyn PasswordResetRepository>,
        activity: Arc<dyn ActivityLog>,
        ttl_hours: i64,
    ) -> Self {
        Self {
            accounts,
            resets,
            activity,
            ttl_hours,
        }
    }

    pub async fn handle(
        &self,
        cmd: RequestPasswordResetCommand,
    ) -> Result<RequestPasswordResetResult, DomainError> {
        let email = Email::parse(&cmd.email)?;

        let user = match self.accounts.find_by_email(&email).await? {
            Some(user) if user.is_active => user,
            _ => {
                tracing::debug!("Password reset requested for unknown or disabled account");
                return Ok(RequestPasswordResetResult { issued: None });
            }
        };

        let issued = IssuedResetToken::issue(user.id, Timestamp::now(), self.ttl_hours);
        self.resets.store(&issued.record).await?;

        audit(
            self.activity.as_ref(),
            ActivityEntry::for_user(user.id, ActivityType::PasswordResetRequested),
        )
        .await;

        Ok(RequestPasswordResetResult {
            issued: Some(IssuedToken {
                token: issued.token,
                expires_at: issued.record.expires_at,
            }),
        })
    }
}
