//! Accounts, activity log and password reset tokens.

use async_trait::async_trait;

use super::{InMemoryStore, StoredUser};
use crate::domain::account::{
    ActivityEntry, Credentials, Email, NewAccount, PasswordHash, ResetTokenRecord, User,
};
use crate::domain::foundation::{DomainError, ErrorCode, Timestamp, UserId};
use crate::domain::settings::UserSettings;
use crate::domain::subscription::{PlanType, Subscription};
use crate::ports::{AccountRepository, ActivityLog, CreatedAccount, PasswordResetRepository};

#[async_trait]
impl AccountRepository for InMemoryStore {
    async fn create_account(
        &self,
        account: &NewAccount,
        now: Timestamp,
    ) -> Result<CreatedAccount, DomainError> {
        let mut state = self.state.write().await;

        if state.users.values().any(|u| u.user.email == account.email) {
            return Err(DomainError::new(
                ErrorCode::EmailAlreadyExists,
                "An account with this email already exists",
            ));
        }

        let user = User {
            id: UserId::new(),
            full_name: account.full_name.clone(),
            email: account.email.clone(),
            email_verified: false,
            is_active: true,
            newsletter_opt_in: account.newsletter_opt_in,
            created_at: now,
            updated_at: now,
            last_login_at: None,
        };

        let free_plan_id = state.plan_by_type(PlanType::Free).map(|p| p.id);
        let subscription_id = free_plan_id.map(|plan_id| {
            let subscription = Subscription::free(user.id, plan_id, now);
            let id = subscription.id;
            state.subscriptions.push(subscription);
            id
        });

        state
            .settings
            .insert(user.id, UserSettings::defaults(user.id, now));
        state.users.insert(
            user.id,
            StoredUser {
                user: user.clone(),
                password_hash: account.password_hash.clone(),
            },
        );

        Ok(CreatedAccount {
            user,
            subscription_id,
        })
    }

    async fn find_credentials(&self, email: &Email) -> Result<Option<Credentials>, DomainError> {
        let state = self.state.read().await;
        Ok(state
            .users
            .values()
            .find(|u| &u.user.email == email)
            .map(|stored| Credentials {
                user_id: stored.user.id,
                full_name: stored.user.full_name.clone(),
                email: stored.user.email.clone(),
                password_hash: stored.password_hash.clone(),
                email_verified: stored.user.email_verified,
                is_active: stored.user.is_active,
            }))
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, DomainError> {
        let state = self.state.read().await;
        Ok(state.users.get(id).map(|u| u.user.clone()))
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, DomainError> {
        let state = self.state.read().await;
        Ok(state
            .users
            .values()
            .find(|u| &u.user.email == email)
            .map(|u| u.user.clone()))
    }

    async fn record_login(&self, id: &UserId, at: Timestamp) -> Result<(), DomainError> {
        let mut state = self.state.write().await;
        match state.users.get_mut(id).filter(|u| u.user.is_active) {
            Some(stored) => {
                stored.user.last_login_at = Some(at);
                stored.user.updated_at = at;
                Ok(())
            }
            None => Err(DomainError::new(ErrorCode::UserNotFound, "User not found or inactive")),
        }
    }
}

#[async_trait]
impl ActivityLog for InMemoryStore {
    async fn record(&self, entry: &ActivityEntry) -> Result<(), DomainError> {
        self.state.write().await.activity.push(entry.clone());
        Ok(())
    }

    async fn recent_for_user(
        &self,
        user_id: &UserId,
        limit: usize,
    ) -> Result<Vec<ActivityEntry>, DomainError> {
        let state = self.state.read().await;
        let mut entries: Vec<ActivityEntry> = state
            .activity
            .iter()
            .rev()
            .filter(|e| e.user_id.as_ref() == Some(user_id))
            .cloned()
            .collect();
        entries.sort_by(|a, b| b.occurred_at.cmp(&a.occurred_at));
        entries.truncate(limit);
        Ok(entries)
    }
}

#[async_trait]
impl PasswordResetRepository for InMemoryStore {
    async fn store(&self, record: &ResetTokenRecord) -> Result<(), DomainError> {
        let mut state = self.state.write().await;
        for token in state
            .reset_tokens
            .iter_mut()
            .filter(|t| t.user_id == record.user_id && t.used_at.is_none())
        {
            token.used_at = Some(record.created_at);
        }
        state.reset_tokens.push(record.clone());
        Ok(())
    }

    async fn find_by_hash(&self, token_hash: &str) -> Result<Option<ResetTokenRecord>, DomainError> {
        let state = self.state.read().await;
        Ok(state
            .reset_tokens
            .iter()
            .find(|t| t.token_hash == token_hash)
            .cloned())
    }

    async fn consume(
        &self,
        token_hash: &str,
        new_password_hash: &PasswordHash,
        now: Timestamp,
    ) -> Result<UserId, DomainError> {
        let mut state = self.state.write().await;

        let user_id = state
            .reset_tokens
            .iter()
            .find(|t| t.token_hash == token_hash && t.is_usable(now))
            .map(|t| t.user_id)
            .filter(|id| state.active_user(id).is_some())
            .ok_or_else(invalid_token)?;

        if let Some(token) = state
            .reset_tokens
            .iter_mut()
            .find(|t| t.token_hash == token_hash)
        {
            token.used_at = Some(now);
        }
        let stored = state.users.get_mut(&user_id).ok_or_else(invalid_token)?;
        stored.password_hash = new_password_hash.clone();
        stored.user.updated_at = now;

        Ok(user_id)
    }
}

fn invalid_token() -> DomainError {
    DomainError::new(ErrorCode::ResetTokenInvalid, "Invalid or expired reset token")
}
