//! PostgreSQL implementation of AccountRepository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::{db_error, violated_constraint};
use crate::domain::account::{Credentials, Email, NewAccount, PasswordHash, User};
use crate::domain::foundation::{DomainError, ErrorCode, SubscriptionId, Timestamp, UserId};
use crate::ports::{AccountRepository, CreatedAccount};

const EMAIL_UNIQUE_INDEX: &str = "users_email_lower_key";

/// PostgreSQL implementation of the AccountRepository port.
pub struct PostgresAccountRepository {
    pool: PgPool,
}

impl PostgresAccountRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Database row representation of a user.
#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    full_name: String,
    email: String,
    password_hash: String,
    email_verified: bool,
    is_active: bool,
    newsletter_opt_in: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    last_login_at: Option<DateTime<Utc>>,
}

impl From<&UserRow> for User {
    fn from(row: &UserRow) -> Self {
        User {
            id: UserId::from_uuid(row.id),
            full_name: row.full_name.clone(),
            email: Email::from_stored(row.email.to_lowercase()),
            email_verified: row.email_verified,
            is_active: row.is_active,
            newsletter_opt_in: row.newsletter_opt_in,
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
            last_login_at: row.last_login_at.map(Timestamp::from_datetime),
        }
    }
}

impl TryFrom<UserRow> for Credentials {
    type Error = DomainError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let password_hash = PasswordHash::new(row.password_hash).map_err(|_| {
            DomainError::new(ErrorCode::DatabaseError, "Stored password hash is empty")
        })?;
        Ok(Credentials {
            user_id: UserId::from_uuid(row.id),
            full_name: row.full_name,
            email: Email::from_stored(row.email.to_lowercase()),
            password_hash,
            email_verified: row.email_verified,
            is_active: row.is_active,
        })
    }
}

const USER_COLUMNS: &str = "id, full_name, email, password_hash, email_verified, is_active, \
     newsletter_opt_in, created_at, updated_at, last_login_at";

fn email_taken() -> DomainError {
    DomainError::new(
        ErrorCode::EmailAlreadyExists,
        "An account with this email already exists",
    )
}

impl PostgresAccountRepository {
    async fn fetch_by_email(&self, email: &Email) -> Result<Option<UserRow>, DomainError> {
        sqlx::query_as(&format!(
            "SELECT {} FROM users WHERE LOWER(email) = $1",
            USER_COLUMNS
        ))
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to find user"))
    }
}

#[async_trait]
impl AccountRepository for PostgresAccountRepository {
    async fn create_account(
        &self,
        account: &NewAccount,
        now: Timestamp,
    ) -> Result<CreatedAccount, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin transaction"))?;

        let user_id = UserId::new();
        sqlx::query(
            r#"
            INSERT INTO users (
                id, full_name, email, password_hash, email_verified, is_active,
                newsletter_opt_in, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, FALSE, TRUE, $5, $6, $6)
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(&account.full_name)
        .bind(account.email.as_str())
        .bind(account.password_hash.expose())
        .bind(account.newsletter_opt_in)
        .bind(now.as_datetime())
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if violated_constraint(&e) == Some(EMAIL_UNIQUE_INDEX) {
                return email_taken();
            }
            DomainError::database("Failed to create user", e)
        })?;

        sqlx::query(
            "INSERT INTO user_settings (user_id, created_at, updated_at) VALUES ($1, $2, $2)",
        )
        .bind(user_id.as_uuid())
        .bind(now.as_datetime())
        .execute(&mut *tx)
        .await
        .map_err(db_error("Failed to create default settings"))?;

        let free_plan: Option<(Uuid,)> =
            sqlx::query_as("SELECT id FROM subscription_plans WHERE plan_type = 'free'")
                .fetch_optional(&mut *tx)
                .await
                .map_err(db_error("Failed to look up free plan"))?;

        let subscription_id = match free_plan {
            Some((plan_uuid,)) => {
                let subscription_id = SubscriptionId::new();
                sqlx::query(
                    r#"
                    INSERT INTO user_subscriptions (
                        id, user_id, plan_id, status, current_period_start, created_at, updated_at
                    ) VALUES ($1, $2, $3, 'active', $4, $4, $4)
                    "#,
                )
                .bind(subscription_id.as_uuid())
                .bind(user_id.as_uuid())
                .bind(plan_uuid)
                .bind(now.as_datetime())
                .execute(&mut *tx)
                .await
                .map_err(db_error("Failed to create free subscription"))?;
                Some(subscription_id)
            }
            None => None,
        };

        tx.commit()
            .await
            .map_err(db_error("Failed to commit registration"))?;

        Ok(CreatedAccount {
            user: User {
                id: user_id,
                full_name: account.full_name.clone(),
                email: account.email.clone(),
                email_verified: false,
                is_active: true,
                newsletter_opt_in: account.newsletter_opt_in,
                created_at: now,
                updated_at: now,
                last_login_at: None,
            },
            subscription_id,
        })
    }

    async fn find_credentials(&self, email: &Email) -> Result<Option<Credentials>, DomainError> {
        self.fetch_by_email(email)
            .await?
            .map(Credentials::try_from)
            .transpose()
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, DomainError> {
        let row: Option<UserRow> =
            sqlx::query_as(&format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS))
                .bind(id.as_uuid())
                .fetch_optional(&self.pool)
                .await
                .map_err(db_error("Failed to find user"))?;
        Ok(row.as_ref().map(User::from))
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, DomainError> {
        Ok(self.fetch_by_email(email).await?.as_ref().map(User::from))
    }

    async fn record_login(&self, id: &UserId, at: Timestamp) -> Result<(), DomainError> {
        let result = sqlx::query(
            "UPDATE users SET last_login_at = $2, updated_at = $2 WHERE id = $1 AND is_active",
        )
        .bind(id.as_uuid())
        .bind(at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to record login"))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(
                ErrorCode::UserNotFound,
                "User not found or inactive",
            ));
        }
        Ok(())
    }
}
