//! PostgreSQL implementation of PasswordResetRepository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::db_error;
use crate::domain::account::{PasswordHash, ResetTokenRecord};
use crate::domain::foundation::{DomainError, ErrorCode, Timestamp, UserId};
use crate::ports::PasswordResetRepository;

pub struct PostgresPasswordResetRepository {
    pool: PgPool,
}

impl PostgresPasswordResetRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct TokenRow {
    user_id: Uuid,
    token_hash: String,
    expires_at: DateTime<Utc>,
    used_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl From<TokenRow> for ResetTokenRecord {
    fn from(row: TokenRow) -> Self {
        ResetTokenRecord {
            user_id: UserId::from_uuid(row.user_id),
            token_hash: row.token_hash,
            expires_at: Timestamp::from_datetime(row.expires_at),
            used_at: row.used_at.map(Timestamp::from_datetime),
            created_at: Timestamp::from_datetime(row.created_at),
        }
    }
}

fn invalid_token() -> DomainError {
    DomainError::new(ErrorCode::ResetTokenInvalid, "Invalid or expired reset token")
}

#[async_trait]
impl PasswordResetRepository for PostgresPasswordResetRepository {
    async fn store(&self, record: &ResetTokenRecord) -> Result<(), DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin transaction"))?;

        sqlx::query(
            "UPDATE password_reset_tokens SET used_at = $2 WHERE user_id = $1 AND used_at IS NULL",
        )
        .bind(record.user_id.as_uuid())
        .bind(record.created_at.as_datetime())
        .execute(&mut *tx)
        .await
        .map_err(db_error("Failed to retire reset tokens"))?;

        sqlx::query(
            r#"
            INSERT INTO password_reset_tokens (user_id, token_hash, expires_at, used_at, created_at)
            VALUES ($1, $2, $3, NULL, $4)
            "#,
        )
        .bind(record.user_id.as_uuid())
        .bind(&record.token_hash)
        .bind(record.expires_at.as_datetime())
        .bind(record.created_at.as_datetime())
        .execute(&mut *tx)
        .await
        .map_err(db_error("Failed to store reset token"))?;

        tx.commit()
            .await
            .map_err(db_error("Failed to commit reset token"))
    }

    async fn find_by_hash(&self, token_hash: &str) -> Result<Option<ResetTokenRecord>, DomainError> {
        let row: Option<TokenRow> = sqlx::query_as(
            r#"
            SELECT user_id, token_hash, expires_at, used_at, created_at
            FROM password_reset_tokens
            WHERE token_hash = $1
            "#,
        )
        .bind(token_hash)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to find reset token"))?;

        Ok(row.map(ResetTokenRecord::from))
    }

    async fn consume(
        &self,
        token_hash: &str,
        new_password_hash: &PasswordHash,
        now: Timestamp,
    ) -> Result<UserId, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin transaction"))?;

        let row: Option<TokenRow> = sqlx::query_as(
            r#"
            SELECT t.user_id, t.token_hash, t.expires_at, t.used_at, t.created_at
            FROM password_reset_tokens t
            JOIN users u ON u.id = t.user_id
            WHERE t.token_hash = $1 AND u.is_active
            FOR UPDATE OF t
            "#,
        )
        .bind(token_hash)
        .fetch_optional(&mut *tx)
        .await
        .map_err(db_error("Failed to lock reset token"))?;

        let record = row.map(ResetTokenRecord::from).ok_or_else(invalid_token)?;
        if !record.is_usable(now) {
            return Err(invalid_token());
        }

        sqlx::query("UPDATE password_reset_tokens SET used_at = $2 WHERE token_hash = $1")
            .bind(token_hash)
            .bind(now.as_datetime())
            .execute(&mut *tx)
            .await
            .map_err(db_error("Failed to mark reset token used"))?;

        sqlx::query("UPDATE users SET password_hash = $2, updated_at = $3 WHERE id = $1")
            .bind(record.user_id.as_uuid())
            .bind(new_password_hash.expose())
            .bind(now.as_datetime())
            .execute(&mut *tx)
            .await
            .map_err(db_error("Failed to update password"))?;

        tx.commit()
            .await
            .map_err(db_error("Failed to commit password reset"))?;

        Ok(record.user_id)
    }
}
