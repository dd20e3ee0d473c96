//! PostgreSQL adapters - Database implementations for repository ports.
//!
//! This module provides adapters for PostgreSQL-backed persistence:
//! - `PostgresAccountRepository` - users plus registration provisioning
//! - `PostgresActivityLog` - `user_activity_log` appends
//! - `PostgresPasswordResetRepository` - hashed reset tokens
//! - `PostgresSubscriptionRepository` - plans, add-ons, subscriptions
//! - `PostgresPaymentRepository` - `payment_history`
//! - `PostgresProductRepository` - tracked products and price statistics
//! - `PostgresSettingsRepository` - `user_settings`
//!
//! Every mutating operation that touches more than one row runs in a single
//! transaction; dropping the transaction on an early return rolls it back.

mod account_repository;
mod activity_log;
mod password_reset_repository;
mod payment_repository;
mod pool;
mod product_repository;
mod settings_repository;
mod subscription_repository;

pub use account_repository::PostgresAccountRepository;
pub use activity_log::PostgresActivityLog;
pub use password_reset_repository::PostgresPasswordResetRepository;
pub use payment_repository::PostgresPaymentRepository;
pub use pool::{create_pool, run_migrations};
pub use product_repository::PostgresProductRepository;
pub use settings_repository::PostgresSettingsRepository;
pub use subscription_repository::PostgresSubscriptionRepository;

use sqlx::PgConnection;
use std::str::FromStr;

use crate::domain::foundation::{DomainError, ErrorCode, UserId};

/// Wraps a sqlx failure as an internal error carrying `context`.
fn db_error(context: &'static str) -> impl FnOnce(sqlx::Error) -> DomainError {
    move |e| DomainError::database(context, e)
}

/// Name of the constraint a database error violated, if any.
fn violated_constraint(err: &sqlx::Error) -> Option<&str> {
    match err {
        sqlx::Error::Database(db_err) => db_err.constraint(),
        _ => None,
    }
}

/// Parses a text column into a domain enum, treating bad values as corruption.
fn parse_column<T>(column: &str, value: &str) -> Result<T, DomainError>
where
    T: FromStr<Err = DomainError>,
{
    value.parse().map_err(|_| {
        DomainError::new(
            ErrorCode::DatabaseError,
            format!("Invalid {} value: {}", column, value),
        )
    })
}

/// Locks the user row for the rest of the transaction and returns `is_active`.
///
/// Serialises subscription changes and product inserts per user.
async fn lock_user(conn: &mut PgConnection, user_id: &UserId) -> Result<bool, DomainError> {
    let row: Option<(bool,)> =
        sqlx::query_as("SELECT is_active FROM users WHERE id = $1 FOR UPDATE")
            .bind(user_id.as_uuid())
            .fetch_optional(conn)
            .await
            .map_err(db_error("Failed to lock user"))?;

    row.map(|(is_active,)| is_active)
        .ok_or_else(|| DomainError::new(ErrorCode::UserNotFound, "User not found"))
}

/// Like [`lock_user`], but refuses disabled accounts.
async fn lock_active_user(conn: &mut PgConnection, user_id: &UserId) -> Result<(), DomainError> {
    if lock_user(conn, user_id).await? {
        Ok(())
    } else {
        Err(DomainError::new(ErrorCode::AccountInactive, "Account is disabled"))
    }
}
