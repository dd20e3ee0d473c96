//! PostgreSQL implementation of PaymentRepository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use super::{db_error, parse_column, violated_constraint};
use crate::domain::foundation::{
    DomainError, ErrorCode, PaymentId, SubscriptionId, Timestamp, UserId,
};
use crate::domain::subscription::Payment;
use crate::ports::PaymentRepository;

const USER_FOREIGN_KEY: &str = "payment_history_user_id_fkey";

pub struct PostgresPaymentRepository {
    pool: PgPool,
}

impl PostgresPaymentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct PaymentRow {
    id: Uuid,
    user_id: Uuid,
    subscription_id: Option<Uuid>,
    stripe_payment_intent_id: Option<String>,
    amount: Decimal,
    currency: String,
    status: String,
    description: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<PaymentRow> for Payment {
    type Error = DomainError;

    fn try_from(row: PaymentRow) -> Result<Self, Self::Error> {
        Ok(Payment {
            id: PaymentId::from_uuid(row.id),
            user_id: UserId::from_uuid(row.user_id),
            subscription_id: row.subscription_id.map(SubscriptionId::from_uuid),
            stripe_payment_intent_id: row.stripe_payment_intent_id,
            amount: row.amount,
            currency: parse_column("currency", &row.currency)?,
            status: parse_column("status", &row.status)?,
            description: row.description,
            created_at: Timestamp::from_datetime(row.created_at),
        })
    }
}

#[async_trait]
impl PaymentRepository for PostgresPaymentRepository {
    async fn record(&self, payment: &Payment) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO payment_history (
                id, user_id, subscription_id, stripe_payment_intent_id, amount,
                currency, status, description, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(payment.id.as_uuid())
        .bind(payment.user_id.as_uuid())
        .bind(payment.subscription_id.as_ref().map(SubscriptionId::as_uuid))
        .bind(&payment.stripe_payment_intent_id)
        .bind(payment.amount)
        .bind(payment.currency.code())
        .bind(payment.status.as_str())
        .bind(&payment.description)
        .bind(payment.created_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if violated_constraint(&e) == Some(USER_FOREIGN_KEY) {
                return DomainError::new(ErrorCode::UserNotFound, "User not found");
            }
            DomainError::database("Failed to record payment", e)
        })?;

        Ok(())
    }

    async fn list_for_user(
        &self,
        user_id: &UserId,
        limit: usize,
    ) -> Result<Vec<Payment>, DomainError> {
        let rows: Vec<PaymentRow> = sqlx::query_as(
            r#"
            SELECT id, user_id, subscription_id, stripe_payment_intent_id, amount,
                   currency, status, description, created_at
            FROM payment_history
            WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT $2
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to load payments"))?;

        rows.into_iter().map(Payment::try_from).collect()
    }
}
