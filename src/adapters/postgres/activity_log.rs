//! PostgreSQL implementation of ActivityLog.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::{db_error, parse_column};
use crate::domain::account::ActivityEntry;
use crate::domain::foundation::{DomainError, Timestamp, UserId};
use crate::ports::ActivityLog;

/// Appends to `user_activity_log`.
pub struct PostgresActivityLog {
    pool: PgPool,
}

impl PostgresActivityLog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ActivityRow {
    user_id: Option<Uuid>,
    activity_type: String,
    description: Option<String>,
    occurred_at: DateTime<Utc>,
}

impl TryFrom<ActivityRow> for ActivityEntry {
    type Error = DomainError;

    fn try_from(row: ActivityRow) -> Result<Self, Self::Error> {
        Ok(ActivityEntry {
            user_id: row.user_id.map(UserId::from_uuid),
            activity_type: parse_column("activity_type", &row.activity_type)?,
            description: row.description,
            occurred_at: Timestamp::from_datetime(row.occurred_at),
        })
    }
}

#[async_trait]
impl ActivityLog for PostgresActivityLog {
    async fn record(&self, entry: &ActivityEntry) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO user_activity_log (user_id, activity_type, description, occurred_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(entry.user_id.as_ref().map(UserId::as_uuid))
        .bind(entry.activity_type.as_str())
        .bind(&entry.description)
        .bind(entry.occurred_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to record activity"))?;

        Ok(())
    }

    async fn recent_for_user(
        &self,
        user_id: &UserId,
        limit: usize,
    ) -> Result<Vec<ActivityEntry>, DomainError> {
        let rows: Vec<ActivityRow> = sqlx::query_as(
            r#"
            SELECT user_id, activity_type, description, occurred_at
            FROM user_activity_log
            WHERE user_id = $1
            ORDER BY occurred_at DESC, id DESC
            LIMIT $2
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to load activity"))?;

        rows.into_iter().map(ActivityEntry::try_from).collect()
    }
}
