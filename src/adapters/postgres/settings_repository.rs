//! PostgreSQL implementation of SettingsRepository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::{db_error, parse_column, violated_constraint};
use crate::domain::foundation::{DomainError, ErrorCode, Timestamp, UserId};
use crate::domain::settings::UserSettings;
use crate::ports::SettingsRepository;

const USER_FOREIGN_KEY: &str = "user_settings_user_id_fkey";

pub struct PostgresSettingsRepository {
    pool: PgPool,
}

impl PostgresSettingsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct SettingsRow {
    user_id: Uuid,
    email_notifications: bool,
    discord_webhook_url: Option<String>,
    phone_number: Option<String>,
    sms_notifications: bool,
    notification_frequency: String,
    price_drop_alerts: bool,
    restock_alerts: bool,
    price_increase_alerts: bool,
    dashboard_theme: String,
    items_per_page: i32,
    default_currency: String,
    share_data: bool,
    public_profile: bool,
    timezone: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<SettingsRow> for UserSettings {
    type Error = DomainError;

    fn try_from(row: SettingsRow) -> Result<Self, Self::Error> {
        Ok(UserSettings {
            user_id: UserId::from_uuid(row.user_id),
            email_notifications: row.email_notifications,
            discord_webhook_url: row.discord_webhook_url,
            phone_number: row.phone_number,
            sms_notifications: row.sms_notifications,
            notification_frequency: parse_column(
                "notification_frequency",
                &row.notification_frequency,
            )?,
            price_drop_alerts: row.price_drop_alerts,
            restock_alerts: row.restock_alerts,
            price_increase_alerts: row.price_increase_alerts,
            dashboard_theme: parse_column("dashboard_theme", &row.dashboard_theme)?,
            items_per_page: row.items_per_page,
            default_currency: parse_column("default_currency", &row.default_currency)?,
            share_data: row.share_data,
            public_profile: row.public_profile,
            timezone: row.timezone,
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

fn user_not_found() -> DomainError {
    DomainError::new(ErrorCode::UserNotFound, "User not found")
}

#[async_trait]
impl SettingsRepository for PostgresSettingsRepository {
    async fn get_or_create(
        &self,
        user_id: &UserId,
        now: Timestamp,
    ) -> Result<UserSettings, DomainError> {
        let defaults = UserSettings::defaults(*user_id, now);
        let row: SettingsRow = sqlx::query_as(
            r#"
            WITH inserted AS (
                INSERT INTO user_settings (
                    user_id, email_notifications, sms_notifications, notification_frequency,
                    price_drop_alerts, restock_alerts, price_increase_alerts, dashboard_theme,
                    items_per_page, default_currency, share_data, public_profile, timezone,
                    created_at, updated_at
                ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $14)
                ON CONFLICT (user_id) DO NOTHING
                RETURNING *
            )
            SELECT * FROM inserted
            UNION ALL
            SELECT * FROM user_settings WHERE user_id = $1
            LIMIT 1
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(defaults.email_notifications)
        .bind(defaults.sms_notifications)
        .bind(defaults.notification_frequency.as_str())
        .bind(defaults.price_drop_alerts)
        .bind(defaults.restock_alerts)
        .bind(defaults.price_increase_alerts)
        .bind(defaults.dashboard_theme.as_str())
        .bind(defaults.items_per_page)
        .bind(defaults.default_currency.code())
        .bind(defaults.share_data)
        .bind(defaults.public_profile)
        .bind(&defaults.timezone)
        .bind(now.as_datetime())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if violated_constraint(&e) == Some(USER_FOREIGN_KEY) {
                return user_not_found();
            }
            DomainError::database("Failed to load settings", e)
        })?;

        UserSettings::try_from(row)
    }

    async fn save(&self, settings: &UserSettings) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE user_settings SET
                email_notifications = $2,
                discord_webhook_url = $3,
                phone_number = $4,
                sms_notifications = $5,
                notification_frequency = $6,
                price_drop_alerts = $7,
                restock_alerts = $8,
                price_increase_alerts = $9,
                dashboard_theme = $10,
                items_per_page = $11,
                default_currency = $12,
                share_data = $13,
                public_profile = $14,
                timezone = $15,
                updated_at = $16
            WHERE user_id = $1
            "#,
        )
        .bind(settings.user_id.as_uuid())
        .bind(settings.email_notifications)
        .bind(&settings.discord_webhook_url)
        .bind(&settings.phone_number)
        .bind(settings.sms_notifications)
        .bind(settings.notification_frequency.as_str())
        .bind(settings.price_drop_alerts)
        .bind(settings.restock_alerts)
        .bind(settings.price_increase_alerts)
        .bind(settings.dashboard_theme.as_str())
        .bind(settings.items_per_page)
        .bind(settings.default_currency.code())
        .bind(settings.share_data)
        .bind(settings.public_profile)
        .bind(&settings.timezone)
        .bind(settings.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to save settings"))?;

        if result.rows_affected() == 0 {
            return Err(user_not_found());
        }
        Ok(())
    }
}
