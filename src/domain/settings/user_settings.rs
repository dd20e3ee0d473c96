//! Per-user notification, display and privacy settings.

use serde::{Deserialize, Serialize};

use super::{
    validate_discord_webhook, validate_items_per_page, validate_phone_number, validate_timezone,
    Currency, DashboardTheme, NotificationFrequency,
};
use crate::domain::foundation::{DomainError, FieldUpdate, Timestamp, UserId};

pub const DEFAULT_TIMEZONE: &str = "UTC";
pub const DEFAULT_ITEMS_PER_PAGE: i32 = 10;

/// One settings row per user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserSettings {
    pub user_id: UserId,
    pub email_notifications: bool,
    pub discord_webhook_url: Option<String>,
    pub phone_number: Option<String>,
    pub sms_notifications: bool,
    pub notification_frequency: NotificationFrequency,
    pub price_drop_alerts: bool,
    pub restock_alerts: bool,
    pub price_increase_alerts: bool,
    pub dashboard_theme: DashboardTheme,
    pub items_per_page: i32,
    pub default_currency: Currency,
    pub share_data: bool,
    pub public_profile: bool,
    pub timezone: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl UserSettings {
    /// Settings a new account starts with.
    pub fn defaults(user_id: UserId, now: Timestamp) -> Self {
        Self {
            user_id,
            email_notifications: true,
            discord_webhook_url: None,
            phone_number: None,
            sms_notifications: false,
            notification_frequency: NotificationFrequency::Instant,
            price_drop_alerts: true,
            restock_alerts: true,
            price_increase_alerts: false,
            dashboard_theme: DashboardTheme::Light,
            items_per_page: DEFAULT_ITEMS_PER_PAGE,
            default_currency: Currency::Usd,
            share_data: false,
            public_profile: false,
            timezone: DEFAULT_TIMEZONE.to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Applies a validated patch. Absent fields keep their current value.
    pub fn apply(&mut self, patch: SettingsPatch, now: Timestamp) {
        fn set<T>(target: &mut T, value: Option<T>) {
            if let Some(v) = value {
                *target = v;
            }
        }

        set(&mut self.email_notifications, patch.email_notifications);
        self.discord_webhook_url = patch.discord_webhook_url.apply(self.discord_webhook_url.take());
        self.phone_number = patch.phone_number.apply(self.phone_number.take());
        set(&mut self.sms_notifications, patch.sms_notifications);
        set(&mut self.notification_frequency, patch.notification_frequency);
        set(&mut self.price_drop_alerts, patch.price_drop_alerts);
        set(&mut self.restock_alerts, patch.restock_alerts);
        set(&mut self.price_increase_alerts, patch.price_increase_alerts);
        set(&mut self.dashboard_theme, patch.dashboard_theme);
        set(&mut self.items_per_page, patch.items_per_page);
        set(&mut self.default_currency, patch.default_currency);
        set(&mut self.share_data, patch.share_data);
        set(&mut self.public_profile, patch.public_profile);
        set(&mut self.timezone, patch.timezone);
        self.updated_at = now;
    }
}

/// Raw settings update as received from a caller.
///
/// `None` leaves a field unchanged. For the webhook URL and phone number an
/// empty string clears the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SettingsChanges {
    pub email_notifications: Option<bool>,
    pub discord_webhook_url: Option<String>,
    pub phone_number: Option<String>,
    pub sms_notifications: Option<bool>,
    pub notification_frequency: Option<String>,
    pub price_drop_alerts: Option<bool>,
    pub restock_alerts: Option<bool>,
    pub price_increase_alerts: Option<bool>,
    pub dashboard_theme: Option<String>,
    pub items_per_page: Option<i32>,
    pub default_currency: Option<String>,
    pub share_data: Option<bool>,
    pub public_profile: Option<bool>,
    pub timezone: Option<String>,
}

/// Validated settings update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsPatch {
    pub email_notifications: Option<bool>,
    pub discord_webhook_url: FieldUpdate<String>,
    pub phone_number: FieldUpdate<String>,
    pub sms_notifications: Option<bool>,
    pub notification_frequency: Option<NotificationFrequency>,
    pub price_drop_alerts: Option<bool>,
    pub restock_alerts: Option<bool>,
    pub price_increase_alerts: Option<bool>,
    pub dashboard_theme: Option<DashboardTheme>,
    pub items_per_page: Option<i32>,
    pub default_currency: Option<Currency>,
    pub share_data: Option<bool>,
    pub public_profile: Option<bool>,
    pub timezone: Option<String>,
}

impl SettingsChanges {
    /// Validates every supplied field, failing on the first bad one.
    pub fn validate(self) -> Result<SettingsPatch, DomainError> {
        let discord_webhook_url = FieldUpdate::from_nullable(self.discord_webhook_url.as_deref())
            .try_map(|url| validate_discord_webhook(&url))?;
        let phone_number = FieldUpdate::from_nullable(self.phone_number.as_deref())
            .try_map(|phone| validate_phone_number(&phone))?;

        Ok(SettingsPatch {
            email_notifications: self.email_notifications,
            discord_webhook_url,
            phone_number,
            sms_notifications: self.sms_notifications,
            notification_frequency: self
                .notification_frequency
                .as_deref()
                .map(str::parse::<NotificationFrequency>)
                .transpose()?,
            price_drop_alerts: self.price_drop_alerts,
            restock_alerts: self.restock_alerts,
            price_increase_alerts: self.price_increase_alerts,
            dashboard_theme: self
                .dashboard_theme
                .as_deref()
                .map(str::parse::<DashboardTheme>)
                .transpose()?,
            items_per_page: self.items_per_page.map(validate_items_per_page).transpose()?,
            default_currency: self
                .default_currency
                .as_deref()
                .map(str::parse::<Currency>)
                .transpose()?,
            share_data: self.share_data,
            public_profile: self.public_profile,
            timezone: self.timezone.as_deref().map(validate_timezone).transpose()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> UserSettings {
        UserSettings::defaults(UserId::new(), Timestamp::now())
    }

    #[test]
    fn defaults_match_product_defaults() {
        let s = settings();
        assert!(s.email_notifications);
        assert!(!s.sms_notifications);
        assert_eq!(s.notification_frequency, NotificationFrequency::Instant);
        assert!(s.price_drop_alerts);
        assert!(s.restock_alerts);
        assert!(!s.price_increase_alerts);
        assert_eq!(s.dashboard_theme, DashboardTheme::Light);
        assert_eq!(s.items_per_page, 10);
        assert_eq!(s.default_currency, Currency::Usd);
        assert!(!s.share_data);
        assert!(!s.public_profile);
        assert_eq!(s.timezone, "UTC");
    }

    #[test]
    fn empty_changes_leave_settings_untouched() {
        let mut s = settings();
        s.discord_webhook_url = Some("https://discord.com/api/webhooks/1/a".to_string());
        let before = s.clone();

        let patch = SettingsChanges::default().validate().unwrap();
        s.apply(patch, before.updated_at);
        assert_eq!(s, before);
    }

    #[test]
    fn empty_webhook_clears_but_null_keeps() {
        let mut s = settings();
        s.discord_webhook_url = Some("https://discord.com/api/webhooks/1/a".to_string());
        s.phone_number = Some("5551234567".to_string());

        let patch = SettingsChanges {
            discord_webhook_url: Some(String::new()),
            ..Default::default()
        }
        .validate()
        .unwrap();
        s.apply(patch, Timestamp::now());

        assert_eq!(s.discord_webhook_url, None);
        assert_eq!(s.phone_number.as_deref(), Some("5551234567"));
    }

    #[test]
    fn parses_enums_and_ranges() {
        let patch = SettingsChanges {
            notification_frequency: Some("weekly".to_string()),
            dashboard_theme: Some("auto".to_string()),
            items_per_page: Some(25),
            default_currency: Some("eur".to_string()),
            timezone: Some("America/New_York".to_string()),
            ..Default::default()
        }
        .validate()
        .unwrap();

        let mut s = settings();
        s.apply(patch, Timestamp::now());
        assert_eq!(s.notification_frequency, NotificationFrequency::Weekly);
        assert_eq!(s.dashboard_theme, DashboardTheme::Auto);
        assert_eq!(s.items_per_page, 25);
        assert_eq!(s.default_currency, Currency::Eur);
        assert_eq!(s.timezone, "America/New_York");
    }

    #[test]
    fn invalid_fields_are_rejected() {
        let bad_webhook = SettingsChanges {
            discord_webhook_url: Some("https://hooks.slack.com/x".to_string()),
            ..Default::default()
        };
        assert!(bad_webhook.validate().is_err());

        let bad_page = SettingsChanges {
            items_per_page: Some(500),
            ..Default::default()
        };
        assert!(bad_page.validate().is_err());

        let bad_phone = SettingsChanges {
            phone_number: Some("123".to_string()),
            ..Default::default()
        };
        assert!(bad_phone.validate().is_err());
    }
}
