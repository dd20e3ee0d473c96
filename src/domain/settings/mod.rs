//! Settings domain - notification targets, display and privacy preferences.

mod contact;
mod currency;
mod preferences;
mod user_settings;

pub use contact::{validate_discord_webhook, validate_phone_number, MAX_PHONE_LENGTH, MIN_PHONE_DIGITS};
pub use currency::{format_currency, Currency};
pub use preferences::{
    validate_items_per_page, validate_timezone, DashboardTheme, NotificationFrequency,
    ITEMS_PER_PAGE_RANGE,
};
pub use user_settings::{
    SettingsChanges, SettingsPatch, UserSettings, DEFAULT_ITEMS_PER_PAGE, DEFAULT_TIMEZONE,
};
