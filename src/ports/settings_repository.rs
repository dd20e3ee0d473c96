//! User settings repository port.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, Timestamp, UserId};
use crate::domain::settings::UserSettings;

#[async_trait]
pub trait SettingsRepository: Send + Sync {
    /// Returns the user's settings, inserting the defaults first if absent.
    async fn get_or_create(&self, user_id: &UserId, now: Timestamp)
        -> Result<UserSettings, DomainError>;

    /// Overwrites every settings column.
    async fn save(&self, settings: &UserSettings) -> Result<(), DomainError>;
}
