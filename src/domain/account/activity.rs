//! Audit trail entries for user activity.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::{DomainError, ErrorCode, Timestamp, UserId};

/// Kind of event written to the activity log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityType {
    Registration,
    RegistrationFailed,
    Login,
    Logout,
    PasswordResetRequested,
    PasswordReset,
    SubscriptionCreated,
    SubscriptionCancelled,
    AddonAdded,
    PaymentRecorded,
    ProductAdded,
    ProductUpdated,
    ProductDeleted,
    SettingsUpdated,
}

impl ActivityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityType::Registration => "registration",
            ActivityType::RegistrationFailed => "registration_failed",
            ActivityType::Login => "login",
            ActivityType::Logout => "logout",
            ActivityType::PasswordResetRequested => "password_reset_requested",
            ActivityType::PasswordReset => "password_reset",
            ActivityType::SubscriptionCreated => "subscription_created",
            ActivityType::SubscriptionCancelled => "subscription_cancelled",
            ActivityType::AddonAdded => "addon_added",
            ActivityType::PaymentRecorded => "payment_recorded",
            ActivityType::ProductAdded => "product_added",
            ActivityType::ProductUpdated => "product_updated",
            ActivityType::ProductDeleted => "product_deleted",
            ActivityType::SettingsUpdated => "settings_updated",
        }
    }

    const ALL: [ActivityType; 14] = [
        ActivityType::Registration,
        ActivityType::RegistrationFailed,
        ActivityType::Login,
        ActivityType::Logout,
        ActivityType::PasswordResetRequested,
        ActivityType::PasswordReset,
        ActivityType::SubscriptionCreated,
        ActivityType::SubscriptionCancelled,
        ActivityType::AddonAdded,
        ActivityType::PaymentRecorded,
        ActivityType::ProductAdded,
        ActivityType::ProductUpdated,
        ActivityType::ProductDeleted,
        ActivityType::SettingsUpdated,
    ];
}

impl fmt::Display for ActivityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActivityType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == wanted)
            .ok_or_else(|| {
                DomainError::new(
                    ErrorCode::InvalidFormat,
                    format!("Unknown activity type: {}", s.trim()),
                )
                .with_detail("field", "activity_type")
            })
    }
}

/// One row of the activity log.
///
/// `user_id` is absent for events that could not be tied to an account,
/// such as a registration that failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActivityEntry {
    pub user_id: Option<UserId>,
    pub activity_type: ActivityType,
    pub description: Option<String>,
    pub occurred_at: Timestamp,
}

impl ActivityEntry {
    pub fn for_user(user_id: UserId, activity_type: ActivityType) -> Self {
        Self {
            user_id: Some(user_id),
            activity_type,
            description: None,
            occurred_at: Timestamp::now(),
        }
    }

    pub fn anonymous(activity_type: ActivityType) -> Self {
        Self {
            user_id: None,
            activity_type,
            description: None,
            occurred_at: Timestamp::now(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}
