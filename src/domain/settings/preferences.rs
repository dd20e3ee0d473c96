//! Notification and display preference enums.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::domain::foundation::{DomainError, ErrorCode, ValidationError};

/// How often alerts are batched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum NotificationFrequency {
    #[default]
    Instant,
    Hourly,
    Daily,
    Weekly,
}

impl NotificationFrequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationFrequency::Instant => "instant",
            NotificationFrequency::Hourly => "hourly",
            NotificationFrequency::Daily => "daily",
            NotificationFrequency::Weekly => "weekly",
        }
    }
}

impl FromStr for NotificationFrequency {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "instant" => Ok(NotificationFrequency::Instant),
            "hourly" => Ok(NotificationFrequency::Hourly),
            "daily" => Ok(NotificationFrequency::Daily),
            "weekly" => Ok(NotificationFrequency::Weekly),
            other => Err(DomainError::new(
                ErrorCode::InvalidFormat,
                format!("Invalid notification frequency: {}", other),
            )
            .with_detail("field", "notification_frequency")),
        }
    }
}

/// Dashboard colour scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DashboardTheme {
    #[default]
    Light,
    Dark,
    Auto,
}

impl DashboardTheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            DashboardTheme::Light => "light",
            DashboardTheme::Dark => "dark",
            DashboardTheme::Auto => "auto",
        }
    }
}

impl FromStr for DashboardTheme {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "light" => Ok(DashboardTheme::Light),
            "dark" => Ok(DashboardTheme::Dark),
            "auto" => Ok(DashboardTheme::Auto),
            other => Err(DomainError::new(
                ErrorCode::InvalidFormat,
                format!("Invalid dashboard theme: {}", other),
            )
            .with_detail("field", "dashboard_theme")),
        }
    }
}

/// Rows per dashboard page.
pub const ITEMS_PER_PAGE_RANGE: std::ops::RangeInclusive<i32> = 5..=100;

pub fn validate_items_per_page(value: i32) -> Result<i32, ValidationError> {
    if ITEMS_PER_PAGE_RANGE.contains(&value) {
        Ok(value)
    } else {
        Err(ValidationError::out_of_range(
            "items_per_page",
            i64::from(*ITEMS_PER_PAGE_RANGE.start()),
            i64::from(*ITEMS_PER_PAGE_RANGE.end()),
            i64::from(value),
        ))
    }
}

/// IANA-style timezone name. Only shape is checked.
pub fn validate_timezone(value: &str) -> Result<String, ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ValidationError::empty_field("timezone"));
    }
    if value.len() > 64 || value.chars().any(char::is_whitespace) {
        return Err(ValidationError::invalid_format("timezone", "Invalid timezone name"));
    }
    Ok(value.to_string())
}
