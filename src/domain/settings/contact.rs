//! Validation for alert delivery targets.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::foundation::ValidationError;

static DISCORD_WEBHOOK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^https://(discord|discordapp)\.com/api/webhooks/\S+$")
        .expect("discord webhook pattern is valid")
});

/// Minimum digits a phone number must contain once formatting is stripped.
pub const MIN_PHONE_DIGITS: usize = 10;

/// Width of the `phone_number` column.
pub const MAX_PHONE_LENGTH: usize = 32;

/// Accepts Discord webhook URLs only.
pub fn validate_discord_webhook(url: &str) -> Result<String, ValidationError> {
    let url = url.trim();
    if DISCORD_WEBHOOK.is_match(url) {
        Ok(url.to_string())
    } else {
        Err(ValidationError::invalid_format(
            "discord_webhook_url",
            "Invalid Discord webhook URL",
        ))
    }
}

/// Accepts any formatting as long as enough digits remain.
pub fn validate_phone_number(phone: &str) -> Result<String, ValidationError> {
    let phone = phone.trim();
    let length = phone.chars().count();
    if length > MAX_PHONE_LENGTH {
        return Err(ValidationError::out_of_range(
            "phone_number",
            MIN_PHONE_DIGITS as i64,
            MAX_PHONE_LENGTH as i64,
            length as i64,
        ));
    }
    let digits = phone.chars().filter(char::is_ascii_digit).count();
    if digits >= MIN_PHONE_DIGITS {
        Ok(phone.to_string())
    } else {
        Err(ValidationError::invalid_format(
            "phone_number",
            format!("Phone number must contain at least {} digits", MIN_PHONE_DIGITS),
        ))
    }
}
