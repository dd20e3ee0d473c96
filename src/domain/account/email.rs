//! Email address value object.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::ValidationError;

static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
});

/// A normalized email address.
///
/// Always trimmed and lower-cased, so equality is case-insensitive.
///
/// ## Constraints
///
/// - Length: 6-255 characters after trimming
/// - One `@`, a non-empty local part, and a dotted domain
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Email(String);

impl Email {
    pub const MIN_LENGTH: usize = 6;
    pub const MAX_LENGTH: usize = 255;

    /// Parse and normalize an email address.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let normalized = raw.trim().to_lowercase();
        if normalized.is_empty() {
            return Err(ValidationError::empty_field("email"));
        }
        if !is_well_formed(&normalized) {
            return Err(ValidationError::invalid_format("email", "Invalid email format"));
        }
        Ok(Self(normalized))
    }

    /// Rebuilds an email that was normalized before it was stored.
    pub(crate) fn from_stored(value: String) -> Self {
        Self(value)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Part before the `@`.
    pub fn local_part(&self) -> &str {
        self.0.split('@').next().unwrap_or("")
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn is_well_formed(candidate: &str) -> bool {
    let len = candidate.chars().count();
    (Email::MIN_LENGTH..=Email::MAX_LENGTH).contains(&len) && EMAIL_PATTERN.is_match(candidate)
}

/// Returns true if `candidate` is an acceptable email address as typed.
pub fn is_valid_email(candidate: &str) -> bool {
    is_well_formed(candidate.trim())
}
