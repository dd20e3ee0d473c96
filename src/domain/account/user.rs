//! User account entity and registration input.

use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use std::fmt;

use super::Email;
use crate::domain::foundation::{Timestamp, UserId, ValidationError};

/// Opaque password hash produced by the web tier.
///
/// Never printed; `Debug` shows a redacted placeholder.
pub struct PasswordHash(SecretString);

impl PasswordHash {
    pub fn new(hash: impl Into<String>) -> Result<Self, ValidationError> {
        let hash = hash.into();
        if hash.trim().is_empty() {
            return Err(ValidationError::empty_field("password_hash"));
        }
        Ok(Self(SecretString::new(hash)))
    }

    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl Clone for PasswordHash {
    fn clone(&self) -> Self {
        Self(SecretString::new(self.0.expose_secret().clone()))
    }
}

impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordHash([REDACTED])")
    }
}

/// A registered user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: UserId,
    pub full_name: String,
    pub email: Email,
    pub email_verified: bool,
    pub is_active: bool,
    pub newsletter_opt_in: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub last_login_at: Option<Timestamp>,
}

/// Validated registration input.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub full_name: String,
    pub email: Email,
    pub password_hash: PasswordHash,
    pub newsletter_opt_in: bool,
}

impl NewAccount {
    pub const MAX_NAME_LENGTH: usize = 255;

    /// Trims and validates raw registration fields.
    ///
    /// Fails on the first blank or malformed field, before anything is written.
    pub fn new(
        full_name: &str,
        email: &str,
        password_hash: &str,
        newsletter_opt_in: bool,
    ) -> Result<Self, ValidationError> {
        let full_name = full_name.trim();
        if full_name.is_empty() {
            return Err(ValidationError::empty_field("full_name"));
        }
        let name_len = full_name.chars().count();
        if name_len > Self::MAX_NAME_LENGTH {
            return Err(ValidationError::out_of_range(
                "full_name",
                1,
                Self::MAX_NAME_LENGTH as i64,
                name_len as i64,
            ));
        }
        let email = Email::parse(email)?;
        let password_hash = PasswordHash::new(password_hash.trim())?;

        Ok(Self {
            full_name: full_name.to_string(),
            email,
            password_hash,
            newsletter_opt_in,
        })
    }
}

/// What login verification needs: the stored hash and account flags.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub user_id: UserId,
    pub full_name: String,
    pub email: Email,
    pub password_hash: PasswordHash,
    pub email_verified: bool,
    pub is_active: bool,
}
