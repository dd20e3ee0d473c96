//! Password reset tokens.
//!
//! The raw token is handed to the caller exactly once (to be emailed); only
//! its SHA-256 digest is persisted.

use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::domain::foundation::{Timestamp, UserId};

/// Hex-encoded SHA-256 of a raw reset token.
pub fn hash_reset_token(raw: &str) -> String {
    format!("{:x}", Sha256::digest(raw.trim().as_bytes()))
}

/// A freshly issued token together with the record to store for it.
#[derive(Debug, Clone)]
pub struct IssuedResetToken {
    pub token: String,
    pub record: ResetTokenRecord,
}

impl IssuedResetToken {
    /// Issues a 64 hex character token valid for `ttl_hours`.
    pub fn issue(user_id: UserId, now: Timestamp, ttl_hours: i64) -> Self {
        let token = format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple());
        let record = ResetTokenRecord {
            user_id,
            token_hash: hash_reset_token(&token),
            expires_at: now.plus_hours(ttl_hours),
            used_at: None,
            created_at: now,
        };
        Self { token, record }
    }
}

/// Stored form of a reset token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResetTokenRecord {
    pub user_id: UserId,
    pub token_hash: String,
    pub expires_at: Timestamp,
    pub used_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

impl ResetTokenRecord {
    /// Unused and not yet expired.
    pub fn is_usable(&self, now: Timestamp) -> bool {
        self.used_at.is_none() && now.is_before(&self.expires_at)
    }
}
