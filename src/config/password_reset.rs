//! Password reset configuration

use serde::Deserialize;

use super::error::ValidationError;

const MAX_TOKEN_TTL_HOURS: i64 = 168;

/// Password reset configuration
#[derive(Debug, Clone, Deserialize)]
pub struct PasswordResetConfig {
    /// Hours an issued reset token stays valid
    #[serde(default = "default_token_ttl_hours")]
    pub token_ttl_hours: i64,
}

impl PasswordResetConfig {
    /// Validate password reset configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.token_ttl_hours <= 0 || self.token_ttl_hours > MAX_TOKEN_TTL_HOURS {
            return Err(ValidationError::InvalidTokenTtl);
        }
        Ok(())
    }
}

impl Default for PasswordResetConfig {
    fn default() -> Self {
        Self {
            token_ttl_hours: default_token_ttl_hours(),
        }
    }
}

fn default_token_ttl_hours() -> i64 {
    24
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_ttl_is_one_day() {
        let config = PasswordResetConfig::default();
        assert_eq!(config.token_ttl_hours, 24);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn ttl_bounds_are_enforced() {
        for hours in [0, -1, 169] {
            let config = PasswordResetConfig {
                token_ttl_hours: hours,
            };
            assert_eq!(config.validate(), Err(ValidationError::InvalidTokenTtl));
        }
    }
}
