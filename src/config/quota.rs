//! Product quota configuration

use serde::Deserialize;

use super::error::ValidationError;

/// Quota configuration
#[derive(Debug, Clone, Deserialize)]
pub struct QuotaConfig {
    /// Limit applied when a user has no subscription and no free plan exists
    #[serde(default = "default_free_tier_fallback_limit")]
    pub free_tier_fallback_limit: u32,
}

impl QuotaConfig {
    /// Validate quota configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.free_tier_fallback_limit == 0 {
            return Err(ValidationError::InvalidFallbackLimit);
        }
        Ok(())
    }
}

impl Default for QuotaConfig {
    fn default() -> Self {
        Self {
            free_tier_fallback_limit: default_free_tier_fallback_limit(),
        }
    }
}

fn default_free_tier_fallback_limit() -> u32 {
    2
}
