//! Application configuration module
//!
//! Configuration is read from environment variables with the `STOCKWATCH`
//! prefix; nested values are separated by a double underscore.
//!
//! # Example
//!
//! ```no_run
//! use stockwatch::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod database;
mod error;
mod logging;
mod password_reset;
mod quota;

pub use database::{DatabaseConfig, PoolTimeouts};
pub use error::{ConfigError, ValidationError};
pub use logging::{Environment, LoggingConfig};
pub use password_reset::PasswordResetConfig;
pub use quota::QuotaConfig;

use serde::Deserialize;

/// Root application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Database configuration (PostgreSQL connection)
    pub database: DatabaseConfig,

    /// Log filter and output format
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Product quota tunables
    #[serde(default)]
    pub quota: QuotaConfig,

    /// Password reset tunables
    #[serde(default)]
    pub password_reset: PasswordResetConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `STOCKWATCH` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    ///
    /// - `STOCKWATCH__DATABASE__URL=...` -> `database.url = ...`
    /// - `STOCKWATCH__QUOTA__FREE_TIER_FALLBACK_LIMIT=3` -> `quota.free_tier_fallback_limit = 3`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or a value
    /// cannot be parsed into its expected type.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("STOCKWATCH")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` for the first section that is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.database.validate()?;
        self.logging.validate()?;
        self.quota.validate()?;
        self.password_reset.validate()?;
        Ok(())
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.logging.is_production()
    }
}
