//! Postgres connection settings for the StockWatch store.

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

const ACCEPTED_SCHEMES: [&str; 2] = ["postgres://", "postgresql://"];
const MAX_POOL_SIZE: u32 = 100;

/// Connection string and pool tunables, read from `STOCKWATCH__DATABASE__*`.
///
/// Every field except `url` has a default; an absent url fails validation.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Carries credentials, so it never appears in `Debug` output.
    pub url: SecretString,
    pub min_connections: u32,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
    pub idle_timeout_secs: u64,
    pub max_lifetime_secs: u64,
    /// Apply `migrations/` before serving.
    pub run_migrations: bool,
}

/// Pool timeouts as durations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolTimeouts {
    pub acquire: Duration,
    pub idle: Duration,
    pub max_lifetime: Duration,
}

impl DatabaseConfig {
    pub fn timeouts(&self) -> PoolTimeouts {
        PoolTimeouts {
            acquire: Duration::from_secs(self.acquire_timeout_secs),
            idle: Duration::from_secs(self.idle_timeout_secs),
            max_lifetime: Duration::from_secs(self.max_lifetime_secs),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        let url = self.url.expose_secret().trim();
        if url.is_empty() {
            return Err(ValidationError::MissingRequired("STOCKWATCH__DATABASE__URL"));
        }
        if !ACCEPTED_SCHEMES.iter().any(|scheme| url.starts_with(scheme)) {
            return Err(ValidationError::InvalidDatabaseUrl);
        }
        if self.max_connections > MAX_POOL_SIZE {
            return Err(ValidationError::PoolSizeTooLarge);
        }
        if self.min_connections > self.max_connections {
            return Err(ValidationError::InvalidPoolSize);
        }
        Ok(())
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: SecretString::new(String::new()),
            min_connections: 1,
            max_connections: 10,
            acquire_timeout_secs: 30,
            idle_timeout_secs: 600,
            max_lifetime_secs: 1800,
            run_migrations: false,
        }
    }
}
