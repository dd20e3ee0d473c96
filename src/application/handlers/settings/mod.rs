//! Settings handlers.
//!
//! Commands:
//! - `UpdateSettingsHandler` - Validate and merge a partial update
//!
//! Queries:
//! - `GetSettingsHandler` - Current settings, created with defaults if missing

mod get_settings;
mod update_settings;

// Commands
pub use update_settings::{UpdateSettingsCommand, UpdateSettingsHandler, UpdateSettingsResult};

// Queries
pub use get_settings::{GetSettingsHandler, GetSettingsQuery, GetSettingsResult};
