//! Ports - Interfaces for persistence.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the application handlers and storage. Adapters implement these ports:
//!
//! - `AccountRepository` - users and registration provisioning
//! - `ActivityLog` - append-only audit trail
//! - `PasswordResetRepository` - hashed reset tokens
//! - `SubscriptionRepository` - plans, add-ons, subscriptions
//! - `PaymentRepository` - payment history
//! - `ProductRepository` - tracked products and price statistics
//! - `SettingsRepository` - per-user settings

mod account_repository;
mod activity_log;
mod password_reset_repository;
mod payment_repository;
mod product_repository;
mod settings_repository;
mod subscription_repository;

pub use account_repository::{AccountRepository, CreatedAccount};
pub use activity_log::ActivityLog;
pub use password_reset_repository::PasswordResetRepository;
pub use payment_repository::PaymentRepository;
pub use product_repository::ProductRepository;
pub use settings_repository::SettingsRepository;
pub use subscription_repository::SubscriptionRepository;
