//! Foundation module - Shared domain primitives.
//!
//! Identifiers, timestamps, error types, partial-update helpers and the
//! state machine trait that the rest of the StockWatch domain is written in
//! terms of.

mod errors;
mod field_update;
mod ids;
mod state_machine;
mod timestamp;

pub use errors::{DomainError, ErrorCode, ErrorKind, ValidationError, GENERIC_BACKEND_MESSAGE};
pub use field_update::FieldUpdate;
pub use ids::{AddonId, PaymentId, PlanId, ProductId, SubscriptionAddonId, SubscriptionId, UserId};
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
