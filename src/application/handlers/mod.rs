//! Application handlers.
//!
//! Command and query handlers that orchestrate domain operations, grouped
//! by the area they serve.

pub mod account;
pub mod dashboard;
pub mod product;
pub mod settings;
pub mod subscription;
