//! Application layer - Commands, Queries, and Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.
//! Following CQRS, it separates command handlers (write) from query handlers
//! (read). The `StockWatch` facade in `service` exposes every operation with
//! a versioned response envelope.

mod audit;
pub mod handlers;
pub mod quota;
pub mod response;
pub mod service;

pub use quota::QuotaResolver;
pub use response::{OperationResponse, ResponseStatus, RESPONSE_SCHEMA_VERSION};
pub use service::{Ports, ServiceOptions, StockWatch};
