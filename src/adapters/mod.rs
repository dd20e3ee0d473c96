//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to storage:
//! - `postgres` - sqlx/PostgreSQL repositories, pool and migrations
//! - `memory` - in-memory implementation of every port

pub mod memory;
pub mod postgres;

pub use memory::InMemoryStore;
