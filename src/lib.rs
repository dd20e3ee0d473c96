//! StockWatch - persistence and business rules for a price tracking service.
//!
//! Layout follows a hexagonal architecture:
//! - `domain` - pure types and rules (accounts, subscriptions, products, settings)
//! - `ports` - async traits for every persistence concern
//! - `adapters` - PostgreSQL and in-memory implementations of the ports
//! - `application` - one handler per operation plus the `StockWatch` facade
//! - `config` / `telemetry` - ambient setup used by the binary

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod telemetry;
