//! Domain layer - pure business types and rules for StockWatch.

pub mod account;
pub mod foundation;
pub mod helpers;
pub mod product;
pub mod settings;
pub mod subscription;
