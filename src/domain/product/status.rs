//! Stock status reported by the price checker.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::domain::foundation::{DomainError, ErrorCode};

/// Where a tracked product is in its check cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ProductStatus {
    /// Added but not yet checked.
    #[default]
    Checking,
    InStock,
    OutOfStock,
    /// The last check failed.
    Error,
}

impl ProductStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductStatus::Checking => "checking",
            ProductStatus::InStock => "in-stock",
            ProductStatus::OutOfStock => "out-of-stock",
            ProductStatus::Error => "error",
        }
    }
}

impl FromStr for ProductStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "checking" => Ok(ProductStatus::Checking),
            "in-stock" => Ok(ProductStatus::InStock),
            "out-of-stock" => Ok(ProductStatus::OutOfStock),
            "error" => Ok(ProductStatus::Error),
            _ => Err(DomainError::new(
                ErrorCode::InvalidFormat,
                format!("Invalid product status: {}", s),
            )),
        }
    }
}
